//! The playback engine: transport controls plus the session driver task

use crate::gate::{Cancelled, PauseGate};
use crate::sink::AudioSink;
use crate::state::{Phase, PlaybackState};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use voxcard_foundation::{
    recompute_offsets, FlashcardEntry, TimeWindow, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE,
};
use voxcard_synth::{SynthesisError, SynthesisService, SOURCE_LANGUAGE, TARGET_LANGUAGE};

/// Provides the encoded audio for one spoken fragment. The engine only
/// needs this one call; production wires in [`SynthesisService`].
#[async_trait]
pub trait SpeechSource: Send + Sync {
    async fn fetch(&self, text: &str, language: &str) -> Result<Vec<u8>, SynthesisError>;
}

#[async_trait]
impl SpeechSource for SynthesisService {
    async fn fetch(&self, text: &str, language: &str) -> Result<Vec<u8>, SynthesisError> {
        self.synthesize(text, language, None).await
    }
}

/// Notifications emitted by the driver. Every session ends with exactly one
/// terminal event: `Completed`, `Stopped` or `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    PhaseStarted { entry_index: usize, phase: Phase },
    Completed,
    Stopped,
    Failed(String),
}

/// How a phase was interrupted before finishing.
enum Interrupted {
    Jumped,
    Stopped,
    Failed(String),
}

struct Shared<S, K> {
    entries: RwLock<Vec<FlashcardEntry>>,
    speech: Arc<S>,
    sink: K,
    state: RwLock<PlaybackState>,
    window: RwLock<Option<TimeWindow>>,
    gate: PauseGate,
    /// Pending jump target, consumed by the driver at the next phase edge.
    requested: Mutex<Option<usize>>,
    /// Bumped on every jump request to wake a phase mid-flight.
    jump_seq: watch::Sender<u64>,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    /// Driver generation; a finished driver only resets state if current.
    generation: AtomicU64,
}

struct Session {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Transport front-end. All methods are safe to call from any task at any
/// time; the driver reconciles them at phase boundaries.
pub struct PlaybackEngine<S, K> {
    shared: Arc<Shared<S, K>>,
    session: Mutex<Option<Session>>,
}

impl<S, K> PlaybackEngine<S, K>
where
    S: SpeechSource + 'static,
    K: AudioSink + 'static,
{
    pub fn new(
        mut entries: Vec<FlashcardEntry>,
        speech: Arc<S>,
        sink: K,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        recompute_offsets(&mut entries, 1.0);
        let engine = Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(entries),
                speech,
                sink,
                state: RwLock::new(PlaybackState::default()),
                window: RwLock::new(None),
                gate: PauseGate::new(),
                requested: Mutex::new(None),
                jump_seq: watch::channel(0).0,
                events,
                generation: AtomicU64::new(0),
            }),
            session: Mutex::new(None),
        };
        (engine, rx)
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state.read().clone()
    }

    fn session_active(&self) -> bool {
        let state = self.shared.state.read();
        state.is_playing || state.is_paused
    }

    /// Start a session from the current entry, or resume a paused one.
    pub fn play(&self) {
        if self.session_active() {
            self.resume();
            return;
        }

        let start = {
            let state = self.shared.state.read();
            let entries = self.shared.entries.read();
            let (lo, hi) = entry_bounds(&entries, *self.shared.window.read());
            state.current_entry.clamp(lo, hi)
        };
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.shared.state.write();
            state.is_playing = true;
            state.is_paused = false;
            state.current_entry = start;
        }
        self.shared.gate.resume();
        *self.shared.requested.lock() = None;

        let cancel = CancellationToken::new();
        let shared = Arc::clone(&self.shared);
        let driver_cancel = cancel.clone();
        info!(start_entry = start, "Starting playback session");
        let handle = tokio::spawn(async move {
            drive(shared, driver_cancel, generation, start).await;
        });
        *self.session.lock() = Some(Session { cancel, handle });
    }

    pub fn pause(&self) {
        if !self.session_active() {
            return;
        }
        self.shared.gate.pause();
        let mut state = self.shared.state.write();
        state.is_paused = true;
        state.is_playing = false;
    }

    pub fn resume(&self) {
        if !self.session_active() {
            return;
        }
        {
            let mut state = self.shared.state.write();
            state.is_paused = false;
            state.is_playing = true;
        }
        self.shared.gate.resume();
    }

    /// Cancel the running session and wait for the driver to wind down.
    /// The entry index and rate survive the stop.
    pub async fn stop(&self) {
        let session = self.session.lock().take();
        if let Some(session) = session {
            session.cancel.cancel();
            // A paused driver is parked on the gate; open it so it can
            // observe the cancellation.
            self.shared.gate.resume();
            if let Err(err) = session.handle.await {
                warn!(error = %err, "Playback driver task join failed");
            }
        }
    }

    pub fn next(&self) {
        let target = self.state().current_entry.saturating_add(1);
        self.jump_to_entry(target);
    }

    pub fn prev(&self) {
        let target = self.state().current_entry.saturating_sub(1);
        self.jump_to_entry(target);
    }

    /// Move to `index`, clamped to the deck and the active window. During a
    /// session the current phase is abandoned and the target entry starts
    /// from its first phase; while idle only the position changes.
    pub fn jump_to_entry(&self, index: usize) {
        let target = {
            let entries = self.shared.entries.read();
            let (lo, hi) = entry_bounds(&entries, *self.shared.window.read());
            index.clamp(lo, hi)
        };
        if self.session_active() {
            *self.shared.requested.lock() = Some(target);
            self.shared.jump_seq.send_modify(|n| *n += 1);
        } else {
            self.shared.state.write().current_entry = target;
        }
        debug!(target, "Jump requested");
    }

    /// Change the playback rate, clamped to the supported range. Pauses
    /// scale immediately; entry offsets are recomputed so window math stays
    /// in the same time base.
    pub fn set_rate(&self, rate: f64) {
        let rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        self.shared.state.write().rate = rate;
        recompute_offsets(&mut self.shared.entries.write(), rate);
    }

    /// Restrict traversal to entries starting inside `window`, or lift the
    /// restriction with `None`. While idle the position snaps to the first
    /// entry inside the new window.
    pub fn set_time_window(&self, window: Option<TimeWindow>) {
        *self.shared.window.write() = window;
        if !self.session_active() {
            if let Some(window) = window {
                let entries = self.shared.entries.read();
                if let Some(first) = window.first_entry_inside(&entries) {
                    self.shared.state.write().current_entry = first;
                }
            }
        }
    }

    pub fn time_window(&self) -> Option<TimeWindow> {
        *self.shared.window.read()
    }

    pub fn entries(&self) -> Vec<FlashcardEntry> {
        self.shared.entries.read().clone()
    }
}

/// Inclusive index bounds of the traversable range for an optional window.
fn entry_bounds(entries: &[FlashcardEntry], window: Option<TimeWindow>) -> (usize, usize) {
    let hi_all = entries.len().saturating_sub(1);
    match window {
        None => (0, hi_all),
        Some(window) => {
            let lo = window.first_entry_inside(entries).unwrap_or(0);
            let hi = entries
                .iter()
                .rposition(|e| window.contains(e.start_offset))
                .unwrap_or(hi_all);
            (lo, hi)
        }
    }
}

async fn drive<S, K>(shared: Arc<Shared<S, K>>, cancel: CancellationToken, generation: u64, start: usize)
where
    S: SpeechSource,
    K: AudioSink,
{
    let terminal = run_session(&shared, &cancel, start).await;

    // Another play() may have superseded this driver; only the current
    // generation owns the idle reset.
    if shared.generation.load(Ordering::SeqCst) == generation {
        let mut state = shared.state.write();
        state.is_playing = false;
        state.is_paused = false;
        state.phase = None;
        state.elapsed = Duration::ZERO;
    }
    match &terminal {
        PlaybackEvent::Completed => info!("Playback completed"),
        PlaybackEvent::Stopped => info!("Playback stopped"),
        PlaybackEvent::Failed(msg) => warn!(error = %msg, "Playback failed"),
        _ => {}
    }
    let _ = shared.events.send(terminal);
}

async fn run_session<S, K>(
    shared: &Shared<S, K>,
    cancel: &CancellationToken,
    start: usize,
) -> PlaybackEvent
where
    S: SpeechSource,
    K: AudioSink,
{
    let mut index = start;
    'entries: loop {
        if let Some(target) = shared.requested.lock().take() {
            index = target;
        }
        let entry = {
            let entries = shared.entries.read();
            match entries.get(index) {
                Some(entry) => entry.clone(),
                None => return PlaybackEvent::Completed,
            }
        };
        // Walking past the window's end finishes the session.
        if let Some(window) = *shared.window.read() {
            if entry.start_offset >= window.end {
                return PlaybackEvent::Completed;
            }
        }
        {
            let mut state = shared.state.write();
            state.current_entry = index;
            state.elapsed = Duration::from_secs_f64(entry.start_offset.max(0.0));
        }

        for phase in Phase::SEQUENCE {
            if shared.requested.lock().is_some() {
                continue 'entries;
            }
            shared.state.write().phase = Some(phase);
            let _ = shared.events.send(PlaybackEvent::PhaseStarted {
                entry_index: index,
                phase,
            });
            match run_phase(shared, cancel, &entry, phase).await {
                Ok(()) => {}
                Err(Interrupted::Jumped) => continue 'entries,
                Err(Interrupted::Stopped) => return PlaybackEvent::Stopped,
                Err(Interrupted::Failed(message)) => return PlaybackEvent::Failed(message),
            }
        }
        index += 1;
    }
}

async fn run_phase<S, K>(
    shared: &Shared<S, K>,
    cancel: &CancellationToken,
    entry: &FlashcardEntry,
    phase: Phase,
) -> Result<(), Interrupted>
where
    S: SpeechSource,
    K: AudioSink,
{
    let rate = shared.state.read().rate;
    // Child token: a jump kills just this phase, not the session.
    let phase_cancel = cancel.child_token();
    let mut jump_rx = shared.jump_seq.subscribe();
    jump_rx.borrow_and_update();

    let work = phase_work(shared, &phase_cancel, entry, phase, rate);
    tokio::pin!(work);

    tokio::select! {
        _ = cancel.cancelled() => {
            phase_cancel.cancel();
            Err(Interrupted::Stopped)
        }
        _ = jump_rx.changed() => {
            phase_cancel.cancel();
            Err(Interrupted::Jumped)
        }
        outcome = &mut work => match outcome {
            Ok(()) => Ok(()),
            Err(PhaseOutcome::Cancelled) => Err(Interrupted::Stopped),
            Err(PhaseOutcome::Failed(message)) => Err(Interrupted::Failed(message)),
        }
    }
}

enum PhaseOutcome {
    Cancelled,
    Failed(String),
}

async fn phase_work<S, K>(
    shared: &Shared<S, K>,
    cancel: &CancellationToken,
    entry: &FlashcardEntry,
    phase: Phase,
    rate: f64,
) -> Result<(), PhaseOutcome>
where
    S: SpeechSource,
    K: AudioSink,
{
    if let Some(base) = phase.pause_base_secs() {
        let scaled = Duration::from_secs_f64(base / rate);
        return shared
            .gate
            .pausable_delay(scaled, cancel)
            .await
            .map_err(|Cancelled| PhaseOutcome::Cancelled);
    }

    let (text, language) = match phase {
        Phase::SourceWord => (entry.source_word.as_str(), SOURCE_LANGUAGE),
        Phase::TargetWord => (entry.target_word.as_str(), TARGET_LANGUAGE),
        Phase::TargetSentence => (entry.target_sentence.as_str(), TARGET_LANGUAGE),
        _ => unreachable!("pause phases handled above"),
    };
    shared
        .gate
        .wait_until_resumed(cancel)
        .await
        .map_err(|Cancelled| PhaseOutcome::Cancelled)?;
    let audio = shared
        .speech
        .fetch(text, language)
        .await
        .map_err(|err| PhaseOutcome::Failed(err.to_string()))?;
    if cancel.is_cancelled() {
        return Err(PhaseOutcome::Cancelled);
    }
    shared
        .sink
        .play(audio, rate, &shared.gate, cancel)
        .await
        .map_err(|err| PhaseOutcome::Failed(err.to_string()))?;
    if cancel.is_cancelled() {
        return Err(PhaseOutcome::Cancelled);
    }
    Ok(())
}
