use crate::error::AppError;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

/// Application lifecycle state. The playback engine keeps its own transport
/// state; this tracks the process as a whole.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Initializing,
    Ready,
    Busy { task: String },
    Stopping,
    Stopped,
}

impl AppState {
    fn label(&self) -> String {
        match self {
            AppState::Busy { task } => format!("Busy({task})"),
            other => format!("{other:?}"),
        }
    }
}

pub struct StateManager {
    state: Arc<RwLock<AppState>>,
    state_tx: Sender<AppState>,
    state_rx: Receiver<AppState>,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StateManager {
    pub fn new() -> Self {
        let (state_tx, state_rx) = crossbeam_channel::unbounded();
        Self {
            state: Arc::new(RwLock::new(AppState::Initializing)),
            state_tx,
            state_rx,
        }
    }

    pub fn transition(&self, new_state: AppState) -> Result<(), AppError> {
        let mut current = self.state.write();

        let valid = matches!(
            (&*current, &new_state),
            (AppState::Initializing, AppState::Ready)
                | (AppState::Ready, AppState::Busy { .. })
                | (AppState::Busy { .. }, AppState::Ready)
                | (AppState::Ready, AppState::Stopping)
                | (AppState::Busy { .. }, AppState::Stopping)
                | (AppState::Initializing, AppState::Stopping)
                | (AppState::Stopping, AppState::Stopped)
        );

        if !valid {
            return Err(AppError::InvalidTransition {
                from: current.label(),
                to: new_state.label(),
            });
        }

        tracing::info!("State transition: {:?} -> {:?}", *current, new_state);
        *current = new_state.clone();
        let _ = self.state_tx.send(new_state);
        Ok(())
    }

    pub fn current(&self) -> AppState {
        self.state.read().clone()
    }

    pub fn subscribe(&self) -> Receiver<AppState> {
        self.state_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_lifecycle_is_valid() {
        let mgr = StateManager::new();
        mgr.transition(AppState::Ready).unwrap();
        mgr.transition(AppState::Busy {
            task: "play".into(),
        })
        .unwrap();
        mgr.transition(AppState::Ready).unwrap();
        mgr.transition(AppState::Stopping).unwrap();
        mgr.transition(AppState::Stopped).unwrap();
        assert_eq!(mgr.current(), AppState::Stopped);
    }

    #[test]
    fn skipping_initialization_is_rejected() {
        let mgr = StateManager::new();
        let err = mgr
            .transition(AppState::Busy {
                task: "export".into(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[test]
    fn subscribers_observe_transitions() {
        let mgr = StateManager::new();
        let rx = mgr.subscribe();
        mgr.transition(AppState::Ready).unwrap();
        assert_eq!(rx.recv().unwrap(), AppState::Ready);
    }
}
