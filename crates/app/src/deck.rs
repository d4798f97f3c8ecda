//! CSV deck loading

use serde::Deserialize;
use std::path::Path;
use tracing::info;
use voxcard_foundation::{recompute_offsets, AppError, FlashcardEntry};

#[derive(Debug, Deserialize)]
struct DeckRow {
    source_word: String,
    target_word: String,
    target_sentence: String,
}

/// Load a deck from a CSV file with `source_word,target_word,target_sentence`
/// headers. Ids are assigned in file order; durations and offsets are
/// computed for rate 1.0.
pub fn load_deck(path: &Path) -> Result<Vec<FlashcardEntry>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AppError::Deck(format!("cannot open {}: {e}", path.display())))?;

    let mut entries = Vec::new();
    for (line, row) in reader.deserialize::<DeckRow>().enumerate() {
        let row = row.map_err(|e| AppError::Deck(format!("row {}: {e}", line + 1)))?;
        // Every fragment is spoken; an empty one would fail synthesis
        // mid-session long after the deck was accepted.
        if row.source_word.is_empty() || row.target_word.is_empty() || row.target_sentence.is_empty()
        {
            return Err(AppError::Deck(format!(
                "row {}: source_word, target_word and target_sentence must not be empty",
                line + 1
            )));
        }
        entries.push(FlashcardEntry::new(
            (line + 1) as u32,
            row.source_word,
            row.target_word,
            row.target_sentence,
        ));
    }
    if entries.is_empty() {
        return Err(AppError::Deck(format!("{} has no entries", path.display())));
    }
    recompute_offsets(&mut entries, 1.0);
    info!(path = %path.display(), entries = entries.len(), "Deck loaded");
    Ok(entries)
}
