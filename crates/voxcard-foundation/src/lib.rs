//! Foundation types for VoxCard: the flashcard data model, error taxonomy,
//! application state machine, and shutdown handling shared by the other
//! workspace crates.

pub mod card;
pub mod error;
pub mod shutdown;
pub mod state;

pub use card::*;
pub use error::*;
pub use shutdown::*;
pub use state::*;
