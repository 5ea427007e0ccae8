#![no_std] // Shared with the client decoder, keep it allocation-only

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod ids;
pub mod morphology;

// Re-export core types for convenience
pub use ids::{FormId, LemmaId, SourceId};
pub use morphology::*;

pub mod model;
pub use model::*;
