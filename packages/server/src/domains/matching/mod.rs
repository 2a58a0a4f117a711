pub mod engine;
pub mod errors;
pub mod models;

// Re-export commonly used types
pub use engine::{InterviewPair, MatchOutcome, MatchingEngine, NewRequest};
pub use errors::MatchingError;
