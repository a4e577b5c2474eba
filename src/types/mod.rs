// Type definitions shared across the scoring pipeline

pub mod document;
pub mod signal;

pub use document::*;
pub use signal::*;
