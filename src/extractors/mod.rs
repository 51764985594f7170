// src/extractors/mod.rs
pub mod date;
pub mod schedule;

// Re-export key extraction types for convenience
pub use date::DateWindow;
pub use schedule::{Record, ScheduleExtractor};
