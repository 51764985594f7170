// src/sheets/mod.rs
pub mod client;
pub mod models;

pub use models::SheetSource;
