// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found when a sheet is unpublished

    #[error("Response body is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Sheet is empty or too short: {rows} rows, need at least {required}")]
    TooShort { rows: usize, required: usize },

    #[error("CSV decoding error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sheet fetch failed: {0}")]
    Sheet(#[from] SheetError), // Automatically convert fetch errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
