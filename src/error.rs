use crate::domain::payment::{FormId, PaymentId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    StorageError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Payment {0} not found")]
    PaymentNotFound(PaymentId),
    #[error("Form {0} not found")]
    FormNotFound(FormId),
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BeaconError {
    fn from(err: rocksdb::Error) -> Self {
        BeaconError::StorageError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BeaconError>;
