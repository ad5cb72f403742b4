#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum NormalizeError {
    #[error("record has no date")]
    MissingDate,
    #[error("record is not an object")]
    NotAnObject,
    #[error(transparent)]
    Invalid(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error(transparent)]
    Invalid(#[from] NormalizeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("no workout on {0}")]
    NotFound(chrono::NaiveDate),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error("no workout on {0}")]
    NotFound(chrono::NaiveDate),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("unknown user {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("invalid backup file: {0}")]
    Format(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid workout at index {index}: {source}")]
    Invalid {
        index: usize,
        source: NormalizeError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
