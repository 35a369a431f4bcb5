use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChecklistError>;

/// Error taxonomy shared by every store operation.
///
/// Storage-medium faults are always caught at the adapter boundary and
/// surface here as [`ChecklistError::Storage`]; they never escape as raw
/// io errors or panics.
#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("list not found: {0}")]
    ListNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("a list named \"{0}\" already exists")]
    ListExists(String),

    #[error("a task with the text \"{0}\" already exists in this list")]
    TaskExists(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("io error: {0}")]
    Io(std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),
}

impl ChecklistError {
    /// HTTP-style status code for the error, kept for parity with the
    /// persisted data's original consumers. Success codes are documented
    /// per operation (201 on create, 200 otherwise).
    pub fn status_code(&self) -> u16 {
        match self {
            ChecklistError::ListNotFound(_) | ChecklistError::TaskNotFound(_) => 404,
            ChecklistError::ListExists(_) | ChecklistError::TaskExists(_) => 409,
            ChecklistError::InvalidData(_) => 400,
            ChecklistError::Storage(_)
            | ChecklistError::Io(_)
            | ChecklistError::Serialization(_) => 500,
        }
    }

    /// Stable machine-readable label for the error class.
    pub fn label(&self) -> &'static str {
        match self {
            ChecklistError::ListNotFound(_) | ChecklistError::TaskNotFound(_) => "NOT_FOUND",
            ChecklistError::ListExists(_) | ChecklistError::TaskExists(_) => "ALREADY_EXISTS",
            ChecklistError::InvalidData(_) => "INVALID_DATA",
            ChecklistError::Storage(_)
            | ChecklistError::Io(_)
            | ChecklistError::Serialization(_) => "STORAGE_ERROR",
        }
    }
}
