use thiserror::Error;

#[derive(Error, Debug)]
pub enum SteepError {
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("install step {index} (`{step}`) failed with exit code {code}")]
    InstallStepFailed {
        index: usize,
        step: String,
        code: i32,
    },

    #[error("verification failed: expected output to contain {expected:?}, got:\n{actual}")]
    VerificationFailed { expected: String, actual: String },

    #[error("dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl SteepError {
    /// Process exit code for this error class.
    ///
    /// 2 = load, 3 = fetch, 4 = install, 5 = verify, 1 = everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            SteepError::MalformedDescriptor(_) | SteepError::JsonError(_) => 2,
            SteepError::Network(_) | SteepError::ChecksumMismatch { .. } => 3,
            SteepError::InstallStepFailed { .. } | SteepError::DependencyNotFound(_) => 4,
            SteepError::VerificationFailed { .. } => 5,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, SteepError>;
