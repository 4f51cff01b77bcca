use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeepsakeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Upload of {path} failed: {message}")]
    Upload { path: String, message: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl KeepsakeError {
    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn upload<S: Into<String>>(path: S, message: S) -> Self {
        Self::Upload {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn timeout<S: Into<String>>(operation: S, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }
}

pub type Result<T> = std::result::Result<T, KeepsakeError>;
