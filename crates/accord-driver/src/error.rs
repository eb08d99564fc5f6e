use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{binary} {command} timed out after {secs}s")]
    Timeout {
        binary: String,
        command: String,
        secs: u64,
    },

    #[error("{command} exited with code {code}:\n{output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("workspace error at {path}: {source}")]
    Workspace {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode state: {0}")]
    StateDecode(String),

    #[error("internal harness error: {0}")]
    Internal(String),
}

/// Failure reading a resource from the remote control plane.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The service answered with an error status.
    #[error("service error: status {status}, code {code}: {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never produced a service answer.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Only a service answer with HTTP 404 means "gone"; transport and decode
    /// failures never do.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::Service { status: 404, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}
