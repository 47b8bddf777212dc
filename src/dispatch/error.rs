use thiserror::Error;

/// The request never produced a well-formed management response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection to the management interface failed: {0}")]
    Connection(#[from] reqwest::Error),
    #[error("management interface returned HTTP {status}")]
    Http { status: u16 },
}

/// Classification of a completed dispatch. Every exchange ends in exactly one
/// of: success (not represented here), an application failure (the server
/// understood and refused), or a transport/exceptional failure (no well-formed
/// response). [`DispatchError::Malformed`] belongs to the transport class;
/// [`DispatchError::Unauthorized`] is raised after the re-authentication
/// callback has been notified.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{operation} failed: {failure}")]
    Application { operation: String, failure: String },
    #[error("session expired or credentials rejected by the management interface")]
    Unauthorized,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed management response: {0}")]
    Malformed(String),
}

impl DispatchError {
    /// The server understood the request and refused it.
    pub fn is_application(&self) -> bool {
        matches!(self, DispatchError::Application { .. })
    }

    /// No well-formed response: network, HTTP or parse failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DispatchError::Transport(_) | DispatchError::Malformed(_)
        )
    }
}
