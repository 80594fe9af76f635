use thiserror::Error;

/// Outcome of the outbound phase that stops a call before transmission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptError {
    #[error("Offline mode enabled - request cancelled")]
    Offline,
}

/// Error returned by [`InterceptedClient`](super::InterceptedClient).
///
/// Transport errors pass through unchanged.
#[derive(Debug, Error)]
pub enum ClientError<E> {
    #[error(transparent)]
    Intercept(#[from] InterceptError),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error(transparent)]
    Transport(E),
}

impl<E> ClientError<E> {
    pub fn is_offline(&self) -> bool {
        matches!(self, ClientError::Intercept(InterceptError::Offline))
    }

    /// The transport's own error, if that is what failed.
    pub fn into_transport(self) -> Option<E> {
        match self {
            ClientError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
