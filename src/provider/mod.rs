// provider/mod.rs — the model backend seam.
//
// The rest of the daemon treats the language model as an opaque function:
// system prompt + message transcript in, reply text out. The trait keeps the
// orchestrator testable against a stub backend.

pub mod anthropic;
pub mod retry;

use async_trait::async_trait;

use crate::tasks::ChatMessage;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status. Carried through to
    /// the HTTP response with the provider's own status and message.
    #[error("model provider returned {status}: {message}")]
    Api { status: u16, message: String },
    /// The provider could not be reached or the response body was broken.
    #[error("model provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// Worth retrying: rate limits, provider-side failures, and transport
    /// errors. 4xx request errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504 | 529),
            Self::Transport(_) => true,
        }
    }
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// One completion turn.
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<String, ProviderError>;
}
