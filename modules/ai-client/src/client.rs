use async_trait::async_trait;

use crate::error::AiClientError;
use crate::types::{ChatRequest, ChatResponse};

/// A provider-agnostic chat-completion client.
///
/// Implementations talk to a single OpenAI-compatible `/chat/completions`
/// endpoint. There is deliberately no retry here — callers that need
/// single-attempt semantics (Theodore's selector and distiller do) get them
/// for free, and callers that want retries can wrap a `ChatClient`.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AiClientError>;

    /// Name of the wire provider, for logging and cost-table lookups.
    fn provider(&self) -> &'static str;
}
