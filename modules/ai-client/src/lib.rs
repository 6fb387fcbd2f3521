pub mod client;
pub mod error;
pub mod openai;
pub mod openrouter;
pub mod types;
pub mod util;

pub use client::ChatClient;
pub use error::AiClientError;
pub use openai::OpenAiClient;
pub use openrouter::OpenRouterClient;
pub use types::{ChatRequest, ChatResponse, Usage, WireMessage};
