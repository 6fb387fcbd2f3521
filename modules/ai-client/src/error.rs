use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiClientError {
    #[error("request to {provider} failed: {0}", provider = .provider)]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{provider} returned no choices in the completion response")]
    EmptyResponse { provider: &'static str },

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}
