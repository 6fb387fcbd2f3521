use thiserror::Error;

use crate::types::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionFailureCause {
    Network,
    HttpStatus,
    Parse,
    EmptyResult,
}

impl std::fmt::Display for SelectionFailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::HttpStatus => "http_status",
            Self::Parse => "parse",
            Self::EmptyResult => "empty_result",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistillationFailureCause {
    Network,
    HttpStatus,
    Parse,
    SchemaUnderfilled,
}

impl std::fmt::Display for DistillationFailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::HttpStatus => "http_status",
            Self::Parse => "parse",
            Self::SchemaUnderfilled => "schema_underfilled",
        };
        write!(f, "{s}")
    }
}

/// Every variant is fatal to the core invocation (§7 "Error kinds").
/// There are no silent fallbacks across phases: a phase either produces a
/// result meeting its zero-success threshold, or the whole invocation fails.
#[derive(Error, Debug)]
pub enum TheodoreError {
    #[error("could not resolve seed to a base URL: {0}")]
    SeedResolutionFailed(String),

    #[error("discovery produced zero paths from robots.txt, sitemap, and navigation scan")]
    DiscoveryFailed,

    #[error("selection failed ({cause}): {detail}")]
    SelectionFailed {
        cause: SelectionFailureCause,
        detail: String,
    },

    #[error("extraction failed: zero of {attempted} selected pages succeeded")]
    ExtractionFailed { attempted: usize },

    #[error("distillation failed ({cause}): {detail}")]
    DistillationFailed {
        cause: DistillationFailureCause,
        detail: String,
    },

    #[error("invocation cancelled while in phase {reached_phase}")]
    Cancelled { reached_phase: Phase },

    #[error("phase {phase} exceeded its configured timeout")]
    Timeout { phase: Phase },
}

pub type Result<T> = std::result::Result<T, TheodoreError>;
