//! Fixed provider-cost table consulted by both C3 (selection) and C5
//! (distillation) for token-cost accounting (SPEC_FULL.md §4.3, §10.6).
//!
//! Rates are USD per 1,000 tokens. An unknown model id costs 0 and is
//! logged, never fatal — SPEC_FULL.md §4.3: "If the provider omits `usage`,
//! tokens default to zero and cost to zero; this is logged but not fatal."

use tracing::warn;

struct Rate {
    model_prefix: &'static str,
    input_per_1k: f64,
    output_per_1k: f64,
}

static RATES: &[Rate] = &[
    Rate {
        model_prefix: "openai/gpt-4o-mini",
        input_per_1k: 0.00015,
        output_per_1k: 0.0006,
    },
    Rate {
        model_prefix: "openai/gpt-4o",
        input_per_1k: 0.0025,
        output_per_1k: 0.01,
    },
    Rate {
        model_prefix: "anthropic/claude-3.5-sonnet",
        input_per_1k: 0.003,
        output_per_1k: 0.015,
    },
    Rate {
        model_prefix: "anthropic/claude-3-haiku",
        input_per_1k: 0.00025,
        output_per_1k: 0.00125,
    },
    Rate {
        model_prefix: "meta-llama/llama-3.1-70b-instruct",
        input_per_1k: 0.00035,
        output_per_1k: 0.0004,
    },
];

/// USD cost of a completion, looked up by model id. Falls back to 0.0 for
/// any model id not in the table, logging a warning rather than failing.
pub fn estimate_cost_usd(model_id: &str, tokens_in: u32, tokens_out: u32) -> f64 {
    match RATES.iter().find(|r| model_id.starts_with(r.model_prefix)) {
        Some(rate) => {
            (tokens_in as f64 / 1000.0) * rate.input_per_1k
                + (tokens_out as f64 / 1000.0) * rate.output_per_1k
        }
        None => {
            warn!(model_id, "no cost-table entry for model, defaulting cost to 0.0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_has_nonzero_cost() {
        let cost = estimate_cost_usd("openai/gpt-4o-mini", 1000, 1000);
        assert!(cost > 0.0);
    }

    #[test]
    fn unknown_model_costs_zero() {
        assert_eq!(estimate_cost_usd("totally/unknown-model", 1000, 1000), 0.0);
    }
}
