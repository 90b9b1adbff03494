use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Per-million-token pricing for one model, in dollars.
#[derive(Debug, Clone, Copy)]
pub struct ModelRate {
    pub input: f64,
    pub output: f64,
}

/// Unknown model identifiers fall back to these rates rather than erroring.
pub const DEFAULT_RATE: ModelRate = ModelRate {
    input: 5.00,
    output: 15.00,
};

/// Smallest cost ever displayed for a run that used any tokens, so tiny
/// nonzero usage never reads as $0.00.
pub const MIN_DISPLAY_COST: f64 = 0.0001;

static PRICING: Lazy<HashMap<&'static str, ModelRate>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("gpt-4o", ModelRate { input: 5.00, output: 15.00 });
    m.insert("gpt-4o-2024-05-13", ModelRate { input: 5.00, output: 15.00 });
    m.insert("gpt-3.5-turbo", ModelRate { input: 0.50, output: 1.50 });
    m.insert("gpt-3.5-turbo-0125", ModelRate { input: 0.50, output: 1.50 });
    m
});

/// Estimate the dollar cost of a run from its final token totals.
///
/// Any model id containing "gpt-4o" uses the gpt-4o rates (deployments carry
/// dated suffixes); other ids are looked up in the table and unknown ids use
/// the default rate. Zero usage costs exactly zero; any nonzero usage is
/// clamped up to the minimum displayable cost.
pub fn calculate_cost(model_name: &str, prompt_tokens: u64, completion_tokens: u64) -> f64 {
    let rate = if model_name.contains("gpt-4o") {
        PRICING["gpt-4o"]
    } else {
        PRICING.get(model_name).copied().unwrap_or(DEFAULT_RATE)
    };

    if prompt_tokens == 0 && completion_tokens == 0 {
        return 0.0;
    }

    let input_cost = (prompt_tokens as f64 / 1_000_000.0) * rate.input;
    let output_cost = (completion_tokens as f64 / 1_000_000.0) * rate.output;
    let total_cost = input_cost + output_cost;

    debug!(
        "🧮 Cost for {}: input=${:.6}, output=${:.6}, total=${:.6}",
        model_name, input_cost, output_cost, total_cost
    );

    total_cost.max(MIN_DISPLAY_COST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_cost() {
        // 1M prompt + 1M completion on gpt-3.5-turbo: 0.50 + 1.50
        let cost = calculate_cost("gpt-3.5-turbo", 1_000_000, 1_000_000);
        assert!((cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_gpt4o_substring_match() {
        // Dated deployment names still hit the gpt-4o rates
        let dated = calculate_cost("gpt-4o-2099-01-01", 1_000_000, 1_000_000);
        let base = calculate_cost("gpt-4o", 1_000_000, 1_000_000);
        assert!((dated - base).abs() < 1e-9);
        assert!((base - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_model_falls_back_to_default() {
        let cost = calculate_cost("unknown-model-x", 1_000_000, 1_000_000);
        assert!((cost - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_usage_costs_zero() {
        assert_eq!(calculate_cost("gpt-4o", 0, 0), 0.0);
    }

    #[test]
    fn test_cost_floor_for_tiny_usage() {
        let cost = calculate_cost("gpt-3.5-turbo", 1, 1);
        assert!(cost >= MIN_DISPLAY_COST);
    }

    #[test]
    fn test_cost_monotonicity() {
        // Increasing either total while holding the other fixed never
        // decreases the estimate.
        let base = calculate_cost("gpt-4o", 10_000, 10_000);
        assert!(calculate_cost("gpt-4o", 20_000, 10_000) >= base);
        assert!(calculate_cost("gpt-4o", 10_000, 20_000) >= base);
    }
}
