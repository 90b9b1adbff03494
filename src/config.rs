use log::info;
use std::collections::HashMap;
use std::fs;

use crate::error::SummarizeError;

/// Summarizer configuration. All tunables live here and the struct is passed
/// into the pipeline's constructor - nothing is read from globals at
/// run time. The composition root loads it once from `sumapiconf.txt`.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: u64,
    pub default_model: String,
    pub default_temperature: f32,
    pub max_chunk_tokens: usize,
    pub model_context_window: usize,
    pub max_response_tokens: u32,
    pub chunk_concurrency: usize,
}

impl SummarizerConfig {
    /// Reject statically invalid settings before any provider call is made.
    pub fn validate(&self) -> Result<(), SummarizeError> {
        if self.max_chunk_tokens == 0 {
            return Err(SummarizeError::InvalidChunkBudget(self.max_chunk_tokens));
        }
        if self.model_context_window == 0 {
            return Err(SummarizeError::Config(
                "MODEL_CONTEXT_WINDOW must be greater than zero".to_string(),
            ));
        }
        if self.chunk_concurrency == 0 {
            return Err(SummarizeError::Config(
                "CHUNK_CONCURRENCY must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load summarizer configuration from sumapiconf.txt using multi-path fallback
pub async fn load_summarizer_config() -> Result<SummarizerConfig, SummarizeError> {
    let config_paths = [
        "sumapiconf.txt",
        "../sumapiconf.txt",
        "../../sumapiconf.txt",
        "src/sumapiconf.txt",
    ];

    let mut content = String::new();
    let mut found_file = false;
    let mut config_source = "";

    // Try to find the config file in multiple locations
    for config_path in &config_paths {
        match fs::read_to_string(config_path) {
            Ok(file_content) => {
                content = file_content;
                found_file = true;
                config_source = config_path;
                break;
            }
            Err(_) => {
                continue;
            }
        }
    }

    if !found_file {
        return Err(SummarizeError::Config(
            "sumapiconf.txt file not found in any expected location (., .., ../.., src/)"
                .to_string(),
        ));
    }

    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let config_map = parse_key_values(content);

    // Check for required keys (API_KEY stays optional - local endpoints
    // like LM Studio don't need one)
    let required_keys = [
        "API_BASE_URL",
        "API_TIMEOUT",
        "DEFAULT_MODEL",
        "DEFAULT_TEMPERATURE",
        "MAX_CHUNK_TOKENS",
        "MODEL_CONTEXT_WINDOW",
        "MAX_RESPONSE_TOKENS",
        "CHUNK_CONCURRENCY",
    ];

    for key in &required_keys {
        if !config_map.contains_key(*key) {
            return Err(SummarizeError::Config(format!(
                "required setting '{}' not found in {}",
                key, config_source
            )));
        }
    }

    let config = SummarizerConfig {
        base_url: get_required(&config_map, "API_BASE_URL")?,
        api_key: config_map.get("API_KEY").cloned().filter(|v| !v.is_empty()),
        timeout: parse_required(&config_map, "API_TIMEOUT")?,
        default_model: get_required(&config_map, "DEFAULT_MODEL")?,
        default_temperature: parse_required(&config_map, "DEFAULT_TEMPERATURE")?,
        max_chunk_tokens: parse_required(&config_map, "MAX_CHUNK_TOKENS")?,
        model_context_window: parse_required(&config_map, "MODEL_CONTEXT_WINDOW")?,
        max_response_tokens: parse_required(&config_map, "MAX_RESPONSE_TOKENS")?,
        chunk_concurrency: parse_required(&config_map, "CHUNK_CONCURRENCY")?,
    };

    config.validate()?;
    info!("✅ Summarizer configuration loaded from {}", config_source);
    Ok(config)
}

/// Parse KEY=VALUE lines, skipping blanks and # comments.
fn parse_key_values(content: &str) -> HashMap<String, String> {
    let mut config_map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(equals_pos) = line.find('=') {
            let key = line[..equals_pos].trim().to_string();
            let value = line[equals_pos + 1..].trim().to_string();
            config_map.insert(key, value);
        }
    }
    config_map
}

fn get_required(map: &HashMap<String, String>, key: &str) -> Result<String, SummarizeError> {
    map.get(key)
        .cloned()
        .ok_or_else(|| SummarizeError::Config(format!("{} not found in sumapiconf.txt", key)))
}

fn parse_required<T: std::str::FromStr>(
    map: &HashMap<String, String>,
    key: &str,
) -> Result<T, SummarizeError> {
    get_required(map, key)?
        .parse()
        .map_err(|_| SummarizeError::Config(format!("invalid {} value in sumapiconf.txt", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SummarizerConfig {
        SummarizerConfig {
            base_url: "http://localhost:1234".to_string(),
            api_key: None,
            timeout: 60,
            default_model: "gpt-4o".to_string(),
            default_temperature: 0.5,
            max_chunk_tokens: 127_000,
            model_context_window: 128_000,
            max_response_tokens: 4_000,
            chunk_concurrency: 4,
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_budget_rejected() {
        let mut config = valid_config();
        config.max_chunk_tokens = 0;
        assert!(matches!(
            config.validate(),
            Err(SummarizeError::InvalidChunkBudget(0))
        ));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = valid_config();
        config.chunk_concurrency = 0;
        assert!(matches!(config.validate(), Err(SummarizeError::Config(_))));
    }

    #[test]
    fn test_parse_key_values() {
        let content = "\
# comment line
API_BASE_URL=http://localhost:1234
DEFAULT_TEMPERATURE = 0.5

not a key value line
MAX_CHUNK_TOKENS=500";
        let map = parse_key_values(content);
        assert_eq!(map.get("API_BASE_URL").unwrap(), "http://localhost:1234");
        assert_eq!(map.get("DEFAULT_TEMPERATURE").unwrap(), "0.5");
        assert_eq!(map.get("MAX_CHUNK_TOKENS").unwrap(), "500");
        assert_eq!(map.len(), 3);
    }
}
