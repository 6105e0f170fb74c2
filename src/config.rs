//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{Error, ServiceConfig};
use std::path::Path;

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &ServiceConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.country.trim().is_empty() {
        issues.push("country must not be empty".into());
    }

    if config.cache.holiday_ttl_secs == 0 {
        issues.push("cache.holiday_ttl_secs must be > 0".into());
    }

    if config.http.timeout_secs == 0 {
        issues.push("http.timeout_secs must be > 0".into());
    }
    if config.http.user_agent.trim().is_empty() {
        issues.push("http.user_agent must not be empty".into());
    }

    if config.ai.model.trim().is_empty() {
        issues.push("ai.model must not be empty".into());
    }
    if !(0.0..=2.0).contains(&config.ai.temperature) {
        issues.push("ai.temperature must be in [0,2]".into());
    }
    if config.ai.top_p <= 0.0 || config.ai.top_p > 1.0 {
        issues.push("ai.top_p must be in (0,1]".into());
    }
    if config.ai.top_k == 0 {
        issues.push("ai.top_k must be >= 1".into());
    }
    if config.ai.max_output_tokens == 0 {
        issues.push("ai.max_output_tokens must be > 0".into());
    }

    // A missing Gemini key is not an issue: it just disables the AI
    // municipal source.

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load service configuration from environment and optional config file.
pub fn load_config() -> Result<ServiceConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = ServiceConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config.gemini_api_key = key;
    }
    if let Ok(raw) = std::env::var("FERIADOS_AI_ENABLED") {
        config.ai.enabled = parse_bool(&raw);
    }
    if let Ok(model) = std::env::var("FERIADOS_AI_MODEL") {
        config.ai.model = model;
    }
    if let Ok(raw) = std::env::var("FERIADOS_CACHE_TTL_SECS") {
        config.cache.holiday_ttl_secs = parse_positive_u64(&raw, "FERIADOS_CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("FERIADOS_HTTP_TIMEOUT_SECS") {
        config.http.timeout_secs = parse_positive_u64(&raw, "FERIADOS_HTTP_TIMEOUT_SECS")?;
    }
    if let Ok(country) = std::env::var("FERIADOS_COUNTRY") {
        config.country = country;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        for truthy in ["1", "true", "TRUE", "yes", "on", "anything"] {
            assert!(parse_bool(truthy), "{truthy} should be true");
        }
        for falsy in ["0", "false", "No", "OFF"] {
            assert!(!parse_bool(falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn test_parse_positive_u64() {
        assert_eq!(parse_positive_u64("3600", "X").unwrap(), 3600);
        assert!(parse_positive_u64("0", "X").is_err());
        assert!(parse_positive_u64("-1", "X").is_err());
        assert!(parse_positive_u64("abc", "X").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_validation_collects_all_issues() {
        let mut cfg = ServiceConfig::default();
        cfg.cache.holiday_ttl_secs = 0;
        cfg.ai.temperature = 5.0;
        cfg.ai.top_k = 0;

        let err = validate_config(&cfg).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("holiday_ttl_secs"));
        assert!(message.contains("temperature"));
        assert!(message.contains("top_k"));
    }

    #[test]
    fn test_missing_api_key_is_not_an_error() {
        let cfg = ServiceConfig::default();
        assert!(cfg.gemini_api_key.is_empty());
        assert!(validate_config(&cfg).is_ok());
    }
}
