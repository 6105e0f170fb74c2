//! Service configuration types.

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Gemini API key. Empty means the AI municipal source is disabled.
    #[serde(default)]
    pub gemini_api_key: String,

    /// Country name used in AI prompts and cache keys.
    #[serde(default = "default_country")]
    pub country: String,

    /// AI municipal-holiday lookup settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// Resolved-holiday cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Generation settings for the AI municipal source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Master switch for AI augmentation.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Gemini model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Top-k sampling cutoff.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Response token budget.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

/// Cache behavior for resolved holiday lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for resolved (city, year) entries, in seconds.
    #[serde(default = "default_holiday_ttl")]
    pub holiday_ttl_secs: u64,
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. A timed-out call is treated the
    /// same as an unreachable source.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_country() -> String {
    "Brasil".into()
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_temperature() -> f64 {
    0.1
}
fn default_top_p() -> f64 {
    0.8
}
fn default_top_k() -> u32 {
    10
}
fn default_max_output_tokens() -> u32 {
    1024
}

fn default_holiday_ttl() -> u64 {
    3600
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "feriados/0.1 (holiday lookup; contact@example.com)".into()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            holiday_ttl_secs: default_holiday_ttl(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            country: default_country(),
            ai: AiConfig::default(),
            cache: CacheConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ServiceConfig::default();
        assert!(cfg.gemini_api_key.is_empty());
        assert!(cfg.ai.enabled);
        assert_eq!(cfg.ai.model, "gemini-2.0-flash");
        assert_eq!(cfg.cache.holiday_ttl_secs, 3600);
        assert_eq!(cfg.http.timeout_secs, 30);
        assert_eq!(cfg.country, "Brasil");
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let cfg: ServiceConfig =
            serde_json::from_str(r#"{"ai": {"temperature": 0.5}}"#).unwrap();
        assert!((cfg.ai.temperature - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.ai.top_k, 10);
        assert_eq!(cfg.cache.holiday_ttl_secs, 3600);
    }
}
