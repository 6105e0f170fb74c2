//! Gemini municipal-holiday client.
//!
//! Asks a Gemini model for the official municipal and state holidays of a
//! city/year and parses the JSON object embedded in the free-form reply.
//! This source is strictly best-effort: every failure mode (missing key,
//! transport error, unusable reply) degrades to `None` so callers can
//! proceed with what the other sources produced.

use std::sync::Arc;

use common::config::{AiConfig, HttpConfig};
use common::date::parse_holiday_date;
use common::{City, Error, Holiday, HolidayKind};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const SOURCE: &str = "gemini";

/// Gemini API client with a composite-key response cache.
///
/// Cached entries live for the process lifetime: the key space is the
/// handful of supported cities crossed with requested years, so growth is
/// bounded in practice even without eviction.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    ai: AiConfig,
    country: String,
    cache: Arc<DashMap<AiCacheKey, Arc<Vec<Holiday>>>>,
}

/// Case-insensitive composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AiCacheKey {
    city: String,
    state: String,
    country: String,
    year: i32,
}

impl AiCacheKey {
    fn new(city: City, country: &str, year: i32) -> Self {
        Self {
            city: city.key().to_string(),
            state: city
                .state()
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "none".into()),
            country: country.to_lowercase(),
            year,
        }
    }
}

// ── Gemini response types ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// The JSON object the prompt asks the model to produce.
#[derive(Debug, Deserialize)]
struct AiHolidayPayload {
    #[serde(default)]
    holidays: Vec<AiHolidayRow>,
}

#[derive(Debug, Deserialize)]
struct AiHolidayRow {
    date: String,
    name: String,
    #[serde(rename = "type")]
    kind: HolidayKind,
}

// ── Implementation ────────────────────────────────────────────────────

impl GeminiClient {
    pub fn new(api_key: Option<String>, ai: AiConfig, country: String, http: &HttpConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.clone())
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(http.timeout_secs))
            .build()
            .expect("failed to build Gemini HTTP client");

        let api_key = api_key.filter(|k| !k.trim().is_empty());

        Self {
            client,
            api_key,
            ai,
            country,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Look up municipal/state holidays for a city and year.
    ///
    /// Returns `None` on any failure; only successful lookups are cached.
    pub async fn municipal_holidays(&self, city: City, year: i32) -> Option<Arc<Vec<Holiday>>> {
        let key = AiCacheKey::new(city, &self.country, year);

        if let Some(cached) = self.cache.get(&key) {
            debug!(city = city.key(), year, "municipal AI cache hit");
            return Some(cached.value().clone());
        }

        match self.fetch(city, year).await {
            Ok(holidays) => {
                debug!(
                    city = city.key(),
                    year,
                    count = holidays.len(),
                    "municipal AI lookup succeeded"
                );
                let holidays = Arc::new(holidays);
                self.cache.insert(key, holidays.clone());
                Some(holidays)
            }
            Err(Error::ConfigurationMissing(reason)) => {
                debug!(city = city.key(), year, %reason, "municipal AI source disabled");
                None
            }
            Err(e) => {
                warn!(source = SOURCE, reason = %e, "source_failed");
                None
            }
        }
    }

    async fn fetch(&self, city: City, year: i32) -> Result<Vec<Holiday>, Error> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::ConfigurationMissing("GEMINI_API_KEY is not set".into())
        })?;

        let prompt = build_prompt(city, &self.country, year);
        let url = format!("{}/{}:generateContent", API_BASE, self.ai.model);

        let payload = json!({
            "contents": [{
                "parts": [{
                    "text": prompt
                }]
            }],
            "generationConfig": {
                "temperature": self.ai.temperature,
                "topP": self.ai.top_p,
                "topK": self.ai.top_k,
                "maxOutputTokens": self.ai.max_output_tokens,
            }
        });

        debug!(city = city.key(), year, model = %self.ai.model, "querying Gemini");

        let resp = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable {
                name: SOURCE,
                reason: format!("HTTP error for {}/{}: {}", city.key(), year, e),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::SourceUnavailable {
                name: SOURCE,
                reason: format!(
                    "Gemini returned {} for {}/{}: {}",
                    status.as_u16(),
                    city.key(),
                    year,
                    &body[..body.len().min(500)]
                ),
            });
        }

        let body: GenerateContentResponse =
            resp.json().await.map_err(|e| Error::MalformedResponse {
                name: SOURCE,
                reason: format!("JSON parse error for {}/{}: {}", city.key(), year, e),
            })?;

        parse_candidate_text(&body)
    }
}

/// Portuguese prompt requesting a strict JSON holiday list.
fn build_prompt(city: City, country: &str, year: i32) -> String {
    let place = match city.state() {
        Some(state) => format!("{}, {}", city.display_name(), state),
        None => city.display_name().to_string(),
    };

    format!(
        "Por favor, forneça os feriados municipais oficiais e pontos facultativos \
         para {place}, {country} em {year}.\n\
         \n\
         Inclua apenas:\n\
         1. Feriados municipais específicos da cidade\n\
         2. Feriados estaduais se aplicável\n\
         3. Datas exatas no formato YYYY-MM-DD\n\
         4. Nomes oficiais dos feriados em português\n\
         5. Tipo de feriado (city para municipal, state para estadual)\n\
         \n\
         Retorne apenas feriados oficiais, não datas comemorativas.\n\
         \n\
         Formato JSON exato:\n\
         {{\n\
           \"holidays\": [\n\
             {{\"date\": \"YYYY-MM-DD\", \"name\": \"Nome do Feriado\", \"type\": \"city\"}}\n\
           ]\n\
         }}\n\
         \n\
         Responda apenas com o JSON, sem texto adicional."
    )
}

/// Pull the holiday list out of the first candidate's text.
fn parse_candidate_text(body: &GenerateContentResponse) -> Result<Vec<Holiday>, Error> {
    let text = body
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .ok_or_else(|| Error::MalformedResponse {
            name: SOURCE,
            reason: "no candidate text in response".into(),
        })?;

    let object = extract_json_object(text).ok_or_else(|| Error::MalformedResponse {
        name: SOURCE,
        reason: "no JSON object in candidate text".into(),
    })?;

    let payload: AiHolidayPayload =
        serde_json::from_str(object).map_err(|e| Error::MalformedResponse {
            name: SOURCE,
            reason: format!("embedded JSON did not match holiday schema: {e}"),
        })?;

    payload
        .holidays
        .into_iter()
        .map(|row| {
            let date = parse_holiday_date(&row.date)?;
            Ok(Holiday::new(date, row.name, row.kind))
        })
        .collect()
}

/// Extract the first balanced `{...}` region of free-form text.
///
/// Brace tracking ignores braces inside JSON string literals so names
/// containing `{` cannot derail the scan.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
