//! BrasilAPI national-holiday client.
//!
//! Fetches the canonical national holidays for a year from
//! `brasilapi.com.br` and converts them to the shared `Holiday` format.
//! National holidays for a published year do not change, so successful
//! responses are cached per year for the process lifetime.

use std::sync::Arc;

use common::config::HttpConfig;
use common::date::parse_holiday_date;
use common::{Error, Holiday, HolidayKind};
use dashmap::DashMap;
use serde::Deserialize;
use tracing::debug;

const BASE_URL: &str = "https://brasilapi.com.br/api/feriados/v1";
const SOURCE: &str = "brasilapi";

/// BrasilAPI client with connection pooling and a year-keyed cache.
#[derive(Debug, Clone)]
pub struct BrasilApiClient {
    client: reqwest::Client,
    cache: Arc<DashMap<i32, Arc<Vec<Holiday>>>>,
}

// ── BrasilAPI response types ──────────────────────────────────────────

/// One holiday row from `GET /api/feriados/v1/{year}`.
#[derive(Debug, Deserialize)]
pub struct ApiHoliday {
    pub date: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub holiday_type: String,
}

// ── Implementation ────────────────────────────────────────────────────

impl BrasilApiClient {
    pub fn new(http: &HttpConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.clone())
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(http.timeout_secs))
            .build()
            .expect("failed to build BrasilAPI HTTP client");

        Self {
            client,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Fetch the national holidays for a year, bypassing the cache.
    ///
    /// Fails with `SourceUnavailable` on transport errors or non-2xx
    /// status; falling back to static data is the caller's decision, not
    /// this client's.
    pub async fn fetch_year(&self, year: i32) -> Result<Vec<Holiday>, Error> {
        let url = format!("{}/{}", BASE_URL, year);
        debug!("Fetching national holidays: {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable {
                name: SOURCE,
                reason: format!("HTTP error for year {year}: {e}"),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::SourceUnavailable {
                name: SOURCE,
                reason: format!(
                    "BrasilAPI returned {} for year {}: {}",
                    status.as_u16(),
                    year,
                    &body[..body.len().min(500)]
                ),
            });
        }

        let rows: Vec<ApiHoliday> = resp.json().await.map_err(|e| Error::MalformedResponse {
            name: SOURCE,
            reason: format!("JSON parse error for year {year}: {e}"),
        })?;

        let holidays = convert_rows(rows)?;
        debug!("Got {} national holidays for {}", holidays.len(), year);
        Ok(holidays)
    }

    /// Cached national-holiday lookup, keyed by year with no TTL.
    ///
    /// Only successful fetches are cached; a failed year is retried on
    /// the next call.
    pub async fn national_holidays(&self, year: i32) -> Result<Arc<Vec<Holiday>>, Error> {
        if let Some(cached) = self.cache.get(&year) {
            debug!(year, "national holiday cache hit");
            return Ok(cached.value().clone());
        }

        let fetched = Arc::new(self.fetch_year(year).await?);
        self.cache.insert(year, fetched.clone());
        Ok(fetched)
    }
}

/// Convert wire rows into `Holiday` records.
///
/// Every record from this endpoint is national regardless of the wire
/// `type` field; dates must be valid ISO calendar dates.
fn convert_rows(rows: Vec<ApiHoliday>) -> Result<Vec<Holiday>, Error> {
    rows.into_iter()
        .map(|row| {
            let date = parse_holiday_date(&row.date)?;
            Ok(Holiday::new(date, row.name, HolidayKind::National))
        })
        .collect()
}
