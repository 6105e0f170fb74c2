//! Source seams for the resolver.
//!
//! The resolver talks to its inputs through these traits so tests can
//! substitute in-memory fakes for the network clients.

use std::sync::Arc;

use async_trait::async_trait;
use brasilapi_client::BrasilApiClient;
use common::{City, Holiday, Result};
use gemini_client::GeminiClient;

/// A source of canonical national holidays, keyed by year only.
///
/// Implementations must not apply any fallback of their own — deciding
/// what to do about a failed source is the resolver's job.
#[async_trait]
pub trait NationalSource: Send + Sync {
    async fn national_holidays(&self, year: i32) -> Result<Arc<Vec<Holiday>>>;

    /// Identifier used in `source_failed` events.
    fn name(&self) -> &'static str;
}

/// A best-effort source of municipal/state holidays for a city.
///
/// `None` means "no augmentation available" — never an error.
#[async_trait]
pub trait MunicipalSource: Send + Sync {
    async fn municipal_holidays(&self, city: City, year: i32) -> Option<Arc<Vec<Holiday>>>;

    fn name(&self) -> &'static str;
}

#[async_trait]
impl NationalSource for BrasilApiClient {
    async fn national_holidays(&self, year: i32) -> Result<Arc<Vec<Holiday>>> {
        BrasilApiClient::national_holidays(self, year).await
    }

    fn name(&self) -> &'static str {
        "brasilapi"
    }
}

#[async_trait]
impl MunicipalSource for GeminiClient {
    async fn municipal_holidays(&self, city: City, year: i32) -> Option<Arc<Vec<Holiday>>> {
        GeminiClient::municipal_holidays(self, city, year).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
