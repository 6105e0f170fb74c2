//! Cross-source holiday resolution.
//!
//! One place decides precedence: national registry (or its static
//! fallback), then the city's static local addendum, then AI-sourced
//! additions. Records are deduplicated by calendar date, first seen wins,
//! so official sources always win ties against AI output.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use common::{City, Holiday, Result};
use tracing::{debug, warn};

use crate::source::{MunicipalSource, NationalSource};
use crate::table;

pub struct HolidayResolver {
    national: Arc<dyn NationalSource>,
    municipal: Option<Arc<dyn MunicipalSource>>,
}

impl HolidayResolver {
    pub fn new(national: Arc<dyn NationalSource>) -> Self {
        Self {
            national,
            municipal: None,
        }
    }

    /// Enable AI augmentation with the given municipal source.
    pub fn with_municipal(mut self, municipal: Arc<dyn MunicipalSource>) -> Self {
        self.municipal = Some(municipal);
        self
    }

    /// Produce the full holiday list for a city and year.
    ///
    /// Source failures are absorbed here: a failed national fetch is
    /// replaced by the static table, a failed municipal lookup is simply
    /// omitted. Callers see a complete list either way.
    pub async fn resolve(&self, city: City, year: i32) -> Result<Vec<Holiday>> {
        let national = match self.national.national_holidays(year).await {
            Ok(holidays) => holidays.as_ref().clone(),
            Err(e) => {
                warn!(
                    source = self.national.name(),
                    reason = %e,
                    "source_failed"
                );
                debug!(year, "substituting static national table");
                table::national_holidays(year)
            }
        };

        let mut seen: HashSet<NaiveDate> = HashSet::new();
        let mut merged: Vec<Holiday> = Vec::with_capacity(national.len() + 4);
        merge_unique(&mut merged, &mut seen, national);
        merge_unique(&mut merged, &mut seen, table::local_additions(city, year));

        // Municipal lookup needs a municipality; the national-only branch
        // has none.
        if let Some(municipal) = &self.municipal {
            if city.state().is_some() {
                match municipal.municipal_holidays(city, year).await {
                    Some(extra) => {
                        let before = merged.len();
                        merge_unique(&mut merged, &mut seen, extra.iter().cloned());
                        debug!(
                            city = city.key(),
                            year,
                            added = merged.len() - before,
                            skipped = extra.len() - (merged.len() - before),
                            "merged municipal additions"
                        );
                    }
                    None => {
                        debug!(city = city.key(), year, "no municipal augmentation");
                    }
                }
            }
        }

        Ok(merged)
    }
}

/// Append records whose date has not been seen yet, preserving order.
fn merge_unique(
    into: &mut Vec<Holiday>,
    seen: &mut HashSet<NaiveDate>,
    extra: impl IntoIterator<Item = Holiday>,
) {
    for holiday in extra {
        if seen.insert(holiday.date) {
            into.push(holiday);
        }
    }
}
