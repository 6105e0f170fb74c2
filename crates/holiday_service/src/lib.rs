//! Holiday resolution and caching.
//!
//! `HolidayService` is the outward-facing façade: a per-(city, year) TTL
//! cache with request coalescing in front of `HolidayResolver`, which
//! merges the national registry (or its static fallback), the static
//! per-city addenda, and optional AI-sourced municipal holidays into one
//! deduplicated, insertion-ordered list.

pub mod resolver;
pub mod service;
pub mod source;
pub mod table;

pub use resolver::HolidayResolver;
pub use service::HolidayService;
pub use source::{MunicipalSource, NationalSource};
