//! Feriados: Brazilian holiday lookup CLI.
//!
//! Thin driver over the holiday resolution pipeline:
//! 1. Loads configuration (.env, config.toml, environment)
//! 2. Wires the BrasilAPI and Gemini clients into the resolver
//! 3. Resolves the holiday list for one (city, year)
//! 4. Prints the result

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use brasilapi_client::BrasilApiClient;
use common::date::format_holiday_date;
use common::{City, HolidayKind};
use gemini_client::GeminiClient;
use holiday_service::{HolidayResolver, HolidayService};

/// Brazilian holiday lookup
#[derive(Parser)]
#[command(name = "feriados", about = "Brazilian work-day/holiday lookup")]
struct Cli {
    /// City to resolve: salvador, rio-de-janeiro (rio), sao-paulo (sp),
    /// or brazil for the federal set.
    #[arg(long, default_value = "brazil")]
    city: String,

    /// Year to resolve.
    #[arg(long)]
    year: i32,

    /// Print only the ISO dates, one per line.
    #[arg(long)]
    dates_only: bool,

    /// Skip AI municipal augmentation for this run.
    #[arg(long)]
    no_ai: bool,
}

fn kind_label(kind: HolidayKind) -> &'static str {
    match kind {
        HolidayKind::National => "national",
        HolidayKind::State => "state",
        HolidayKind::City => "city",
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "feriados=info,holiday_service=info,brasilapi_client=info,gemini_client=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let city = City::parse(&cli.city);
    info!(
        "Resolving holidays for {} ({}) in {}",
        city.display_name(),
        city.key(),
        cli.year
    );

    // Wire sources into the resolver.
    let registry = Arc::new(BrasilApiClient::new(&cfg.http));
    let mut resolver = HolidayResolver::new(registry);

    if cfg.ai.enabled && !cli.no_ai {
        let api_key = (!cfg.gemini_api_key.is_empty()).then(|| cfg.gemini_api_key.clone());
        let gemini = Arc::new(GeminiClient::new(
            api_key,
            cfg.ai.clone(),
            cfg.country.clone(),
            &cfg.http,
        ));
        resolver = resolver.with_municipal(gemini);
    } else {
        info!("AI municipal augmentation disabled");
    }

    let service = HolidayService::new(
        resolver,
        Duration::from_secs(cfg.cache.holiday_ttl_secs),
    );

    if cli.dates_only {
        for date in service.get_holiday_dates(&cli.city, cli.year).await {
            println!("{}", format_holiday_date(date));
        }
        return;
    }

    let holidays = service.get_holidays(&cli.city, cli.year).await;
    for holiday in holidays.iter() {
        println!(
            "{}  {:<8}  {}",
            format_holiday_date(holiday.date),
            kind_label(holiday.kind),
            holiday.name
        );
    }
    info!(
        "{} holidays for {} in {}",
        holidays.len(),
        city.display_name(),
        cli.year
    );
}
