//! Static holiday table.
//!
//! The last-resort fallback when the national registry is unreachable,
//! and the only source of per-city local holidays (local holidays are
//! never fetched remotely). Pure functions of (city, year); no I/O and no
//! failure modes.

use chrono::NaiveDate;
use common::{City, Holiday, HolidayKind};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("static holiday date is valid")
}

/// The eight fixed national holidays.
pub fn national_holidays(year: i32) -> Vec<Holiday> {
    use HolidayKind::National;
    vec![
        Holiday::new(date(year, 1, 1), "Confraternização Universal", National),
        Holiday::new(date(year, 4, 21), "Tiradentes", National),
        Holiday::new(date(year, 5, 1), "Dia do Trabalho", National),
        Holiday::new(date(year, 9, 7), "Independência do Brasil", National),
        Holiday::new(date(year, 10, 12), "Nossa Senhora Aparecida", National),
        Holiday::new(date(year, 11, 2), "Finados", National),
        Holiday::new(date(year, 11, 15), "Proclamação da República", National),
        Holiday::new(date(year, 12, 25), "Natal", National),
    ]
}

/// Per-city local-holiday addendum. Empty for the national-only branch.
pub fn local_additions(city: City, year: i32) -> Vec<Holiday> {
    use HolidayKind::{City as Municipal, State};
    match city {
        City::Salvador => vec![
            Holiday::new(date(year, 1, 6), "Santos Reis", Municipal),
            Holiday::new(date(year, 6, 24), "São João", Municipal),
            Holiday::new(date(year, 6, 29), "São Pedro", Municipal),
            Holiday::new(date(year, 7, 2), "Independência da Bahia", State),
        ],
        City::RioDeJaneiro => vec![
            Holiday::new(date(year, 4, 23), "Dia de São Jorge", State),
            Holiday::new(date(year, 10, 17), "Morte de Zumbi dos Palmares", Municipal),
            Holiday::new(date(year, 11, 20), "Dia da Consciência Negra", State),
        ],
        City::SaoPaulo => vec![
            // Carnival shifts with Easter; this fixed date matches the
            // approximation the calculator has always used.
            Holiday::new(date(year, 2, 13), "Carnaval", Municipal),
            Holiday::new(date(year, 9, 9), "Revolução Constitucionalista", State),
        ],
        City::Brazil => Vec::new(),
    }
}

/// Full static list for a city: national set plus the local addendum.
pub fn holidays_for(city: City, year: i32) -> Vec<Holiday> {
    let mut holidays = national_holidays(year);
    holidays.extend(local_additions(city, year));
    holidays
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_national_set_has_eight_fixed_dates() {
        for year in [1999, 2024, 2025, 2030] {
            let holidays = national_holidays(year);
            assert_eq!(holidays.len(), 8);
            assert!(holidays.iter().all(|h| h.kind == HolidayKind::National));
            assert!(holidays
                .iter()
                .any(|h| h.date == date(year, 9, 7) && h.name == "Independência do Brasil"));
            assert!(holidays.iter().any(|h| h.date == date(year, 12, 25)));
        }
    }

    #[test]
    fn test_city_addenda_sizes() {
        assert_eq!(local_additions(City::Salvador, 2025).len(), 4);
        assert_eq!(local_additions(City::RioDeJaneiro, 2025).len(), 3);
        assert_eq!(local_additions(City::SaoPaulo, 2025).len(), 2);
        assert!(local_additions(City::Brazil, 2025).is_empty());
    }

    #[test]
    fn test_holidays_for_is_unique_by_date() {
        for city in [
            City::Salvador,
            City::RioDeJaneiro,
            City::SaoPaulo,
            City::Brazil,
        ] {
            let holidays = holidays_for(city, 2025);
            let dates: HashSet<_> = holidays.iter().map(|h| h.date).collect();
            assert_eq!(dates.len(), holidays.len(), "duplicate date for {city:?}");
        }
    }

    #[test]
    fn test_brazil_is_national_only() {
        assert_eq!(holidays_for(City::Brazil, 2025), national_holidays(2025));
    }
}
