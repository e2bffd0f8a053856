use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

/// `0x1234…abcd` form for labels.
pub fn short_address(address: &str) -> String {
    const HEAD: usize = 6;
    const TAIL: usize = 4;

    if address.len() <= HEAD + TAIL + 1 || !address.is_ascii() {
        return address.to_owned();
    }
    format!("{}…{}", &address[..HEAD], &address[address.len() - TAIL..])
}

pub fn format_amount(value: f64) -> String {
    if value == 0.0 {
        "0 ETH".to_owned()
    } else if value >= 1_000.0 {
        format!("{value:.0} ETH")
    } else if value >= 1.0 {
        format!("{value:.3} ETH")
    } else {
        format!("{value:.6} ETH")
    }
}

/// `YYYY-MM-DD HH:MM UTC` for a Unix timestamp in seconds.
pub fn format_timestamp(seconds: u64) -> String {
    const DAY: u64 = 86_400;

    let (year, month, day) = civil_from_days(seconds / DAY);
    let time = seconds % DAY;
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02} UTC",
        time / 3_600,
        time % 3_600 / 60
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let shifted = days + 719_468;
    let era = shifted / 146_097;
    let day_of_era = shifted % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    // Months counted from March, so the leap day ends the year.
    let march_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * march_month + 2) / 5 + 1;
    let month = if march_month < 10 {
        march_month + 3
    } else {
        march_month - 9
    };
    let year = year_of_era + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

/// Deterministic unit vector for a pair of indices, used when two points
/// coincide and have no direction of their own.
pub fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214 + 0.37) * TAU;
    vec2(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_long_addresses_only() {
        assert_eq!(
            short_address("0x52908400098527886e0f7030069857d2e4169ee7"),
            "0x5290…9ee7"
        );
        assert_eq!(short_address("0xa"), "0xa");
    }

    #[test]
    fn amount_precision_follows_magnitude() {
        assert_eq!(format_amount(0.0), "0 ETH");
        assert_eq!(format_amount(0.5), "0.500000 ETH");
        assert_eq!(format_amount(12.25), "12.250 ETH");
        assert_eq!(format_amount(4_200.4), "4200 ETH");
    }

    #[test]
    fn timestamps_format_as_utc_dates() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
        assert_eq!(format_timestamp(951_782_400), "2000-02-29 00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13 UTC");
    }

    #[test]
    fn fallback_direction_is_unit_length() {
        for (a, b) in [(0, 0), (0, 1), (7, 3), (1_000, 2)] {
            assert!((fallback_direction(a, b).length() - 1.0).abs() < 1e-4);
        }
    }
}
