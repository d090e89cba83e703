//! Best-effort parsing of the provider's free-text `observed_on_string`.
//!
//! Observers type dates by hand or have them filled in by a browser, so the
//! field arrives in many layouts: `2013-02-20 10:47:25 AM PST`,
//! `Wed Feb 20 2013 10:47:25 GMT-0800 (PST)`, `February 20, 2013 at 10:47 AM`
//! and so on. Parsing is never attempted implicitly while decoding a record.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::error::ObservedOnError;

const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%a %b %d %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M:%S %p",
    "%d %B %Y %H:%M",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%a %b %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Parse a free-text observation date. Strings without a zone are read as UTC,
/// date-only strings as midnight.
pub fn parse_observed_on(input: &str) -> Result<DateTime<FixedOffset>, ObservedOnError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ObservedOnError::Empty);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed);
    }

    let mut tokens: Vec<&str> = strip_zone_name(trimmed)
        .split_whitespace()
        .filter(|token| !token.eq_ignore_ascii_case("on") && !token.eq_ignore_ascii_case("at"))
        .collect();

    let offset = match tokens.last().and_then(|token| parse_zone(token)) {
        Some(offset) => {
            tokens.pop();
            offset
        }
        None => utc(),
    };
    let unrecognized = || ObservedOnError::Unrecognized(input.to_string());
    if tokens.is_empty() {
        return Err(unrecognized());
    }

    let text = tokens.join(" ");
    let naive = DATE_TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(&text, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(&text, layout).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(unrecognized)?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(unrecognized)
}

/// Drop a trailing `(PST)`-style zone name as written by `Date.toString()`.
fn strip_zone_name(input: &str) -> &str {
    if input.ends_with(')') {
        if let Some(open) = input.rfind('(') {
            return input[..open].trim_end();
        }
    }
    input
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn hours(h: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(h * 3600)
}

fn parse_zone(token: &str) -> Option<FixedOffset> {
    let upper = token.to_ascii_uppercase();
    if let Some(offset) = zone_abbreviation(&upper) {
        return Some(offset);
    }
    let rest = upper
        .strip_prefix("GMT")
        .or_else(|| upper.strip_prefix("UTC"))
        .unwrap_or(&upper);
    if rest.is_empty() {
        return Some(utc());
    }
    parse_numeric_offset(rest)
}

/// `+hhmm`, `-hh:mm`, `+h`.
fn parse_numeric_offset(value: &str) -> Option<FixedOffset> {
    let sign = match value.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = value[1..].chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (h, m) = if digits.len() <= 2 {
        (digits.as_str(), "0")
    } else {
        digits.split_at(digits.len() - 2)
    };
    let h: i32 = h.parse().ok()?;
    let m: i32 = m.parse().ok()?;
    if m >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

fn zone_abbreviation(name: &str) -> Option<FixedOffset> {
    match name {
        "Z" | "UTC" | "GMT" | "UT" => Some(utc()),
        "BST" | "IST" | "CET" => hours(1),
        "CEST" | "EET" | "SAST" => hours(2),
        "EEST" | "MSK" => hours(3),
        "AWST" => hours(8),
        "JST" => hours(9),
        "AEST" => hours(10),
        "AEDT" => hours(11),
        "NZST" => hours(12),
        "NZDT" => hours(13),
        "ADT" => hours(-3),
        "AST" | "EDT" => hours(-4),
        "EST" | "CDT" => hours(-5),
        "CST" | "MDT" => hours(-6),
        "MST" | "PDT" => hours(-7),
        "PST" | "AKDT" => hours(-8),
        "AKST" => hours(-9),
        "HST" => hours(-10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> String {
        parse_observed_on(input).unwrap().to_rfc3339()
    }

    #[test]
    fn twelve_hour_clock_with_zone_abbreviation() {
        assert_eq!(parsed("2013-02-20 10:47:25 AM PST"), "2013-02-20T10:47:25-08:00");
        assert_eq!(parsed("2016-07-02 2:55:27 PM EDT"), "2016-07-02T14:55:27-04:00");
        assert_eq!(parsed("2013/02/20 10:47 PM UTC"), "2013-02-20T22:47:00+00:00");
    }

    #[test]
    fn javascript_date_string() {
        assert_eq!(
            parsed("Wed Feb 20 2013 10:47:25 GMT-0800 (PST)"),
            "2013-02-20T10:47:25-08:00"
        );
        assert_eq!(
            parsed("Sat Jun 01 2019 08:00:00 GMT+0530 (IST)"),
            "2019-06-01T08:00:00+05:30"
        );
    }

    #[test]
    fn connective_words_are_ignored() {
        assert_eq!(parsed("February 20, 2013 at 10:47 AM"), "2013-02-20T10:47:00+00:00");
        assert_eq!(parsed("on 2019-06-01"), "2019-06-01T00:00:00+00:00");
    }

    #[test]
    fn date_only_is_midnight_utc() {
        assert_eq!(parsed("2013-02-20"), "2013-02-20T00:00:00+00:00");
        assert_eq!(parsed("March 3, 2021"), "2021-03-03T00:00:00+00:00");
    }

    #[test]
    fn rfc3339_passes_through() {
        assert_eq!(parsed("2024-05-01T09:30:00+02:00"), "2024-05-01T09:30:00+02:00");
    }

    #[test]
    fn numeric_offsets() {
        assert_eq!(parse_numeric_offset("-08:00"), FixedOffset::east_opt(-8 * 3600));
        assert_eq!(parse_numeric_offset("+0530"), FixedOffset::east_opt(5 * 3600 + 1800));
        assert_eq!(parse_numeric_offset("+3"), FixedOffset::east_opt(3 * 3600));
        assert_eq!(parse_numeric_offset("0800"), None);
        assert_eq!(parse_numeric_offset("+08x0"), None);
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse_observed_on(""), Err(ObservedOnError::Empty));
        assert_eq!(parse_observed_on("   "), Err(ObservedOnError::Empty));
    }

    #[test]
    fn garbage_is_unrecognized() {
        assert_eq!(
            parse_observed_on("sometime last spring"),
            Err(ObservedOnError::Unrecognized("sometime last spring".to_string()))
        );
        assert!(matches!(
            parse_observed_on("2013-13-45"),
            Err(ObservedOnError::Unrecognized(_))
        ));
        assert!(matches!(
            parse_observed_on("PST"),
            Err(ObservedOnError::Unrecognized(_))
        ));
    }
}
