//! PDF date strings.
//!
//! Dates are text strings of the form `D:YYYYMMDDHHmmSSOHH'mm'`. Only the
//! year is mandatory; every later field may be omitted, in which case it
//! takes its default (month and day 1, time 00:00:00, UT).

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

/// Parse a PDF date.
///
/// With `relaxed` set, the `D:` prefix may be missing and the apostrophe
/// after the offset minutes may be omitted or doubled up, as many producers
/// do. Returns `None` for anything that is not a valid calendar instant.
pub fn parse_pdf_date(raw: &[u8], relaxed: bool) -> Option<DateTime<FixedOffset>> {
    let text = std::str::from_utf8(raw).ok()?.trim();

    let body = match text.strip_prefix("D:") {
        Some(rest) => rest,
        None if relaxed => text,
        None => return None,
    };

    let digits_end = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (digits, tail) = body.split_at(digits_end);

    // YYYY, then optional MM DD HH mm SS in pairs.
    if digits.len() < 4 || digits.len() > 14 || digits.len() % 2 != 0 {
        return None;
    }
    let field = |start: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + 2) {
            Some(s) => s.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits[0..4].parse().ok()?;
    let month = field(4, 1)?;
    let day = field(6, 1)?;
    let hour = field(8, 0)?;
    let minute = field(10, 0)?;
    let second = field(12, 0)?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let offset = parse_offset(tail, relaxed)?;

    offset.from_local_datetime(&naive).single()
}

/// Parse the `OHH'mm'` suffix. An empty suffix means UT.
fn parse_offset(tail: &str, relaxed: bool) -> Option<FixedOffset> {
    let mut chars = tail.chars();
    let sign = match chars.next() {
        None => return FixedOffset::east_opt(0),
        Some('Z') => {
            let rest = chars.as_str();
            // `Z00'00'` is seen in the wild.
            let zeros = rest.trim_matches(|c| c == '0' || c == '\'').is_empty();
            return if rest.is_empty() || (relaxed && zeros) {
                FixedOffset::east_opt(0)
            } else {
                None
            };
        }
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return None,
    };

    let rest = chars.as_str();
    let (hours, rest) = take_two_digits(rest)?;
    if hours > 23 {
        return None;
    }

    let minutes = if rest.is_empty() {
        0
    } else {
        let rest = rest.strip_prefix('\'')?;
        if rest.is_empty() {
            0
        } else {
            let (minutes, rest) = take_two_digits(rest)?;
            let well_formed = rest == "'" || (relaxed && (rest.is_empty() || rest == "''"));
            if !well_formed || minutes > 59 {
                return None;
            }
            minutes
        }
    };

    FixedOffset::east_opt(sign * (hours as i32 * 3600 + minutes as i32 * 60))
}

fn take_two_digits(s: &str) -> Option<(u32, &str)> {
    let head = s.get(0..2)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((head.parse().ok()?, &s[2..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_full_date() {
        let date = parse_pdf_date(b"D:20240315142530+01'00'", false).unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 14);
        assert_eq!(date.second(), 30);
        assert_eq!(date.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_year_only() {
        let date = parse_pdf_date(b"D:1999", false).unwrap();
        assert_eq!(date.year(), 1999);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_parse_negative_offset_and_utc() {
        let date = parse_pdf_date(b"D:20201231235959-05'30'", false).unwrap();
        assert_eq!(date.offset().local_minus_utc(), -(5 * 3600 + 30 * 60));

        let utc = parse_pdf_date(b"D:20201231235959Z", false).unwrap();
        assert_eq!(utc.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_strict_requires_prefix_and_closing_apostrophe() {
        assert!(parse_pdf_date(b"20240315", false).is_none());
        assert!(parse_pdf_date(b"D:20240315142530+01'00", false).is_none());
    }

    #[test]
    fn test_relaxed_tolerates_common_deviations() {
        assert!(parse_pdf_date(b"20240315", true).is_some());
        assert!(parse_pdf_date(b"D:20240315142530+01'00", true).is_some());
        assert!(parse_pdf_date(b"D:20240315142530Z00'00'", true).is_some());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_pdf_date(b"D:2024131", false).is_none()); // odd digit count
        assert!(parse_pdf_date(b"D:20241301", false).is_none()); // month 13
        assert!(parse_pdf_date(b"D:20240230", false).is_none()); // Feb 30
        assert!(parse_pdf_date(b"D:20240101+25'00'", false).is_none());
        assert!(parse_pdf_date(b"not a date", true).is_none());
    }
}
