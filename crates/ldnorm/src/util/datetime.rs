//! RFC 3339 date/datetime parsing and formatting.
//!
//! Date-valued record properties are held as microseconds since the Unix
//! epoch plus the UTC offset (in minutes) they were written with. A bare
//! calendar date (`YYYY-MM-DD`) is read as midnight at its offset.

use std::str::FromStr;

use crate::error::DateTimeParseError;

const MICROSECONDS_PER_SECOND: i64 = 1_000_000;
const MICROSECONDS_PER_MINUTE: i64 = 60 * MICROSECONDS_PER_SECOND;
const MICROSECONDS_PER_HOUR: i64 = 60 * MICROSECONDS_PER_MINUTE;
const MICROSECONDS_PER_DAY: i64 = 24 * MICROSECONDS_PER_HOUR;

fn malformed(what: &'static str, input: &str) -> DateTimeParseError {
    DateTimeParseError::Malformed {
        what,
        input: input.to_string(),
    }
}

fn out_of_range(field: &'static str, input: &str) -> DateTimeParseError {
    DateTimeParseError::FieldOutOfRange {
        field,
        input: input.to_string(),
    }
}

/// Parses a fixed-width numeric field. Signs are rejected.
fn parse_digits<T: FromStr>(field: &str) -> Option<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Parses a timezone offset (`Z`, `+HH:MM`, `-HH:MM`) into minutes.
fn parse_offset(offset: &str) -> Result<i16, DateTimeParseError> {
    let invalid = || DateTimeParseError::InvalidOffset {
        offset: offset.to_string(),
    };

    if offset == "Z" || offset == "z" {
        return Ok(0);
    }
    if offset.len() != 6 || !offset.is_ascii() || offset.as_bytes()[3] != b':' {
        return Err(invalid());
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1i16,
        b'-' => -1i16,
        _ => return Err(invalid()),
    };
    let hours: i16 = parse_digits(&offset[1..3]).ok_or_else(invalid)?;
    let minutes: i16 = parse_digits(&offset[4..6]).ok_or_else(invalid)?;

    // ±24:00 is the only offset allowed to reach a full day
    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return Err(invalid());
    }

    Ok(sign * (hours * 60 + minutes))
}

fn format_offset(offset_min: i16) -> String {
    if offset_min == 0 {
        return "Z".to_string();
    }
    let sign = if offset_min >= 0 { '+' } else { '-' };
    let abs = offset_min.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Pads or truncates a fractional-seconds digit string to microseconds.
fn parse_fraction(frac: &str) -> i64 {
    let mut digits: String = frac.chars().take(6).collect();
    while digits.len() < 6 {
        digits.push('0');
    }
    digits.parse().unwrap_or(0)
}

fn format_fraction(us: i64) -> String {
    if us == 0 {
        return String::new();
    }
    let s = format!("{:06}", us);
    format!(".{}", s.trim_end_matches('0'))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since the Unix epoch (Howard Hinnant's `days_from_civil`).
fn date_to_days(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let m = if month <= 2 { month + 9 } else { month - 3 } as i64;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let doy = (153 * m + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`date_to_days`].
fn days_to_date(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}

/// Parses and range-checks the `YYYY-MM-DD` prefix, returning days since epoch.
fn parse_calendar_date(date: &str, input: &str, what: &'static str) -> Result<i64, DateTimeParseError> {
    let bytes = date.as_bytes();
    if date.len() != 10 || !date.is_ascii() || bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(malformed(what, input));
    }

    let year: i32 = parse_digits(&date[..4]).ok_or_else(|| out_of_range("year", input))?;
    let month: u32 = parse_digits(&date[5..7]).ok_or_else(|| out_of_range("month", input))?;
    let day: u32 = parse_digits(&date[8..10]).ok_or_else(|| out_of_range("day", input))?;

    if !(1..=12).contains(&month) {
        return Err(out_of_range("month", input));
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(out_of_range("day", input));
    }

    Ok(date_to_days(year, month, day))
}

/// Parses an RFC 3339 calendar date (`YYYY-MM-DD` with optional offset).
///
/// Returns microseconds since the Unix epoch for local midnight at the given
/// offset, and the offset in minutes.
pub fn parse_date_rfc3339(input: &str) -> Result<(i64, i16), DateTimeParseError> {
    if input.len() < 10 || !input.is_char_boundary(10) {
        return Err(malformed("date", input));
    }
    let days = parse_calendar_date(&input[..10], input, "date")?;
    let offset_min = match &input[10..] {
        "" => 0,
        rest => parse_offset(rest)?,
    };
    let epoch_us = days * MICROSECONDS_PER_DAY - i64::from(offset_min) * MICROSECONDS_PER_MINUTE;
    Ok((epoch_us, offset_min))
}

/// Parses an RFC 3339 datetime string.
///
/// Accepts `T`, `t` or a space as the date/time separator, optional
/// fractional seconds (truncated to microseconds), and an optional offset
/// (missing means UTC). Returns microseconds since the Unix epoch and the
/// offset in minutes.
pub fn parse_datetime_rfc3339(input: &str) -> Result<(i64, i16), DateTimeParseError> {
    if input.len() < 19 || !input.is_ascii() {
        return Err(malformed("datetime", input));
    }
    if !matches!(input.as_bytes()[10], b'T' | b't' | b' ') {
        return Err(malformed("datetime", input));
    }

    let days = parse_calendar_date(&input[..10], input, "datetime")?;

    let time = &input[11..];
    let tb = time.as_bytes();
    if tb[2] != b':' || tb[5] != b':' {
        return Err(malformed("datetime", input));
    }
    let hours: i64 = parse_digits(&time[..2]).ok_or_else(|| out_of_range("hours", input))?;
    let minutes: i64 = parse_digits(&time[3..5]).ok_or_else(|| out_of_range("minutes", input))?;
    let seconds: i64 = parse_digits(&time[6..8]).ok_or_else(|| out_of_range("seconds", input))?;
    if hours > 23 {
        return Err(out_of_range("hours", input));
    }
    if minutes > 59 {
        return Err(out_of_range("minutes", input));
    }
    if seconds > 59 {
        return Err(out_of_range("seconds", input));
    }

    let rest = &time[8..];
    let (micros, offset) = match rest.strip_prefix('.') {
        Some(frac_and_tz) => {
            let end = frac_and_tz
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(frac_and_tz.len());
            if end == 0 {
                return Err(malformed("datetime", input));
            }
            (parse_fraction(&frac_and_tz[..end]), &frac_and_tz[end..])
        }
        None => (0, rest),
    };
    let offset_min = if offset.is_empty() { 0 } else { parse_offset(offset)? };

    let local_us = days * MICROSECONDS_PER_DAY
        + hours * MICROSECONDS_PER_HOUR
        + minutes * MICROSECONDS_PER_MINUTE
        + seconds * MICROSECONDS_PER_SECOND
        + micros;

    // local = UTC + offset
    Ok((local_us - i64::from(offset_min) * MICROSECONDS_PER_MINUTE, offset_min))
}

/// Formats microseconds since the Unix epoch as an RFC 3339 datetime at the
/// given offset.
///
/// Instants within an offset of the `i64` range are clamped to its ends.
pub fn format_datetime_rfc3339(epoch_us: i64, offset_min: i16) -> String {
    let local_us = epoch_us.saturating_add(i64::from(offset_min) * MICROSECONDS_PER_MINUTE);
    let days = local_us.div_euclid(MICROSECONDS_PER_DAY);
    let time_us = local_us.rem_euclid(MICROSECONDS_PER_DAY);

    let (year, month, day) = days_to_date(days);
    let hours = time_us / MICROSECONDS_PER_HOUR;
    let minutes = time_us % MICROSECONDS_PER_HOUR / MICROSECONDS_PER_MINUTE;
    let seconds = time_us % MICROSECONDS_PER_MINUTE / MICROSECONDS_PER_SECOND;
    let micros = time_us % MICROSECONDS_PER_SECOND;

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{}",
        year,
        month,
        day,
        hours,
        minutes,
        seconds,
        format_fraction(micros),
        format_offset(offset_min)
    )
}
