//! Duration literals.
//!
//! Two grammars are accepted. The ISO-8601 form (`PT20S`, `P2DT3H4M`,
//! `PT1.5S`) is tried first; otherwise the literal must be a run of
//! `<integer><unit>` segments such as `1hour30min20sec`, in any order, with
//! repeated units summed. Rendering always produces the composite form.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;
const SECS_PER_MIN: u128 = 60;
const SECS_PER_HOUR: u128 = 3_600;
const SECS_PER_DAY: u128 = 86_400;

/// Why a duration literal was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// Nothing to parse.
    #[error("duration is empty")]
    Empty,

    /// The literal denotes a negative span.
    #[error("negative durations are not supported")]
    Negative,

    /// A segment names an unsupported unit.
    #[error("incorrect or unsupported time unit '{0}'")]
    UnknownUnit(String),

    /// A number with no unit after it.
    #[error("amount '{0}' has no time unit")]
    MissingUnit(String),

    /// A unit with no number before it.
    #[error("time unit '{0}' has no amount")]
    MissingAmount(String),

    /// Characters that belong to neither grammar.
    #[error("unexpected text '{0}'")]
    Unexpected(String),

    /// The span does not fit in a duration.
    #[error("duration is too large")]
    Overflow,
}

fn iso_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^([-+]?)P(?:([-+]?[0-9]+)D)?(T(?:([-+]?[0-9]+)H)?(?:([-+]?[0-9]+)M)?(?:([-+]?[0-9]+)(?:[.,]([0-9]{0,9}))?S)?)?$",
        )
        .unwrap_or_else(|e| unreachable!("invalid ISO duration pattern: {e}"))
    })
}

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+)([^0-9]*)")
            .unwrap_or_else(|e| unreachable!("invalid duration segment pattern: {e}"))
    })
}

/// Parses a duration literal.
///
/// # Errors
///
/// Returns a [`DurationError`] when the literal matches neither grammar,
/// names an unknown unit, is negative, or overflows.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use layercfg::convert::parse_duration;
///
/// assert_eq!(parse_duration("PT20S").unwrap(), Duration::from_secs(20));
/// assert_eq!(parse_duration("1hour30min20sec").unwrap(), Duration::from_secs(5420));
/// assert!(parse_duration("10hourss").is_err());
/// ```
pub fn parse_duration(literal: &str) -> Result<Duration, DurationError> {
    let literal = literal.trim();
    if literal.is_empty() {
        return Err(DurationError::Empty);
    }
    match parse_iso(literal) {
        Some(result) => result,
        None => parse_composite(literal),
    }
}

/// Returns `None` when the literal is not in ISO form at all.
fn parse_iso(literal: &str) -> Option<Result<Duration, DurationError>> {
    let caps = iso_pattern().captures(literal)?;

    let days = caps.get(2);
    let time = caps.get(3);
    let hours = caps.get(4);
    let minutes = caps.get(5);
    let seconds = caps.get(6);

    if days.is_none() && time.is_none() {
        return None;
    }
    if time.is_some() && hours.is_none() && minutes.is_none() && seconds.is_none() {
        return None;
    }

    Some(iso_total(&caps))
}

fn iso_component(m: Option<regex::Match<'_>>, unit_secs: u128) -> Result<i128, DurationError> {
    let Some(m) = m else {
        return Ok(0);
    };
    let amount: i64 = m.as_str().parse().map_err(|_| DurationError::Overflow)?;
    i128::from(amount)
        .checked_mul((unit_secs * NANOS_PER_SEC) as i128)
        .ok_or(DurationError::Overflow)
}

fn iso_total(caps: &regex::Captures<'_>) -> Result<Duration, DurationError> {
    let seconds = caps.get(6);
    let mut total = iso_component(caps.get(2), SECS_PER_DAY)?
        + iso_component(caps.get(4), SECS_PER_HOUR)?
        + iso_component(caps.get(5), SECS_PER_MIN)?
        + iso_component(seconds, 1)?;

    if let Some(fraction) = caps.get(7).filter(|m| !m.as_str().is_empty()) {
        let digits = format!("{:0<9}", fraction.as_str());
        let nanos: i128 = digits.parse().map_err(|_| DurationError::Overflow)?;
        let negative = seconds.is_some_and(|s| s.as_str().starts_with('-'));
        total += if negative { -nanos } else { nanos };
    }

    if caps.get(1).is_some_and(|s| s.as_str() == "-") {
        total = -total;
    }
    if total < 0 {
        return Err(DurationError::Negative);
    }
    from_total_nanos(total.unsigned_abs())
}

fn parse_composite(literal: &str) -> Result<Duration, DurationError> {
    let mut total: u128 = 0;
    let mut rest = literal;

    while !rest.is_empty() {
        let Some(caps) = segment_pattern().captures(rest) else {
            return Err(leading_error(rest));
        };
        let amount_text = &caps[1];
        let unit = &caps[2];
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(amount_text.to_string()));
        }

        let amount: u128 = amount_text
            .parse::<u64>()
            .map_err(|_| DurationError::Overflow)?
            .into();
        let unit_nanos = unit_nanos(unit)?;
        total = amount
            .checked_mul(unit_nanos)
            .and_then(|nanos| total.checked_add(nanos))
            .ok_or(DurationError::Overflow)?;

        rest = &rest[caps[0].len()..];
    }

    from_total_nanos(total)
}

fn leading_error(rest: &str) -> DurationError {
    if let Some(after_sign) = rest.strip_prefix('-') {
        if after_sign.starts_with(|c: char| c.is_ascii_digit()) {
            return DurationError::Negative;
        }
    }
    if rest.chars().all(char::is_alphabetic) {
        DurationError::MissingAmount(rest.to_string())
    } else {
        DurationError::Unexpected(rest.to_string())
    }
}

fn unit_nanos(unit: &str) -> Result<u128, DurationError> {
    let nanos = match unit.to_lowercase().as_str() {
        "nanos" => 1,
        "micros" => 1_000,
        "millis" => 1_000_000,
        "sec" | "secs" | "second" | "seconds" => NANOS_PER_SEC,
        "min" | "mins" | "minute" | "minutes" => SECS_PER_MIN * NANOS_PER_SEC,
        "hour" | "hours" => SECS_PER_HOUR * NANOS_PER_SEC,
        "halfday" | "halfdays" => SECS_PER_DAY / 2 * NANOS_PER_SEC,
        "day" | "days" => SECS_PER_DAY * NANOS_PER_SEC,
        "week" | "weeks" => 7 * SECS_PER_DAY * NANOS_PER_SEC,
        _ => return Err(DurationError::UnknownUnit(unit.to_string())),
    };
    Ok(nanos)
}

fn from_total_nanos(total: u128) -> Result<Duration, DurationError> {
    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| DurationError::Overflow)?;
    // Remainder of a division by 1e9 always fits.
    let nanos = (total % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, nanos))
}

/// Renders a duration in the composite form accepted by [`parse_duration`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use layercfg::convert::format_duration;
///
/// assert_eq!(format_duration(Duration::ZERO), "0secs");
/// assert_eq!(format_duration(Duration::from_secs(5420)), "1hour30mins20secs");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0secs".to_string();
    }

    let secs = u128::from(duration.as_secs());
    let sub = duration.subsec_nanos();

    let mut out = String::new();
    let mut push = |amount: u128, singular: &str, plural: &str| {
        match amount {
            0 => {}
            1 => {
                out.push('1');
                out.push_str(singular);
            }
            n => {
                out.push_str(&n.to_string());
                out.push_str(plural);
            }
        }
    };

    push(secs / SECS_PER_DAY, "day", "days");
    push(secs % SECS_PER_DAY / SECS_PER_HOUR, "hour", "hours");
    push(secs % SECS_PER_HOUR / SECS_PER_MIN, "min", "mins");
    push(secs % SECS_PER_MIN, "sec", "secs");
    push(u128::from(sub / 1_000_000), "millis", "millis");
    push(u128::from(sub / 1_000 % 1_000), "micros", "micros");
    push(u128::from(sub % 1_000), "nanos", "nanos");

    out
}
