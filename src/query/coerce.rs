//! Coercion of raw request strings into typed values
//!
//! Every function here returns `None` (or a `Never` predicate) instead of
//! an error: an unparsable value can never match anything.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::core::descriptor::{DateKind, NumberKind, TypeCategory};
use crate::core::field::FieldValue;
use crate::core::predicate::{FieldPath, Predicate};

/// Literal that selects null values
pub const NULL_LITERAL: &str = "null";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// A date or date-time parsed from request input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedDate {
    /// Wall-clock value as written
    pub naive: NaiveDateTime,
    /// Offset written in the input, if any
    pub offset: Option<FixedOffset>,
    /// No time of day was given: match the whole calendar day
    pub whole_day: bool,
}

impl ParsedDate {
    /// The wall-clock value in `zone`
    fn local_in(&self, zone: FixedOffset) -> NaiveDateTime {
        match self.offset {
            Some(offset) => offset
                .from_local_datetime(&self.naive)
                .single()
                .map(|dt| dt.with_timezone(&zone).naive_local())
                .unwrap_or(self.naive),
            None => self.naive,
        }
    }

    /// The absolute instant, localizing naive input in `zone`
    fn instant_in(&self, zone: FixedOffset) -> Option<DateTime<Utc>> {
        localize(self.naive, self.offset.unwrap_or(zone))
    }
}

fn localize(naive: NaiveDateTime, zone: FixedOffset) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse date input in the accepted formats
pub fn parse_date(raw: &str) -> Option<ParsedDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedDate {
            naive: dt.naive_local(),
            offset: Some(*dt.offset()),
            whole_day: false,
        });
    }

    let has_colon = raw.contains(':');
    let naive = DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })?;

    Some(ParsedDate {
        naive,
        offset: None,
        whole_day: naive.time() == NaiveTime::MIN && !has_colon,
    })
}

/// Midnight of the following day; `None` past the last representable date
fn next_day(start: NaiveDateTime) -> Option<NaiveDateTime> {
    start.checked_add_signed(Duration::days(1))
}

/// Predicate matching a parsed date against a date-like property
///
/// Whole-day input becomes the half-open range `[day, day + 1)`; anything
/// else matches the exact value. Offset-aware properties compare instants,
/// with naive input localized in `zone`.
pub fn date_match(path: FieldPath, kind: DateKind, parsed: &ParsedDate, zone: FixedOffset) -> Predicate {
    match kind {
        DateKind::Date | DateKind::DateTime => {
            let local = parsed.local_in(zone);
            if parsed.whole_day {
                let start = local.date().and_time(NaiveTime::MIN);
                match next_day(start) {
                    Some(end) => Predicate::Range {
                        path,
                        start: FieldValue::DateTime(start),
                        end: FieldValue::DateTime(end),
                    },
                    None => Predicate::Never,
                }
            } else {
                Predicate::Equals(path, FieldValue::DateTime(local))
            }
        }
        DateKind::Timestamp => {
            if parsed.whole_day {
                let start = parsed.naive.date().and_time(NaiveTime::MIN);
                let zone = parsed.offset.unwrap_or(zone);
                let end = next_day(start).and_then(|end| localize(end, zone));
                match (localize(start, zone), end) {
                    (Some(start), Some(end)) => Predicate::Range {
                        path,
                        start: FieldValue::Timestamp(start),
                        end: FieldValue::Timestamp(end),
                    },
                    _ => Predicate::Never,
                }
            } else {
                match parsed.instant_in(zone) {
                    Some(instant) => Predicate::Equals(path, FieldValue::Timestamp(instant)),
                    None => Predicate::Never,
                }
            }
        }
    }
}

/// Filter predicate for a date-like property
///
/// `null` matches nulls on nullable properties and nothing otherwise;
/// unparsable input matches nothing.
pub fn date_predicate(
    path: FieldPath,
    kind: DateKind,
    nullable: bool,
    raw: &str,
    zone: FixedOffset,
) -> Predicate {
    if raw.trim().eq_ignore_ascii_case(NULL_LITERAL) {
        return if nullable {
            Predicate::IsNull(path)
        } else {
            Predicate::Never
        };
    }
    match parse_date(raw) {
        Some(parsed) => date_match(path, kind, &parsed, zone),
        None => {
            tracing::debug!(field = %path, "unparsable date filter value");
            Predicate::Never
        }
    }
}

/// Coerce one raw value to the storage type of a scalar property
pub fn coerce_scalar(category: &TypeCategory, raw: &str, zone: FixedOffset) -> Option<FieldValue> {
    let raw = raw.trim();
    match category {
        TypeCategory::String => Some(FieldValue::String(raw.to_string())),
        TypeCategory::Number(NumberKind::Integer) => raw.parse::<i64>().ok().map(FieldValue::Integer),
        TypeCategory::Number(NumberKind::Float) => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(FieldValue::Float),
        TypeCategory::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Some(FieldValue::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(FieldValue::Boolean(false))
            } else {
                None
            }
        }
        TypeCategory::Guid => Uuid::parse_str(raw).ok().map(FieldValue::Uuid),
        TypeCategory::Enum(descriptor) => descriptor.parse(raw).map(FieldValue::Integer),
        TypeCategory::Date(DateKind::Timestamp) => parse_date(raw)
            .and_then(|p| p.instant_in(zone))
            .map(FieldValue::Timestamp),
        TypeCategory::Date(_) => parse_date(raw).map(|p| FieldValue::DateTime(p.local_in(zone))),
        TypeCategory::Object(_) | TypeCategory::Collection => None,
    }
}
