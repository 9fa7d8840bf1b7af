//! Date layouts for `parseDate` and `formatDate`.
//!
//! A layout is written as an example date rather than with `%` directives.
//! Two token families are recognized, longest match first:
//!
//! | Meaning | Reference-date token | Symbolic token |
//! |---|---|---|
//! | 4-digit year | `2006` | `YYYY` |
//! | 2-digit year | `06` | `YY` |
//! | month, zero-padded | `01` | `MM` |
//! | month, unpadded | `1` | |
//! | month name | `January`, `Jan` | |
//! | day, zero-padded | `02` | `DD` |
//! | day, unpadded / space-padded | `2` / `_2` | |
//! | day of year | `002` | |
//! | weekday name | `Monday`, `Mon` | |
//! | hour (24h) | `15` | `HH` |
//! | hour (12h) | `03`, `3` | |
//! | AM/PM | `PM`, `pm` | |
//! | minute | `04`, `4` | `mm` |
//! | second | `05`, `5` | `ss` |
//! | fractional second | `.000`, `.000000`, `.000000000` | |
//! | UTC offset | `-0700`, `-07:00` | |
//! | UTC offset, `Z` for UTC | `Z0700`, `Z07:00` | |
//! | zone abbreviation | `MST` | |
//!
//! Everything else is literal text. Parsing consumes the whole input; a
//! layout without a year reads year 0, without a month or day reads January
//! or the 1st, without a time reads midnight, and without an offset reads UTC.
//! A 12-hour layout without `PM` reads hours as AM.
//!
//! `-0700` and `-07:00` always format numerically (`+00:00` for UTC). The
//! `Z` forms format a zero offset as `Z` and parse either `Z` or a numeric
//! offset. `MST` parses any abbreviation without reading an offset from it,
//! and formats `UTC` for a zero offset and the numeric `+hhmm` form otherwise.

use std::fmt::Write as _;

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use tplsub_core::error::{TplError, TplResult};

/// The calendar field a layout token fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Ordinal,
    Weekday,
    Hour24,
    Hour12,
    AmPm,
    Minute,
    Second,
    Fraction,
    Offset,
    ZoneName,
}

/// A layout token: how it parses, how it formats, and how it formats a
/// timestamp whose offset is zero.
struct Token {
    text: &'static str,
    parse: &'static str,
    format: &'static str,
    format_utc: &'static str,
    field: Field,
}

const fn same(text: &'static str, directive: &'static str, field: Field) -> Token {
    Token {
        text,
        parse: directive,
        format: directive,
        format_utc: directive,
        field,
    }
}

/// Layout tokens, longest first.
const TOKENS: &[Token] = &[
    same(".000000000", "%.9f", Field::Fraction),
    same("January", "%B", Field::Month),
    same(".000000", "%.6f", Field::Fraction),
    same("Monday", "%A", Field::Weekday),
    Token {
        text: "Z07:00",
        parse: "%#z",
        format: "%:z",
        format_utc: "Z",
        field: Field::Offset,
    },
    same("-07:00", "%:z", Field::Offset),
    Token {
        text: "Z0700",
        parse: "%#z",
        format: "%z",
        format_utc: "Z",
        field: Field::Offset,
    },
    same("-0700", "%z", Field::Offset),
    same("2006", "%Y", Field::Year),
    same("YYYY", "%Y", Field::Year),
    same(".000", "%.3f", Field::Fraction),
    same("Jan", "%b", Field::Month),
    same("Mon", "%a", Field::Weekday),
    Token {
        text: "MST",
        parse: "%Z",
        format: "%z",
        format_utc: "UTC",
        field: Field::ZoneName,
    },
    same("002", "%j", Field::Ordinal),
    same("YY", "%y", Field::Year),
    same("MM", "%m", Field::Month),
    same("DD", "%d", Field::Day),
    same("HH", "%H", Field::Hour24),
    same("mm", "%M", Field::Minute),
    same("ss", "%S", Field::Second),
    same("01", "%m", Field::Month),
    same("02", "%d", Field::Day),
    same("03", "%I", Field::Hour12),
    same("04", "%M", Field::Minute),
    same("05", "%S", Field::Second),
    same("06", "%y", Field::Year),
    same("15", "%H", Field::Hour24),
    same("PM", "%p", Field::AmPm),
    same("pm", "%P", Field::AmPm),
    same("_2", "%e", Field::Day),
    same("1", "%-m", Field::Month),
    same("2", "%-d", Field::Day),
    same("3", "%-I", Field::Hour12),
    same("4", "%-M", Field::Minute),
    same("5", "%-S", Field::Second),
];

/// A compiled date layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source: String,
    strftime: String,
    format: String,
    format_utc: String,
    fields: Vec<Field>,
}

impl Layout {
    /// Compiles a layout string. Compilation cannot fail: unrecognized text is literal.
    pub fn compile(layout: &str) -> Self {
        let mut strftime = String::with_capacity(layout.len() * 2);
        let mut format = String::with_capacity(layout.len() * 2);
        let mut format_utc = String::with_capacity(layout.len() * 2);
        let mut fields = Vec::new();
        let mut rest = layout;

        while !rest.is_empty() {
            if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(t.text)) {
                strftime.push_str(token.parse);
                format.push_str(token.format);
                format_utc.push_str(token.format_utc);
                fields.push(token.field);
                rest = &rest[token.text.len()..];
                continue;
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                let literal = if c == '%' { "%%".to_string() } else { c.to_string() };
                strftime.push_str(&literal);
                format.push_str(&literal);
                format_utc.push_str(&literal);
            }
            rest = chars.as_str();
        }

        Self {
            source: layout.to_string(),
            strftime,
            format,
            format_utc,
            fields,
        }
    }

    /// Returns the layout as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the strftime format string text is parsed with.
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    fn has(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Parses `text` against this layout.
    ///
    /// # Errors
    ///
    /// Returns [`TplError::ParseError`] if the text does not match the layout,
    /// has trailing input, or names an impossible date.
    pub fn parse(&self, text: &str) -> TplResult<DateTime<FixedOffset>> {
        let fail = |reason: String| {
            TplError::ParseError(format!(
                "failed to parse date '{text}' with layout '{}': {reason}",
                self.source
            ))
        };

        let mut parsed = Parsed::new();
        format::parse(&mut parsed, text, StrftimeItems::new(&self.strftime))
            .map_err(|e| fail(e.to_string()))?;

        self.fill_defaults(&mut parsed).map_err(|e| fail(e.to_string()))?;

        let date = parsed.to_naive_date().map_err(|e| fail(e.to_string()))?;
        let time = parsed.to_naive_time().map_err(|e| fail(e.to_string()))?;
        let offset = if self.has(Field::Offset) {
            parsed.to_fixed_offset().map_err(|e| fail(e.to_string()))?
        } else {
            utc_offset()
        };

        offset
            .from_local_datetime(&NaiveDateTime::new(date, time))
            .single()
            .ok_or_else(|| fail("ambiguous local time".to_string()))
    }

    fn fill_defaults(&self, parsed: &mut Parsed) -> format::ParseResult<()> {
        if !self.has(Field::Year) {
            parsed.set_year(0)?;
        }
        if !self.has(Field::Ordinal) {
            if !self.has(Field::Month) {
                parsed.set_month(1)?;
            }
            if !self.has(Field::Day) {
                parsed.set_day(1)?;
            }
        }
        if self.has(Field::Hour12) {
            if !self.has(Field::AmPm) {
                parsed.set_ampm(false)?;
            }
        } else if !self.has(Field::Hour24) {
            parsed.set_hour(0)?;
        }
        if !self.has(Field::Minute) {
            parsed.set_minute(0)?;
        }
        Ok(())
    }

    /// Formats a timestamp with this layout.
    ///
    /// A zero offset formats as `Z` for the `Z0700`/`Z07:00` tokens and as
    /// `UTC` for `MST`.
    ///
    /// # Errors
    ///
    /// Returns [`TplError::InvalidArgument`] if the formatter rejects the layout.
    pub fn format(&self, ts: &DateTime<FixedOffset>) -> TplResult<String> {
        let directives = if ts.offset().local_minus_utc() == 0 {
            &self.format_utc
        } else {
            &self.format
        };
        let mut out = String::new();
        write!(out, "{}", ts.format(directives)).map_err(|_| {
            TplError::InvalidArgument(format!("cannot format date with layout '{}'", self.source))
        })?;
        Ok(out)
    }
}

/// Parses `text` with a layout string. See [`Layout::parse`].
///
/// # Errors
///
/// Returns [`TplError::ParseError`] if the text does not match the layout.
pub fn parse_date(layout: &str, text: &str) -> TplResult<DateTime<FixedOffset>> {
    Layout::compile(layout).parse(text)
}

/// Formats a timestamp with a layout string. See [`Layout::format`].
///
/// # Errors
///
/// Returns [`TplError::InvalidArgument`] if the formatter rejects the layout.
pub fn format_date(layout: &str, ts: &DateTime<FixedOffset>) -> TplResult<String> {
    Layout::compile(layout).format(ts)
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
