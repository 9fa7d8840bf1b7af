//! Built-in template functions.
//!
//! Every function here is a plain `fn` over [`Value`] arguments, so none can
//! hold state between calls. The subject of an operation comes last
//! (`replace(old, new, s)`, `slice(start, end, list)`) so functions chain in a
//! pipeline. [`BUILTINS`] lists the functions the registry builder installs.

use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{Datelike, Local, Utc};
use sha2::Digest;
use tplsub_core::error::{TplError, TplResult};

use crate::coerce::{
    as_float, as_float_pair, as_int, as_int_pair, as_text, as_text_list, expect_list, expect_text,
};
use crate::layout;
use crate::path;
use crate::registry::Function;
use crate::value::Value;

/// Position names used in argument error messages.
const POSITIONS: [&str; 3] = ["first", "second", "third"];

/// The largest list `seq` will materialize.
pub const MAX_SEQ_LEN: u64 = 1_000_000;

/// The longest text, in bytes, `repeat` will build.
pub const MAX_REPEAT_LEN: usize = 64 * 1024 * 1024;

/// Every built-in function except `now`, whose clock depends on settings.
pub const BUILTINS: &[(&str, Function)] = &[
    // String
    ("upper", Function::Unary(upper)),
    ("lower", Function::Unary(lower)),
    ("trim", Function::Unary(trim)),
    ("trimLeft", Function::Unary(trim_left)),
    ("trimRight", Function::Unary(trim_right)),
    ("replace", Function::Ternary(replace)),
    ("split", Function::Binary(split)),
    ("join", Function::Binary(join)),
    ("contains", Function::Binary(contains)),
    ("hasPrefix", Function::Binary(has_prefix)),
    ("hasSuffix", Function::Binary(has_suffix)),
    ("repeat", Function::Binary(repeat)),
    // Integer math
    ("add", Function::Binary(add)),
    ("sub", Function::Binary(sub)),
    ("mul", Function::Binary(mul)),
    ("div", Function::Binary(div)),
    ("mod", Function::Binary(modulo)),
    // Float math
    ("addf", Function::Binary(addf)),
    ("subf", Function::Binary(subf)),
    ("mulf", Function::Binary(mulf)),
    ("divf", Function::Binary(divf)),
    // Date/time
    ("parseDate", Function::Binary(parse_date)),
    ("formatDate", Function::Binary(format_date)),
    ("timestamp", Function::Unary(timestamp)),
    ("year", Function::Unary(year)),
    ("month", Function::Unary(month)),
    ("day", Function::Unary(day)),
    // Collection
    ("len", Function::Unary(len)),
    ("first", Function::Unary(first)),
    ("last", Function::Unary(last)),
    ("slice", Function::Ternary(slice)),
    // Conditional
    ("default", Function::Binary(default)),
    ("empty", Function::Unary(empty)),
    // Path
    ("basename", Function::Unary(basename)),
    ("dirname", Function::Unary(dirname)),
    ("ext", Function::Unary(ext)),
    ("pathjoin", Function::Variadic(pathjoin)),
    // System
    ("env", Function::Unary(env)),
    // Sequence
    ("seq", Function::Binary(seq)),
    // Serialization
    ("toJSON", Function::Unary(to_json)),
    ("toPrettyJSON", Function::Unary(to_pretty_json)),
    // Digest/encoding
    ("md5", Function::Unary(md5)),
    ("sha1", Function::Unary(sha1)),
    ("sha256", Function::Unary(sha256)),
    ("base64Encode", Function::Unary(base64_encode)),
    ("base64Decode", Function::Unary(base64_decode)),
    // Conversion
    ("toInt", Function::Unary(to_int)),
    ("toFloat", Function::Unary(to_float)),
    ("toString", Function::Unary(to_string)),
    ("toInts", Function::Unary(to_ints)),
    ("toFloats", Function::Unary(to_floats)),
    ("toStrings", Function::Unary(to_strings)),
];

/// Returns the text of argument `pos` (0-based), or a `TypeMismatch` naming it.
fn text_arg(v: &Value, pos: usize) -> TplResult<&str> {
    expect_text(v).map_err(|e| e.context(format!("{} argument", POSITIONS[pos])))
}

fn len_to_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// ============================================================
// String functions
// ============================================================

/// `upper(s)`: uppercases text.
pub fn upper(s: &Value) -> TplResult<Value> {
    Ok(Value::Text(text_arg(s, 0)?.to_uppercase()))
}

/// `lower(s)`: lowercases text.
pub fn lower(s: &Value) -> TplResult<Value> {
    Ok(Value::Text(text_arg(s, 0)?.to_lowercase()))
}

/// `trim(s)`: strips leading and trailing whitespace.
pub fn trim(s: &Value) -> TplResult<Value> {
    Ok(Value::from(text_arg(s, 0)?.trim()))
}

/// `trimLeft(s)`: strips leading whitespace.
pub fn trim_left(s: &Value) -> TplResult<Value> {
    Ok(Value::from(text_arg(s, 0)?.trim_start()))
}

/// `trimRight(s)`: strips trailing whitespace.
pub fn trim_right(s: &Value) -> TplResult<Value> {
    Ok(Value::from(text_arg(s, 0)?.trim_end()))
}

/// `replace(old, new, s)`: replaces every occurrence of `old` in `s`.
pub fn replace(old: &Value, new: &Value, s: &Value) -> TplResult<Value> {
    let old = text_arg(old, 0)?;
    let new = text_arg(new, 1)?;
    Ok(Value::Text(text_arg(s, 2)?.replace(old, new)))
}

/// `split(sep, s)`: splits `s` on `sep`. An empty separator splits into characters.
pub fn split(sep: &Value, s: &Value) -> TplResult<Value> {
    let sep = text_arg(sep, 0)?;
    let s = text_arg(s, 1)?;
    let parts = if sep.is_empty() {
        s.chars().map(|c| Value::Text(c.to_string())).collect()
    } else {
        s.split(sep).map(Value::from).collect()
    };
    Ok(Value::List(parts))
}

/// `join(sep, list)`: renders each element as text and joins them.
pub fn join(sep: &Value, list: &Value) -> TplResult<Value> {
    let sep = text_arg(sep, 0)?;
    let items = as_text_list(list).map_err(|e| e.context("second argument"))?;
    Ok(Value::Text(items.join(sep)))
}

/// `contains(substr, s)`
pub fn contains(substr: &Value, s: &Value) -> TplResult<Value> {
    let substr = text_arg(substr, 0)?;
    Ok(Value::Bool(text_arg(s, 1)?.contains(substr)))
}

/// `hasPrefix(prefix, s)`
pub fn has_prefix(prefix: &Value, s: &Value) -> TplResult<Value> {
    let prefix = text_arg(prefix, 0)?;
    Ok(Value::Bool(text_arg(s, 1)?.starts_with(prefix)))
}

/// `hasSuffix(suffix, s)`
pub fn has_suffix(suffix: &Value, s: &Value) -> TplResult<Value> {
    let suffix = text_arg(suffix, 0)?;
    Ok(Value::Bool(text_arg(s, 1)?.ends_with(suffix)))
}

/// `repeat(count, s)`: repeats `s`.
///
/// A negative count, or a result longer than [`MAX_REPEAT_LEN`] bytes, is an
/// `InvalidArgument`.
pub fn repeat(count: &Value, s: &Value) -> TplResult<Value> {
    let count = as_int(count).map_err(|e| e.context("first argument"))?;
    let s = text_arg(s, 1)?;
    let times = usize::try_from(count).map_err(|_| {
        TplError::InvalidArgument(format!("repeat count must not be negative, got {count}"))
    })?;
    if s.len().checked_mul(times).filter(|n| *n <= MAX_REPEAT_LEN).is_none() {
        return Err(TplError::InvalidArgument(format!(
            "repeat({count}) of {} bytes exceeds the limit of {MAX_REPEAT_LEN} bytes",
            s.len()
        )));
    }
    Ok(Value::Text(s.repeat(times)))
}

// ============================================================
// Integer math
// ============================================================
//
// Results outside the i64 range fail with InvalidArgument rather than wrap.

fn overflow(op: &str, a: i64, b: i64) -> TplError {
    TplError::InvalidArgument(format!("integer overflow in {op}({a}, {b})"))
}

/// `add(a, b)`
pub fn add(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_int_pair(a, b)?;
    a.checked_add(b).map(Value::Int).ok_or_else(|| overflow("add", a, b))
}

/// `sub(a, b)`
pub fn sub(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_int_pair(a, b)?;
    a.checked_sub(b).map(Value::Int).ok_or_else(|| overflow("sub", a, b))
}

/// `mul(a, b)`
pub fn mul(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_int_pair(a, b)?;
    a.checked_mul(b).map(Value::Int).ok_or_else(|| overflow("mul", a, b))
}

/// `div(a, b)`: integer division truncating toward zero.
pub fn div(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_int_pair(a, b)?;
    if b == 0 {
        return Err(TplError::DivisionByZero(format!("div({a}, 0)")));
    }
    a.checked_div(b).map(Value::Int).ok_or_else(|| overflow("div", a, b))
}

/// `mod(a, b)`: remainder with the sign of `a`.
pub fn modulo(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_int_pair(a, b)?;
    if b == 0 {
        return Err(TplError::DivisionByZero(format!("mod({a}, 0)")));
    }
    a.checked_rem(b).map(Value::Int).ok_or_else(|| overflow("mod", a, b))
}

// ============================================================
// Float math
// ============================================================

/// `addf(a, b)`
pub fn addf(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_float_pair(a, b)?;
    Ok(Value::Float(a + b))
}

/// `subf(a, b)`
pub fn subf(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_float_pair(a, b)?;
    Ok(Value::Float(a - b))
}

/// `mulf(a, b)`
pub fn mulf(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_float_pair(a, b)?;
    Ok(Value::Float(a * b))
}

/// `divf(a, b)`: a zero divisor fails instead of producing an infinity.
pub fn divf(a: &Value, b: &Value) -> TplResult<Value> {
    let (a, b) = as_float_pair(a, b)?;
    if b == 0.0 {
        return Err(TplError::DivisionByZero(format!("divf({a}, {b})")));
    }
    Ok(Value::Float(a / b))
}

// ============================================================
// Date/time functions
// ============================================================

/// `now()` in the host's local zone.
pub fn now_local() -> TplResult<Value> {
    Ok(Value::Timestamp(Local::now().fixed_offset()))
}

/// `now()` in UTC.
pub fn now_utc() -> TplResult<Value> {
    Ok(Value::from(Utc::now()))
}

fn timestamp_arg(v: &Value, func: &str) -> TplResult<chrono::DateTime<chrono::FixedOffset>> {
    v.as_timestamp().copied().ok_or_else(|| {
        TplError::TypeMismatch(format!("{func} expects a timestamp, got {}", v.type_name()))
    })
}

/// `parseDate(layout, text)`: see [`crate::layout`] for the layout language.
pub fn parse_date(layout: &Value, text: &Value) -> TplResult<Value> {
    let layout = text_arg(layout, 0)?;
    let text = text_arg(text, 1)?;
    layout::parse_date(layout, text).map(Value::Timestamp)
}

/// `formatDate(layout, ts)`
pub fn format_date(layout: &Value, ts: &Value) -> TplResult<Value> {
    let layout = text_arg(layout, 0)?;
    let ts = timestamp_arg(ts, "formatDate")?;
    layout::format_date(layout, &ts).map(Value::Text)
}

/// `timestamp(ts)`: seconds since the Unix epoch.
pub fn timestamp(ts: &Value) -> TplResult<Value> {
    Ok(Value::Int(timestamp_arg(ts, "timestamp")?.timestamp()))
}

/// `year(ts)`
pub fn year(ts: &Value) -> TplResult<Value> {
    Ok(Value::Int(i64::from(timestamp_arg(ts, "year")?.year())))
}

/// `month(ts)`: the month number, 1 through 12.
pub fn month(ts: &Value) -> TplResult<Value> {
    Ok(Value::Int(i64::from(timestamp_arg(ts, "month")?.month())))
}

/// `day(ts)`: the day of the month.
pub fn day(ts: &Value) -> TplResult<Value> {
    Ok(Value::Int(i64::from(timestamp_arg(ts, "day")?.day())))
}

// ============================================================
// Collection functions
// ============================================================

/// `len(v)`: element count of a list or map, character count of text, and
/// 0 for anything else.
pub fn len(v: &Value) -> TplResult<Value> {
    let n = match v {
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        Value::Text(s) => s.chars().count(),
        _ => 0,
    };
    Ok(Value::Int(len_to_int(n)))
}

/// `first(list)`: the first element, or `Null` if the list is empty.
pub fn first(list: &Value) -> TplResult<Value> {
    let items = expect_list(list).map_err(|e| e.context("first"))?;
    Ok(items.first().cloned().unwrap_or(Value::Null))
}

/// `last(list)`: the last element, or `Null` if the list is empty.
pub fn last(list: &Value) -> TplResult<Value> {
    let items = expect_list(list).map_err(|e| e.context("last"))?;
    Ok(items.last().cloned().unwrap_or(Value::Null))
}

/// `slice(start, end, list)`: elements `start..end`. Any out-of-range bound
/// gives an empty list rather than an error.
pub fn slice(start: &Value, end: &Value, list: &Value) -> TplResult<Value> {
    let (start, end) = as_int_pair(start, end)?;
    let items = expect_list(list).map_err(|e| e.context("third argument"))?;
    let range = usize::try_from(start)
        .ok()
        .zip(usize::try_from(end).ok())
        .filter(|(s, e)| s <= e && *e <= items.len());
    Ok(Value::List(
        range.map_or_else(Vec::new, |(s, e)| items[s..e].to_vec()),
    ))
}

// ============================================================
// Conditional functions
// ============================================================

/// `default(fallback, value)`: `fallback` when `value` is `Null` or empty
/// text, otherwise `value`. Other empty values pass through.
pub fn default(fallback: &Value, value: &Value) -> TplResult<Value> {
    match value {
        Value::Null => Ok(fallback.clone()),
        Value::Text(s) if s.is_empty() => Ok(fallback.clone()),
        other => Ok(other.clone()),
    }
}

/// Returns `true` for `Null`, empty text, an empty list, or an empty map.
/// Zero and `false` are not empty.
pub fn is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Timestamp(_) => false,
    }
}

/// `empty(v)`: see [`is_empty`].
pub fn empty(v: &Value) -> TplResult<Value> {
    Ok(Value::Bool(is_empty(v)))
}

// ============================================================
// Path functions
// ============================================================

/// `basename(path)`
pub fn basename(p: &Value) -> TplResult<Value> {
    Ok(Value::Text(path::base(text_arg(p, 0)?)))
}

/// `dirname(path)`
pub fn dirname(p: &Value) -> TplResult<Value> {
    Ok(Value::Text(path::dir(text_arg(p, 0)?)))
}

/// `ext(path)`
pub fn ext(p: &Value) -> TplResult<Value> {
    Ok(Value::Text(path::ext(text_arg(p, 0)?)))
}

/// `pathjoin(segments...)`: takes text segments, or a single list of text.
pub fn pathjoin(args: &[Value]) -> TplResult<Value> {
    let segments = match args {
        [Value::List(items)] => items.as_slice(),
        _ => args,
    };
    let parts = segments
        .iter()
        .enumerate()
        .map(|(i, v)| {
            expect_text(v).map_err(|e| e.context(format!("pathjoin segment {i}")))
        })
        .collect::<TplResult<Vec<&str>>>()?;
    Ok(Value::Text(path::join(&parts)))
}

// ============================================================
// System
// ============================================================

/// `env(name)`: the variable's value, or empty text if unset or not UTF-8.
pub fn env(name: &Value) -> TplResult<Value> {
    Ok(Value::Text(std::env::var(as_text(name)).unwrap_or_default()))
}

// ============================================================
// Sequence
// ============================================================

/// An inclusive integer range, counting up when `start <= end` and down
/// otherwise.
///
/// `Seq` is `Copy`; every call to [`Seq::iter`] starts again from `start`.
///
/// ```
/// use tplsub_template::functions::Seq;
///
/// let down = Seq::new(3, 1);
/// assert_eq!(down.iter().collect::<Vec<_>>(), vec![3, 2, 1]);
/// assert_eq!(down.into_iter().count(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seq {
    start: i64,
    end: i64,
}

impl Seq {
    /// Creates the sequence `start..=end` in whichever direction applies.
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Returns the number of values, saturating at `u64::MAX`.
    pub const fn len(&self) -> u64 {
        self.start.abs_diff(self.end).saturating_add(1)
    }

    /// Always `false`: a sequence contains at least `start`.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Returns a fresh iterator over the sequence.
    pub const fn iter(&self) -> SeqIter {
        SeqIter {
            next: Some(self.start),
            end: self.end,
            ascending: self.start <= self.end,
        }
    }
}

impl IntoIterator for Seq {
    type Item = i64;
    type IntoIter = SeqIter;

    fn into_iter(self) -> SeqIter {
        self.iter()
    }
}

impl IntoIterator for &Seq {
    type Item = i64;
    type IntoIter = SeqIter;

    fn into_iter(self) -> SeqIter {
        self.iter()
    }
}

/// Iterator over a [`Seq`].
#[derive(Debug, Clone)]
pub struct SeqIter {
    next: Option<i64>,
    end: i64,
    ascending: bool,
}

impl Iterator for SeqIter {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next?;
        self.next = if current == self.end {
            None
        } else if self.ascending {
            Some(current + 1)
        } else {
            Some(current - 1)
        };
        Some(current)
    }
}

/// `seq(start, end)`: the values of [`Seq`] as a list of integers.
///
/// Sequences longer than [`MAX_SEQ_LEN`] fail with `InvalidArgument`.
pub fn seq(start: &Value, end: &Value) -> TplResult<Value> {
    let (start, end) = as_int_pair(start, end)?;
    let seq = Seq::new(start, end);
    if seq.len() > MAX_SEQ_LEN {
        return Err(TplError::InvalidArgument(format!(
            "seq({start}, {end}) has {} values, more than the limit of {MAX_SEQ_LEN}",
            seq.len()
        )));
    }
    Ok(Value::List(seq.iter().map(Value::Int).collect()))
}

// ============================================================
// Serialization
// ============================================================

/// `toJSON(v)`: compact JSON with sorted map keys.
pub fn to_json(v: &Value) -> TplResult<Value> {
    let json = v.to_json()?;
    serde_json::to_string(&json)
        .map(Value::Text)
        .map_err(|e| TplError::SerializationError(format!("failed to marshal to JSON: {e}")))
}

/// `toPrettyJSON(v)`: JSON indented by two spaces.
pub fn to_pretty_json(v: &Value) -> TplResult<Value> {
    let json = v.to_json()?;
    serde_json::to_string_pretty(&json).map(Value::Text).map_err(|e| {
        TplError::SerializationError(format!("failed to marshal to pretty JSON: {e}"))
    })
}

// ============================================================
// Digest/encoding
// ============================================================

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// `md5(s)`: lowercase hex digest.
pub fn md5(s: &Value) -> TplResult<Value> {
    let digest = ::md5::Md5::digest(text_arg(s, 0)?.as_bytes());
    Ok(Value::Text(hex_encode(&digest)))
}

/// `sha1(s)`: lowercase hex digest.
pub fn sha1(s: &Value) -> TplResult<Value> {
    let digest = ::sha1::Sha1::digest(text_arg(s, 0)?.as_bytes());
    Ok(Value::Text(hex_encode(&digest)))
}

/// `sha256(s)`: lowercase hex digest.
pub fn sha256(s: &Value) -> TplResult<Value> {
    let digest = sha2::Sha256::digest(text_arg(s, 0)?.as_bytes());
    Ok(Value::Text(hex_encode(&digest)))
}

/// `base64Encode(s)`: standard alphabet with padding.
pub fn base64_encode(s: &Value) -> TplResult<Value> {
    Ok(Value::Text(STANDARD.encode(text_arg(s, 0)?)))
}

/// `base64Decode(s)`: fails with `EncodingError` on malformed input or when
/// the decoded bytes are not UTF-8.
pub fn base64_decode(s: &Value) -> TplResult<Value> {
    let bytes = STANDARD
        .decode(text_arg(s, 0)?)
        .map_err(|e| TplError::EncodingError(format!("failed to decode base64: {e}")))?;
    String::from_utf8(bytes)
        .map(Value::Text)
        .map_err(|e| TplError::EncodingError(format!("decoded base64 is not UTF-8: {e}")))
}

// ============================================================
// Conversion
// ============================================================

/// `toInt(v)`
pub fn to_int(v: &Value) -> TplResult<Value> {
    as_int(v).map(Value::Int)
}

/// `toFloat(v)`
pub fn to_float(v: &Value) -> TplResult<Value> {
    as_float(v).map(Value::Float)
}

/// `toString(v)`
pub fn to_string(v: &Value) -> TplResult<Value> {
    Ok(Value::Text(as_text(v)))
}

fn map_list(list: &Value, f: fn(&Value) -> TplResult<Value>) -> TplResult<Value> {
    expect_list(list)?
        .iter()
        .enumerate()
        .map(|(i, v)| f(v).map_err(|e| e.context(format!("element {i}"))))
        .collect::<TplResult<Vec<_>>>()
        .map(Value::List)
}

/// `toInts(list)`: fails on the first element that is not an integer.
pub fn to_ints(list: &Value) -> TplResult<Value> {
    map_list(list, to_int)
}

/// `toFloats(list)`: fails on the first element that is not a float.
pub fn to_floats(list: &Value) -> TplResult<Value> {
    map_list(list, to_float)
}

/// `toStrings(list)`
pub fn to_strings(list: &Value) -> TplResult<Value> {
    map_list(list, to_string)
}
