//! Cell value and cell representation.
//!
//! [`CellValue`] is the sum type a cell's materialized (displayed/cached)
//! value takes. [`Cell`] wraps a value together with the redundant logical
//! type tag and the optional attributes carried across a round trip: formula
//! text, number format, style, comment, and data-validation reference.

use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, NaiveDateTime};

use crate::style::Style;
use crate::validation::ValidationRule;

/// Excel's date epoch under the 1900 date system: serial `0` is
/// 1899-12-30. Serial `60` nominally lands on the nonexistent Feb 29 1900
/// (the well-known Lotus 1-2-3 leap-year bug Excel preserves for
/// compatibility); this conversion does not special-case it, matching the
/// behavior of every reader that just adds serial days to the epoch.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("1899-12-30 is a valid date")
}

/// Convert an Excel date serial number to a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.floor() as i64;
    excel_epoch().checked_add_signed(chrono::Duration::days(days))
}

/// Convert a calendar date to its Excel date serial number.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

/// Convert an Excel date serial number (integer part is the day, fractional
/// part is the time of day) to a calendar date-time.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let date = serial_to_date(serial)?;
    let seconds = (serial.fract().abs() * 86_400.0).round() as i64;
    date.and_hms_opt(0, 0, 0)?.checked_add_signed(chrono::Duration::seconds(seconds))
}

/// Convert a calendar date-time to its Excel date serial number.
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let whole_days = date_to_serial(dt.date());
    let seconds_since_midnight = dt.time().signed_duration_since(
        chrono::NaiveTime::from_hms_opt(0, 0, 0).expect("midnight is valid"),
    );
    whole_days + seconds_since_midnight.num_seconds() as f64 / 86_400.0
}

/// The materialized value of a cell.
///
/// For a formula cell this is the cached evaluated result, not the formula
/// text -- the codec never evaluates formulas itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// No value (empty cell).
    Empty,
    /// String value.
    String(String),
    /// Numeric value (integers are stored as f64, matching Excel's storage).
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Calendar date/time value, carried alongside the originating
    /// number-format so re-encoding reproduces the same display.
    Date(NaiveDateTime),
    /// Error value (e.g. #DIV/0!, #N/A, #VALUE!).
    Error(String),
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Empty
    }
}

impl CellValue {
    /// The logical type tag this value would carry.
    pub fn logical_type(&self) -> LogicalType {
        match self {
            CellValue::Empty => LogicalType::Empty,
            CellValue::String(_) => LogicalType::String,
            CellValue::Number(_) => LogicalType::Number,
            CellValue::Bool(_) => LogicalType::Bool,
            CellValue::Date(_) => LogicalType::Date,
            CellValue::Error(_) => LogicalType::Error,
        }
    }

    /// True if this value carries no meaningful content.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
            || matches!(self, CellValue::String(s) if s.is_empty())
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Error(e) => write!(f, "{e}"),
        }
    }
}

/// The logical type tag carried redundantly alongside a [`CellValue`].
///
/// Kept distinct from `CellValue`'s own discriminant so a round trip through
/// a lossy serialization can be checked for agreement (§3 invariant): after
/// decode, `cell.logical_type == cell.value.logical_type()` must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalType {
    Empty,
    String,
    Number,
    Bool,
    Date,
    Error,
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// A single cell: its materialized value plus the attributes that round
/// trip alongside it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Materialized (cached/display) value.
    pub value: CellValue,
    /// Redundant logical type tag; see [`LogicalType`].
    pub logical_type: LogicalType,
    /// Formula text in original A1 notation, if this cell holds a formula.
    /// The cached result lives in `value`, not here.
    pub formula: Option<String>,
    /// Number-format pattern string (e.g. `"$#,##0.00"`).
    pub number_format: Option<String>,
    /// Style descriptor (font, fill, borders, alignment).
    pub style: Option<Style>,
    /// Cell comment text, if any.
    pub comment: Option<String>,
    /// Data-validation rule applying to this cell, if any.
    pub validation: Option<ValidationRule>,
}

impl Default for LogicalType {
    fn default() -> Self {
        LogicalType::Empty
    }
}

impl Cell {
    /// Build a cell from a value, deriving the logical type tag from it.
    pub fn new(value: CellValue) -> Self {
        let logical_type = value.logical_type();
        Cell {
            value,
            logical_type,
            formula: None,
            number_format: None,
            style: None,
            comment: None,
            validation: None,
        }
    }

    /// Attach formula text, keeping the cached result already in `value`.
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// True if the cell has no value, formula, or comment -- a candidate for
    /// `ignore_empty_cells` pruning during decode.
    pub fn is_empty(&self) -> bool {
        self.formula.is_none() && self.comment.is_none() && matches!(self.value, CellValue::Empty)
    }

    /// True iff the logical type tag agrees with the value's own tag, per
    /// the §3 round-trip invariant.
    pub fn tags_agree(&self) -> bool {
        self.logical_type == self.value.logical_type()
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Cell::new(value)
    }
}
