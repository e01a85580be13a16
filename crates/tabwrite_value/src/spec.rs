//! Shared value/kind models and the per-column profile.

use chrono::NaiveDateTime;

////////////////////////////////////////////////////////////////////////////////
// #region KindModel

/// Semantic kind assigned to every cell value.
///
/// Classification is total: every [`SpecCellValue`] maps to exactly one kind,
/// with [`EnumValueKind::Null`] as the fallback for missing/blank input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumValueKind {
    /// Whole number within `i64` range.
    Integer,
    /// Finite number with a fractional part (or outside `i64` range).
    RealNumber,
    /// Text fallback.
    String,
    /// Boolean value.
    Boolean,
    /// Missing or blank value.
    Null,
    /// Not-a-number float.
    Nan,
    /// Positive or negative infinity.
    Infinity,
    /// Recognized date/time value.
    DateTime,
}

impl EnumValueKind {
    /// Stable lowercase name used in diagnostics and cache-key displays.
    pub fn as_name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::RealNumber => "real_number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Nan => "nan",
            Self::Infinity => "infinity",
            Self::DateTime => "datetime",
        }
    }

    /// True for the kinds written through a numeric cell primitive.
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Integer | Self::RealNumber)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueModel

/// Raw source value as handed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecCellValue {
    /// Missing value.
    None,
    /// Boolean value.
    Bool(bool),
    /// Integral value.
    Integer(i64),
    /// Floating-point value (may be NaN or infinite).
    Real(f64),
    /// Text value (classified further by content).
    Text(String),
    /// Date/time value.
    DateTime(NaiveDateTime),
}

/// Value coerced to the representation its kind mandates.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumRenderValue {
    /// Blank cell.
    None,
    /// Boolean cell.
    Bool(bool),
    /// Integer cell.
    Integer(i64),
    /// 64-bit float cell.
    Real(f64),
    /// Text cell.
    Text(String),
    /// Date/time cell.
    DateTime(NaiveDateTime),
}

impl EnumRenderValue {
    /// Text form used for width measurement and text-only sinks.
    pub fn to_display_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Bool(v) => if *v { "TRUE" } else { "FALSE" }.to_string(),
            Self::Integer(v) => v.to_string(),
            Self::Real(v) => v.to_string(),
            Self::Text(v) => v.clone(),
            Self::DateTime(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Replacement text applied when rendering missing/NaN/Inf values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecValuePolicy {
    /// Replacement text for missing values (empty keeps the cell blank).
    pub missing_str: String,
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecValuePolicy {
    fn default() -> Self {
        Self {
            missing_str: String::new(),
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// One classified cell: kind, mandated representation, and width/precision
/// figures consumed by the column statistics pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTypedCell {
    /// Assigned semantic kind.
    pub kind: EnumValueKind,
    /// Value in the representation the kind mandates.
    pub rendered: EnumRenderValue,
    /// Digits after the decimal point, canonical form. RealNumber only.
    pub n_decimal_places: Option<u32>,
    /// Character cells needed to display the rendered value.
    pub n_width_display: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnProfile

/// Frozen per-column statistics, fully populated before any cell is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecColumnProfile {
    /// Zero-based output column index.
    pub n_idx_col: usize,
    /// Maximum decimal-place count among RealNumber cells, if any.
    pub max_decimal_places: Option<u32>,
    /// Maximum display width among all observed values (headers included).
    pub n_width_display_max: usize,
    /// Column contains at least one RealNumber cell.
    pub if_has_real_number: bool,
    /// Column contains at least one Integer cell.
    pub if_has_integer: bool,
    /// Column-level kind used to gate number formats.
    pub kind_dominant: EnumValueKind,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
