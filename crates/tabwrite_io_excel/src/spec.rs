//! Render-engine models: formats, options, cache keys, errors, reports.

use std::collections::BTreeMap;
use std::fmt;

use tabwrite_value::{EnumValueKind, SpecCellValue, SpecColumnProfile, SpecValuePolicy};

use crate::conf;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Style property bag merged over backend defaults.
///
/// `None` means "keep the default"; a set attribute overrides it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Horizontal or vertical alignment keyword.
    pub align: Option<String>,
    /// Vertical alignment keyword.
    pub valign: Option<String>,
    /// Text wrap.
    pub text_wrap: Option<bool>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,
    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Overlay `patch` onto `self`: set attributes of `patch` win.
    pub fn merge(&self, patch: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: patch.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: patch.font_size.or(self.font_size),
            bold: patch.bold.or(self.bold),
            align: patch.align.clone().or_else(|| self.align.clone()),
            valign: patch.valign.clone().or_else(|| self.valign.clone()),
            text_wrap: patch.text_wrap.or(self.text_wrap),
            border: patch.border.or(self.border),
            top: patch.top.or(self.top),
            bottom: patch.bottom.or(self.bottom),
            left: patch.left.or(self.left),
            right: patch.right.or(self.right),
            num_format: patch.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: patch.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: patch.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }

    /// Return `self` with a number format code set.
    pub fn with_num_format(&self, c_num_format: &str) -> SpecCellFormat {
        let mut fmt = self.clone();
        fmt.num_format = Some(c_num_format.to_string());
        fmt
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableInput

/// Canonical tabular input: header labels plus a row-major value matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecTableData {
    /// Worksheet/table name; empty or absent names get an automatic one.
    pub name: Option<String>,
    /// Ordered header labels (possibly empty).
    pub headers: Vec<String>,
    /// Row-major cell values (possibly empty).
    pub rows: Vec<Vec<SpecCellValue>>,
}

impl SpecTableData {
    /// Convenience constructor.
    pub fn new(
        name: Option<String>,
        headers: Vec<String>,
        rows: Vec<Vec<SpecCellValue>>,
    ) -> Self {
        Self { name, headers, rows }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Renderer-wide options controlling the header region, styles, and sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWriteOptions {
    /// Emit the header region.
    pub if_write_header: bool,
    /// Index of the first header row.
    pub n_row_header_first: usize,
    /// Number of header rows (rows past the first are blank-filled).
    pub n_rows_header: usize,
    /// Body cell style.
    pub fmt_cell: SpecCellFormat,
    /// Header cell style.
    pub fmt_header: SpecCellFormat,
    /// NaN cell style.
    pub fmt_nan: SpecCellFormat,
    /// Number format code applied to DateTime cells.
    pub c_num_format_datetime: Option<String>,
    /// Display-width cap used for column sizing.
    pub n_width_cell_max: usize,
    /// Missing/NaN/Inf replacement text policy.
    pub value_policy: SpecValuePolicy,
}

impl Default for SpecWriteOptions {
    fn default() -> Self {
        Self {
            if_write_header: true,
            n_row_header_first: 0,
            n_rows_header: 1,
            fmt_cell: conf::derive_default_cell_format(),
            fmt_header: conf::derive_default_header_format(),
            fmt_nan: conf::derive_default_nan_format(),
            c_num_format_datetime: Some(conf::C_NUM_FORMAT_DATETIME_DEFAULT.to_string()),
            n_width_cell_max: conf::N_WIDTH_CELL_MAX,
            value_policy: SpecValuePolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PipelineState

/// Render pipeline states for one table-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRenderState {
    /// No table-write in progress.
    Idle,
    /// Phase 1: full-table scan, no output.
    Analyzing,
    /// Phase 2: output, no further scanning.
    Emitting,
    /// Terminal state of a completed table-write.
    Finalized,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatCacheKeys

/// Discriminates format families that share a kind-independent style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumFormatVariant {
    /// Plain body cell style.
    Plain,
    /// Body cell style plus a column-derived number format.
    Numeric,
    /// Fixed NaN style, column-independent properties.
    NanText,
    /// Body cell style plus the datetime number format.
    Stamp,
}

impl EnumFormatVariant {
    /// Map a cell kind to its format family.
    pub fn from_kind(kind: EnumValueKind) -> Self {
        match kind {
            EnumValueKind::Integer | EnumValueKind::RealNumber => Self::Numeric,
            EnumValueKind::Nan => Self::NanText,
            EnumValueKind::DateTime => Self::Stamp,
            _ => Self::Plain,
        }
    }
}

/// Composite cache key: at most one format handle exists per key and table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpecFormatKey {
    /// Zero-based output column index.
    pub n_idx_col: usize,
    /// Cell kind.
    pub kind: EnumValueKind,
    /// Format family discriminator.
    pub variant: EnumFormatVariant,
}

/// Formatting intent handed to the backend format factory.
///
/// The backend derives its own number format from the kind and profile, so
/// the two variants can size `#,##0.00`-style and `0.00`-style codes
/// independently.
#[derive(Debug, Clone, Copy)]
pub struct SpecFormatIntent<'a> {
    /// Kind of the cell(s) this format will style.
    pub kind: EnumValueKind,
    /// Base style properties (already variant-selected).
    pub props: &'a SpecCellFormat,
    /// Profile of the owning column; absent for the header format.
    pub profile: Option<&'a SpecColumnProfile>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RangeBounds

/// Written-region bounds handed to the backend at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecRangeBounds {
    /// First header row index.
    pub n_row_header_first: usize,
    /// Last header row index.
    pub n_row_header_last: usize,
    /// First data row index.
    pub n_row_data_first: usize,
    /// Row cursor value after the final data row.
    pub n_row_data_last: usize,
    /// First column index.
    pub n_col_first: usize,
    /// Last column index.
    pub n_col_last: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Terminal failures of one table-write.
#[derive(Debug)]
pub enum RenderError {
    /// Both the header list and the body matrix are empty.
    NoData,
    /// A row's length differs from the expected column count.
    ShapeMismatch {
        /// Zero-based index of the offending row.
        n_idx_row: usize,
        /// Number of values in the offending row.
        n_cols_row: usize,
        /// Expected column count.
        n_cols_expected: usize,
    },
    /// Protocol violation (e.g. observing statistics after finalize).
    State(String),
    /// Backend write/finalize failure during Emitting.
    Write {
        /// Row index of the failed write, when cell-scoped.
        n_idx_row: Option<usize>,
        /// Column index of the failed write, when cell-scoped.
        n_idx_col: Option<usize>,
        /// Backend error text.
        message: String,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "Empty table: both header and body are empty."),
            Self::ShapeMismatch {
                n_idx_row,
                n_cols_row,
                n_cols_expected,
            } => write!(
                f,
                "Row {n_idx_row} has {n_cols_row} values, expected {n_cols_expected}."
            ),
            Self::State(message) => write!(f, "{message}"),
            Self::Write {
                n_idx_row: Some(n_row),
                n_idx_col: Some(n_col),
                message,
            } => write!(f, "Cell write failed at ({n_row}, {n_col}): {message}"),
            Self::Write { message, .. } => write!(f, "Workbook write failed: {message}"),
        }
    }
}

impl std::error::Error for RenderError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Per-table-write report: written range, format churn, warnings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecRenderReport {
    /// Actual worksheet name (after sanitization/uniquing).
    pub c_sheet_name: String,
    /// Number of body rows written.
    pub n_rows_data: usize,
    /// Number of output columns.
    pub n_cols: usize,
    /// First data row index.
    pub n_row_data_first: usize,
    /// Row cursor value after the final data row.
    pub n_row_data_last: usize,
    /// Format handles created through the cache for this table.
    pub cnt_formats_created: usize,
    /// Non-fatal warnings (e.g. sheet renamed to satisfy Excel rules).
    pub warnings: Vec<String>,
}

impl SpecRenderReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_rows_data".to_string(), self.n_rows_data as u64);
        dict_counts.insert("cnt_cols".to_string(), self.n_cols as u64);
        dict_counts.insert(
            "cnt_formats_created".to_string(),
            self.cnt_formats_created as u64,
        );
        dict_counts.insert("cnt_warnings".to_string(), self.warnings.len() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} sheet={:?} rows={} cols={} formats={} warnings={}",
            self.c_sheet_name,
            self.n_rows_data,
            self.n_cols,
            self.cnt_formats_created,
            self.warnings.len()
        )
    }
}

impl fmt::Display for SpecRenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[RENDER]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
