//! `tabwrite_io_excel` v1:
//! two-phase Excel render engine over classified tabular data.
//!
//! Architecture:
//! - `conf`    : constants and default style presets
//! - `spec`    : format/options/report models and the error taxonomy
//! - `util`    : pure helpers (sheet naming, number formats, index casts)
//! - `cache`   : format-object cache, at-most-once creation per key
//! - `backend` : backend contract plus the streaming and legacy variants
//! - `writer`  : the table renderer state machine

pub mod backend;
pub mod cache;
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use backend::{BackendXls, BackendXlsx, ExcelBackend, LegacyWorkbook};
pub use cache::FormatCache;
pub use conf::{
    C_FONT_NAME_DEFAULT, C_NUM_FORMAT_DATETIME_DEFAULT, N_FONT_SIZE_DEFAULT,
    N_LEN_EXCEL_SHEET_NAME_MAX, N_WIDTH_CELL_MAX, TUP_EXCEL_ILLEGAL, derive_default_cell_format,
    derive_default_header_format, derive_default_nan_format,
};
pub use spec::{
    EnumFormatVariant, EnumRenderState, RenderError, SpecCellFormat, SpecFormatIntent,
    SpecFormatKey, SpecRangeBounds, SpecRenderReport, SpecTableData, SpecWriteOptions,
};
pub use util::{derive_legacy_number_format, derive_streaming_number_format, sanitize_sheet_name};
pub use writer::TableRenderer;
