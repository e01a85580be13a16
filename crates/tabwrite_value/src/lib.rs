//! `tabwrite_value` v1:
//! semantic value classification and per-column statistics.
//!
//! Architecture:
//! - `spec`     : kind enumeration, raw/rendered value models, column profile
//! - `classify` : pure classification and measurement functions
//! - `stats`    : monotonic per-column profile accumulation

pub mod classify;
pub mod spec;
pub mod stats;

pub use classify::{
    classify_cell_value, count_decimal_places, estimate_display_width, parse_datetime_text,
};
pub use spec::{
    EnumRenderValue, EnumValueKind, SpecCellValue, SpecColumnProfile, SpecTypedCell,
    SpecValuePolicy,
};
pub use stats::ColumnProfileBuilder;
