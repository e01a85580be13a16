//! Constants and default style presets.

use crate::spec::SpecCellFormat;

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Display-width cap applied before column sizing.
pub const N_WIDTH_CELL_MAX: usize = 60;
/// Default font for all presets.
pub const C_FONT_NAME_DEFAULT: &str = "MS Gothic";
/// Default font size for all presets.
pub const N_FONT_SIZE_DEFAULT: i64 = 9;
/// Default number format code for DateTime cells.
pub const C_NUM_FORMAT_DATETIME_DEFAULT: &str = "yyyy-mm-dd hh:mm:ss";

/// Default body cell style: bordered, wrapped, top-aligned.
pub fn derive_default_cell_format() -> SpecCellFormat {
    SpecCellFormat {
        font_name: Some(C_FONT_NAME_DEFAULT.to_string()),
        font_size: Some(N_FONT_SIZE_DEFAULT),
        align: Some("top".to_string()),
        text_wrap: Some(true),
        top: Some(1),
        left: Some(1),
        bottom: Some(1),
        right: Some(1),
        ..Default::default()
    }
}

/// Default header style: bold on a light background, side borders only.
pub fn derive_default_header_format() -> SpecCellFormat {
    SpecCellFormat {
        font_name: Some(C_FONT_NAME_DEFAULT.to_string()),
        font_size: Some(N_FONT_SIZE_DEFAULT),
        bg_color: Some("#DFDFFF".to_string()),
        bold: Some(true),
        left: Some(1),
        right: Some(1),
        ..Default::default()
    }
}

/// Default NaN style: muted font color, full border.
pub fn derive_default_nan_format() -> SpecCellFormat {
    SpecCellFormat {
        font_name: Some(C_FONT_NAME_DEFAULT.to_string()),
        font_size: Some(N_FONT_SIZE_DEFAULT),
        font_color: Some("silver".to_string()),
        top: Some(1),
        left: Some(1),
        bottom: Some(1),
        right: Some(1),
        ..Default::default()
    }
}
