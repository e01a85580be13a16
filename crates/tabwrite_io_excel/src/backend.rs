//! Output backends: the shared capability contract, the streaming
//! `rust_xlsxwriter` variant, and the legacy binary variant over an opaque
//! workbook handle.

use std::fmt;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tabwrite_value::{EnumRenderValue, SpecTypedCell};

use crate::spec::{RenderError, SpecCellFormat, SpecFormatIntent, SpecRangeBounds};
use crate::util::{
    cast_col_num, cast_row_num, derive_legacy_number_format, derive_streaming_number_format,
};

////////////////////////////////////////////////////////////////////////////////
// #region BackendContract

/// Capability set the render pipeline drives.
///
/// `add_format` is the format factory: it receives the formatting intent and
/// derives the variant-specific number format itself, so handle creation cost
/// stays behind the renderer's cache.
pub trait ExcelBackend {
    /// Opaque resolved style handle.
    type Format: Clone;

    /// Open a new worksheet; subsequent writes target it.
    fn add_worksheet(&mut self, c_sheet_name: &str) -> Result<(), RenderError>;

    /// Turn a formatting intent into a concrete format handle.
    fn add_format(&mut self, intent: &SpecFormatIntent<'_>) -> Result<Self::Format, RenderError>;

    /// Write one classified cell.
    fn write_cell(
        &mut self,
        n_idx_row: usize,
        n_idx_col: usize,
        cell: &SpecTypedCell,
        fmt: &Self::Format,
    ) -> Result<(), RenderError>;

    /// Write one header row starting at `n_idx_col_first` (empty labels blank).
    fn write_header_row(
        &mut self,
        n_idx_row: usize,
        n_idx_col_first: usize,
        l_values: &[String],
        fmt: &Self::Format,
    ) -> Result<(), RenderError>;

    /// Set one column's display width (no-op where the format lacks sizing).
    fn set_column_width(&mut self, n_idx_col: usize, width: f64) -> Result<(), RenderError>;

    /// Declare the written range (filter region, frozen panes) after the body.
    fn finalize_range(&mut self, bounds: &SpecRangeBounds) -> Result<(), RenderError>;
}

fn derive_cell_write_error(
    n_idx_row: usize,
    n_idx_col: usize,
    err: impl fmt::Display,
) -> RenderError {
    RenderError::Write {
        n_idx_row: Some(n_idx_row),
        n_idx_col: Some(n_idx_col),
        message: err.to_string(),
    }
}

fn derive_workbook_error(err: impl fmt::Display) -> RenderError {
    RenderError::Write {
        n_idx_row: None,
        n_idx_col: None,
        message: err.to_string(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StreamingBackend

/// ModernStreaming variant over a `rust_xlsxwriter` workbook.
pub struct BackendXlsx {
    workbook: Workbook,
    n_idx_sheet_current: Option<usize>,
    cnt_sheets: usize,
}

impl BackendXlsx {
    /// Create a backend owning a fresh workbook.
    pub fn new() -> Self {
        Self::from_workbook(Workbook::new())
    }

    /// Create a backend from a preconfigured (still sheetless) workbook,
    /// e.g. one with pinned document properties.
    pub fn from_workbook(workbook: Workbook) -> Self {
        Self {
            workbook,
            n_idx_sheet_current: None,
            cnt_sheets: 0,
        }
    }

    /// Access the underlying workbook.
    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    /// Release the underlying workbook.
    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }

    /// Save the workbook container to `path`.
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), RenderError> {
        self.workbook.save(path).map_err(derive_workbook_error)
    }

    /// Serialize the workbook container into a byte buffer.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, RenderError> {
        self.workbook.save_to_buffer().map_err(derive_workbook_error)
    }

    fn worksheet_current(&mut self) -> Result<&mut Worksheet, RenderError> {
        let Some(n_idx) = self.n_idx_sheet_current else {
            return Err(RenderError::State(
                "No worksheet is open; call add_worksheet first.".to_string(),
            ));
        };
        self.workbook
            .worksheet_from_index(n_idx)
            .map_err(derive_workbook_error)
    }
}

impl Default for BackendXlsx {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcelBackend for BackendXlsx {
    type Format = Format;

    fn add_worksheet(&mut self, c_sheet_name: &str) -> Result<(), RenderError> {
        let worksheet = self.workbook.add_worksheet();
        if !c_sheet_name.is_empty() {
            worksheet.set_name(c_sheet_name).map_err(derive_workbook_error)?;
        }
        self.n_idx_sheet_current = Some(self.cnt_sheets);
        self.cnt_sheets += 1;
        Ok(())
    }

    fn add_format(&mut self, intent: &SpecFormatIntent<'_>) -> Result<Self::Format, RenderError> {
        let mut format = derive_xlsx_format(intent.props);
        if intent.props.num_format.is_none()
            && let Some(c_code) = derive_streaming_number_format(intent.kind, intent.profile)
        {
            format = format.set_num_format(c_code);
        }
        Ok(format)
    }

    fn write_cell(
        &mut self,
        n_idx_row: usize,
        n_idx_col: usize,
        cell: &SpecTypedCell,
        fmt: &Self::Format,
    ) -> Result<(), RenderError> {
        let map_err = |e: String| derive_cell_write_error(n_idx_row, n_idx_col, e);
        let n_row = cast_row_num(n_idx_row).map_err(map_err)?;
        let n_col = cast_col_num(n_idx_col).map_err(map_err)?;

        let worksheet = self.worksheet_current()?;
        let result = match &cell.rendered {
            EnumRenderValue::None => worksheet.write_blank(n_row, n_col, fmt),
            EnumRenderValue::Bool(v) => worksheet.write_boolean_with_format(n_row, n_col, *v, fmt),
            EnumRenderValue::Integer(v) => {
                worksheet.write_number_with_format(n_row, n_col, *v as f64, fmt)
            }
            EnumRenderValue::Real(v) => worksheet.write_number_with_format(n_row, n_col, *v, fmt),
            EnumRenderValue::Text(v) => worksheet.write_string_with_format(n_row, n_col, v, fmt),
            EnumRenderValue::DateTime(v) => {
                worksheet.write_datetime_with_format(n_row, n_col, v, fmt)
            }
        };
        result.map_err(|e| derive_cell_write_error(n_idx_row, n_idx_col, e))?;
        Ok(())
    }

    fn write_header_row(
        &mut self,
        n_idx_row: usize,
        n_idx_col_first: usize,
        l_values: &[String],
        fmt: &Self::Format,
    ) -> Result<(), RenderError> {
        for (n_offset, c_value) in l_values.iter().enumerate() {
            let n_idx_col = n_idx_col_first + n_offset;
            let map_err = |e: String| derive_cell_write_error(n_idx_row, n_idx_col, e);
            let n_row = cast_row_num(n_idx_row).map_err(map_err)?;
            let n_col = cast_col_num(n_idx_col).map_err(map_err)?;

            let worksheet = self.worksheet_current()?;
            let result = if c_value.is_empty() {
                worksheet.write_blank(n_row, n_col, fmt)
            } else {
                worksheet.write_string_with_format(n_row, n_col, c_value, fmt)
            };
            result.map_err(|e| derive_cell_write_error(n_idx_row, n_idx_col, e))?;
        }
        Ok(())
    }

    fn set_column_width(&mut self, n_idx_col: usize, width: f64) -> Result<(), RenderError> {
        let n_col = cast_col_num(n_idx_col).map_err(derive_workbook_error)?;
        self.worksheet_current()?
            .set_column_width(n_col, width)
            .map_err(derive_workbook_error)?;
        Ok(())
    }

    fn finalize_range(&mut self, bounds: &SpecRangeBounds) -> Result<(), RenderError> {
        let n_row_filter_first = cast_row_num(bounds.n_row_header_last).map_err(derive_workbook_error)?;
        let n_row_filter_last = cast_row_num(bounds.n_row_data_last).map_err(derive_workbook_error)?;
        let n_row_freeze = cast_row_num(bounds.n_row_data_first).map_err(derive_workbook_error)?;
        let n_col_first = cast_col_num(bounds.n_col_first).map_err(derive_workbook_error)?;
        let n_col_last = cast_col_num(bounds.n_col_last).map_err(derive_workbook_error)?;

        let worksheet = self.worksheet_current()?;
        worksheet
            .autofilter(n_row_filter_first, n_col_first, n_row_filter_last, n_col_last)
            .map_err(derive_workbook_error)?;
        worksheet
            .set_freeze_panes(n_row_freeze, n_col_first)
            .map_err(derive_workbook_error)?;
        Ok(())
    }
}

fn derive_xlsx_format(props: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(v) = &props.font_name {
        format = format.set_font_name(v.clone());
    }
    if let Some(v) = props.font_size {
        format = format.set_font_size(v as f64);
    }
    if props.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(v) = &props.align
        && let Some(align) = derive_format_align(v)
    {
        format = format.set_align(align);
    }
    if let Some(v) = &props.valign
        && let Some(align) = derive_format_align(v)
    {
        format = format.set_align(align);
    }
    if props.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    if let Some(v) = props.border {
        format = format.set_border(derive_format_border(v));
    }
    if let Some(v) = props.top {
        format = format.set_border_top(derive_format_border(v));
    }
    if let Some(v) = props.bottom {
        format = format.set_border_bottom(derive_format_border(v));
    }
    if let Some(v) = props.left {
        format = format.set_border_left(derive_format_border(v));
    }
    if let Some(v) = props.right {
        format = format.set_border_right(derive_format_border(v));
    }

    if let Some(v) = &props.num_format {
        format = format.set_num_format(v.clone());
    }
    if let Some(v) = &props.bg_color {
        format = format.set_background_color(v.as_str());
    }
    if let Some(v) = &props.font_color {
        format = format.set_font_color(v.as_str());
    }

    format
}

fn derive_format_border(style: i64) -> FormatBorder {
    match style {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LegacyBackend

/// Opaque legacy workbook handle supplied by the host.
///
/// The binary container encoding lives outside this crate; the handle only
/// exposes worksheet creation, style creation from an optional number-format
/// code (the single style attribute the legacy writer uses), and the
/// fixed single-cell write primitive.
pub trait LegacyWorkbook {
    /// Opaque style handle, valid for the owning worksheet.
    type Style: Clone;

    /// Open a new worksheet; subsequent writes target it.
    fn add_worksheet(&mut self, c_sheet_name: &str) -> Result<(), String>;

    /// Create a style, optionally carrying a number-format code.
    fn derive_style(&mut self, c_num_format: Option<&str>) -> Result<Self::Style, String>;

    /// Write one cell value with a style.
    fn write_cell(
        &mut self,
        n_idx_row: usize,
        n_idx_col: usize,
        value: &EnumRenderValue,
        style: &Self::Style,
    ) -> Result<(), String>;
}

/// LegacyBinary variant adapting the pipeline contract onto a
/// [`LegacyWorkbook`] handle.
pub struct BackendXls<W: LegacyWorkbook> {
    sink: W,
}

impl<W: LegacyWorkbook> BackendXls<W> {
    /// Wrap a legacy workbook handle.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Access the underlying handle.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Release the underlying handle.
    pub fn into_sink(self) -> W {
        self.sink
    }
}

impl<W: LegacyWorkbook> ExcelBackend for BackendXls<W> {
    type Format = W::Style;

    fn add_worksheet(&mut self, c_sheet_name: &str) -> Result<(), RenderError> {
        self.sink
            .add_worksheet(c_sheet_name)
            .map_err(derive_workbook_error)
    }

    fn add_format(&mut self, intent: &SpecFormatIntent<'_>) -> Result<Self::Format, RenderError> {
        let c_num_format = derive_legacy_number_format(intent.kind, intent.profile);
        self.sink
            .derive_style(c_num_format.as_deref())
            .map_err(derive_workbook_error)
    }

    fn write_cell(
        &mut self,
        n_idx_row: usize,
        n_idx_col: usize,
        cell: &SpecTypedCell,
        fmt: &Self::Format,
    ) -> Result<(), RenderError> {
        self.sink
            .write_cell(n_idx_row, n_idx_col, &cell.rendered, fmt)
            .map_err(|e| derive_cell_write_error(n_idx_row, n_idx_col, e))
    }

    fn write_header_row(
        &mut self,
        n_idx_row: usize,
        n_idx_col_first: usize,
        l_values: &[String],
        fmt: &Self::Format,
    ) -> Result<(), RenderError> {
        // No row-batch primitive in the legacy API.
        for (n_offset, c_value) in l_values.iter().enumerate() {
            let n_idx_col = n_idx_col_first + n_offset;
            self.sink
                .write_cell(
                    n_idx_row,
                    n_idx_col,
                    &EnumRenderValue::Text(c_value.clone()),
                    fmt,
                )
                .map_err(|e| derive_cell_write_error(n_idx_row, n_idx_col, e))?;
        }
        Ok(())
    }

    fn set_column_width(&mut self, _n_idx_col: usize, _width: f64) -> Result<(), RenderError> {
        // The legacy format exposes no column sizing in this scope.
        Ok(())
    }

    fn finalize_range(&mut self, _bounds: &SpecRangeBounds) -> Result<(), RenderError> {
        // No autofilter/freeze-pane concept in the legacy format.
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use tabwrite_value::{
        classify_cell_value, EnumValueKind, SpecCellValue, SpecColumnProfile, SpecValuePolicy,
    };

    #[derive(Default)]
    struct RecordingWorkbook {
        l_ops: Vec<String>,
        l_styles: Vec<Option<String>>,
    }

    impl LegacyWorkbook for RecordingWorkbook {
        type Style = usize;

        fn add_worksheet(&mut self, c_sheet_name: &str) -> Result<(), String> {
            self.l_ops.push(format!("sheet:{c_sheet_name}"));
            Ok(())
        }

        fn derive_style(&mut self, c_num_format: Option<&str>) -> Result<usize, String> {
            self.l_styles.push(c_num_format.map(ToString::to_string));
            Ok(self.l_styles.len() - 1)
        }

        fn write_cell(
            &mut self,
            n_idx_row: usize,
            n_idx_col: usize,
            value: &EnumRenderValue,
            style: &usize,
        ) -> Result<(), String> {
            self.l_ops.push(format!(
                "cell:{n_idx_row}:{n_idx_col}:{}:{style}",
                value.to_display_text()
            ));
            Ok(())
        }
    }

    fn derive_real_profile(max_decimal_places: Option<u32>) -> SpecColumnProfile {
        SpecColumnProfile {
            n_idx_col: 1,
            max_decimal_places,
            n_width_display_max: 6,
            if_has_real_number: true,
            if_has_integer: false,
            kind_dominant: EnumValueKind::RealNumber,
        }
    }

    #[test]
    fn test_legacy_add_format_styles_real_columns_only() {
        let mut backend = BackendXls::new(RecordingWorkbook::default());
        let props = SpecCellFormat::default();
        let profile = derive_real_profile(Some(2));

        backend
            .add_format(&SpecFormatIntent {
                kind: EnumValueKind::RealNumber,
                props: &props,
                profile: Some(&profile),
            })
            .unwrap();
        backend
            .add_format(&SpecFormatIntent {
                kind: EnumValueKind::Integer,
                props: &props,
                profile: Some(&profile),
            })
            .unwrap();

        assert_eq!(
            backend.sink_mut().l_styles,
            vec![Some("#,##0.00".to_string()), None]
        );
    }

    #[test]
    fn test_legacy_zero_decimal_count_falls_back_silently() {
        let mut backend = BackendXls::new(RecordingWorkbook::default());
        let props = SpecCellFormat::default();
        let profile = derive_real_profile(Some(0));

        backend
            .add_format(&SpecFormatIntent {
                kind: EnumValueKind::RealNumber,
                props: &props,
                profile: Some(&profile),
            })
            .unwrap();
        assert_eq!(backend.sink_mut().l_styles, vec![None]);
    }

    #[test]
    fn test_legacy_header_row_expands_to_single_cell_writes() {
        let mut backend = BackendXls::new(RecordingWorkbook::default());
        let style = backend
            .add_format(&SpecFormatIntent {
                kind: EnumValueKind::String,
                props: &SpecCellFormat::default(),
                profile: None,
            })
            .unwrap();

        backend
            .write_header_row(0, 0, &["a".to_string(), "b".to_string()], &style)
            .unwrap();
        assert_eq!(
            backend.sink_mut().l_ops,
            vec!["cell:0:0:a:0", "cell:0:1:b:0"]
        );
    }

    #[test]
    fn test_streaming_backend_produces_zip_container() {
        let mut backend = BackendXlsx::new();
        backend.add_worksheet("data").unwrap();

        let fmt = backend
            .add_format(&SpecFormatIntent {
                kind: EnumValueKind::RealNumber,
                props: &SpecCellFormat::default(),
                profile: Some(&derive_real_profile(Some(2))),
            })
            .unwrap();
        let cell = classify_cell_value(&SpecCellValue::Real(1.5), &SpecValuePolicy::default());
        backend.write_cell(1, 0, &cell, &fmt).unwrap();
        backend
            .finalize_range(&SpecRangeBounds {
                n_row_header_first: 0,
                n_row_header_last: 0,
                n_row_data_first: 1,
                n_row_data_last: 2,
                n_col_first: 0,
                n_col_last: 0,
            })
            .unwrap();

        let v_buffer = backend.save_to_buffer().unwrap();
        assert!(v_buffer.starts_with(b"PK"), "not a zip container");
    }

    #[test]
    fn test_streaming_backend_save_to_path() {
        let dir_out = tempfile::tempdir().unwrap();
        let path_file_out = dir_out.path().join("table.xlsx");

        let mut backend = BackendXlsx::new();
        backend.add_worksheet("data").unwrap();
        let fmt = backend
            .add_format(&SpecFormatIntent {
                kind: EnumValueKind::String,
                props: &SpecCellFormat::default(),
                profile: None,
            })
            .unwrap();
        backend
            .write_header_row(0, 0, &["a".to_string()], &fmt)
            .unwrap();
        backend.save_to_path(&path_file_out).unwrap();

        assert!(path_file_out.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_streaming_backend_requires_open_worksheet() {
        let mut backend = BackendXlsx::new();
        let cell = classify_cell_value(&SpecCellValue::Integer(1), &SpecValuePolicy::default());
        let fmt = Format::new();
        assert!(matches!(
            backend.write_cell(0, 0, &cell, &fmt),
            Err(RenderError::State(_))
        ));
    }
}
