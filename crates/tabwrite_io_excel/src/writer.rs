//! Two-phase table renderer.
//!
//! One table-write runs Idle -> Analyzing -> Emitting -> Finalized. Phase 1
//! classifies every cell and freezes the per-column profiles; column sizing
//! happens between the phases (spreadsheet formats want widths before body
//! cells); phase 2 resolves format handles through the cache and issues
//! exactly one backend cell-write per value.

use std::collections::BTreeSet;

use tabwrite_value::{
    ColumnProfileBuilder, EnumValueKind, SpecColumnProfile, SpecTypedCell, classify_cell_value,
};

use crate::backend::ExcelBackend;
use crate::cache::FormatCache;
use crate::spec::{
    EnumFormatVariant, EnumRenderState, RenderError, SpecFormatIntent, SpecFormatKey,
    SpecRangeBounds, SpecRenderReport, SpecTableData, SpecWriteOptions,
};
use crate::util::{derive_unique_sheet_name, sanitize_sheet_name};

/// Renders tables into one backend-owned workbook, one worksheet per table.
pub struct TableRenderer<B: ExcelBackend> {
    backend: B,
    options: SpecWriteOptions,
    enum_state: EnumRenderState,
    cache_formats: FormatCache<B::Format>,
    l_profiles: Vec<SpecColumnProfile>,
    n_row_cursor: usize,
    c_sheet_name_current: Option<String>,
    set_sheet_names_existing: BTreeSet<String>,
    l_warnings_pending: Vec<String>,
    l_reports: Vec<SpecRenderReport>,
}

impl<B: ExcelBackend> TableRenderer<B> {
    /// Create a renderer over `backend` with the given options.
    pub fn new(backend: B, options: SpecWriteOptions) -> Self {
        Self {
            backend,
            options,
            enum_state: EnumRenderState::Idle,
            cache_formats: FormatCache::new(),
            l_profiles: Vec::new(),
            n_row_cursor: 0,
            c_sheet_name_current: None,
            set_sheet_names_existing: BTreeSet::new(),
            l_warnings_pending: Vec::new(),
            l_reports: Vec::new(),
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> EnumRenderState {
        self.enum_state
    }

    /// Access the backend (e.g. to save the finished workbook).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Release the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Immutable snapshot of the per-table reports.
    pub fn report(&self) -> Vec<SpecRenderReport> {
        self.l_reports.clone()
    }

    /// Open a new worksheet and reset all per-table state.
    ///
    /// Calling this while a table-write is pending discards the unfinished
    /// state without error: the next write starts fresh.
    pub fn make_worksheet(&mut self, sheet_name: &str) -> Result<(), RenderError> {
        let c_name_sanitized = sanitize_sheet_name(sheet_name, "_");
        let mut l_warnings = Vec::new();
        if c_name_sanitized != sheet_name && !sheet_name.is_empty() {
            l_warnings.push(format!(
                "Sheet name {sheet_name:?} sanitized to {c_name_sanitized:?}."
            ));
        }
        let c_name_unique =
            derive_unique_sheet_name(&mut self.set_sheet_names_existing, &c_name_sanitized);
        if c_name_unique != c_name_sanitized {
            l_warnings.push(format!(
                "Sheet name {c_name_sanitized:?} already used; renamed to {c_name_unique:?}."
            ));
        }

        self.backend.add_worksheet(&c_name_unique)?;
        self.enum_state = EnumRenderState::Idle;
        self.cache_formats.clear();
        self.l_profiles.clear();
        self.n_row_cursor = self.n_row_data_first();
        self.c_sheet_name_current = Some(c_name_unique);
        self.l_warnings_pending = l_warnings;
        Ok(())
    }

    /// Write one table into a new worksheet of the workbook.
    ///
    /// A backend failure aborts the table-write and may leave a partially
    /// written worksheet behind; recovery is a fresh table-write, not a
    /// resume.
    pub fn write_table(&mut self, table: &SpecTableData) -> Result<SpecRenderReport, RenderError> {
        if table.headers.is_empty() && table.rows.is_empty() {
            // Nothing can bound an output region; fail before any backend call.
            return Err(RenderError::NoData);
        }

        self.make_worksheet(table.name.as_deref().unwrap_or(""))?;
        let l_matrix = self.analyze(table)?;
        self.apply_column_sizing()?;
        self.emit(table, &l_matrix)?;
        self.finalize(table)
    }

    fn n_row_header_last(&self) -> usize {
        self.options.n_row_header_first + usize::max(self.options.n_rows_header, 1) - 1
    }

    fn n_row_data_first(&self) -> usize {
        self.n_row_header_last() + 1
    }

    /// Phase 1: classify the full matrix and freeze the column profiles.
    fn analyze(&mut self, table: &SpecTableData) -> Result<Vec<Vec<SpecTypedCell>>, RenderError> {
        self.enum_state = EnumRenderState::Analyzing;

        let n_cols = if table.headers.is_empty() {
            table.rows.first().map(Vec::len).unwrap_or(0)
        } else {
            table.headers.len()
        };

        let mut l_builders: Vec<ColumnProfileBuilder> =
            (0..n_cols).map(ColumnProfileBuilder::new).collect();

        // Header labels contribute to width so sized columns fit them.
        for (n_idx_col, c_header) in table.headers.iter().enumerate() {
            l_builders[n_idx_col]
                .observe_text_width(c_header)
                .map_err(RenderError::State)?;
        }

        let mut l_matrix = Vec::with_capacity(table.rows.len());
        for (n_idx_row, l_row) in table.rows.iter().enumerate() {
            if l_row.len() != n_cols {
                return Err(RenderError::ShapeMismatch {
                    n_idx_row,
                    n_cols_row: l_row.len(),
                    n_cols_expected: n_cols,
                });
            }

            let mut l_row_cells = Vec::with_capacity(n_cols);
            for (n_idx_col, value) in l_row.iter().enumerate() {
                let cell = classify_cell_value(value, &self.options.value_policy);
                l_builders[n_idx_col]
                    .observe(&cell)
                    .map_err(RenderError::State)?;
                l_row_cells.push(cell);
            }
            l_matrix.push(l_row_cells);
        }

        self.l_profiles = l_builders
            .iter_mut()
            .map(ColumnProfileBuilder::finalize)
            .collect();
        Ok(l_matrix)
    }

    /// Set column widths from the frozen profiles, before any cell write.
    ///
    /// Skipped when the cell style has no font size (the scale factor).
    fn apply_column_sizing(&mut self) -> Result<(), RenderError> {
        let Some(n_font_size) = self.options.fmt_cell.font_size else {
            return Ok(());
        };

        for n_idx in 0..self.l_profiles.len() {
            let profile = &self.l_profiles[n_idx];
            let n_idx_col = profile.n_idx_col;
            let n_width_capped =
                usize::min(profile.n_width_display_max, self.options.n_width_cell_max);
            let width = n_width_capped as f64 * (n_font_size as f64 / 10.0) + 2.0;
            self.backend.set_column_width(n_idx_col, width)?;
        }
        Ok(())
    }

    /// Phase 2: header region, then one cell-write per value.
    fn emit(
        &mut self,
        table: &SpecTableData,
        l_matrix: &[Vec<SpecTypedCell>],
    ) -> Result<(), RenderError> {
        self.enum_state = EnumRenderState::Emitting;

        let n_row_header_first = self.options.n_row_header_first;
        let n_row_header_last = self.n_row_header_last();

        // Variant-selected base property bags, built once per table.
        let fmt_props_cell = self.options.fmt_cell.clone();
        let fmt_props_nan = self.options.fmt_nan.clone();
        let fmt_props_stamp = match &self.options.c_num_format_datetime {
            Some(c_code) => self.options.fmt_cell.with_num_format(c_code),
            None => self.options.fmt_cell.clone(),
        };

        if self.options.if_write_header && !table.headers.is_empty() {
            let fmt_header = self.backend.add_format(&SpecFormatIntent {
                kind: EnumValueKind::String,
                props: &self.options.fmt_header,
                profile: None,
            })?;
            self.backend
                .write_header_row(n_row_header_first, 0, &table.headers, &fmt_header)?;

            let l_blank: Vec<String> = vec![String::new(); table.headers.len()];
            for n_idx_row in (n_row_header_first + 1)..=n_row_header_last {
                self.backend
                    .write_header_row(n_idx_row, 0, &l_blank, &fmt_header)?;
            }
        }

        let TableRenderer {
            backend,
            cache_formats,
            l_profiles,
            n_row_cursor,
            ..
        } = self;

        for l_row_cells in l_matrix {
            for (n_idx_col, cell) in l_row_cells.iter().enumerate() {
                let variant = EnumFormatVariant::from_kind(cell.kind);
                let props = match variant {
                    EnumFormatVariant::NanText => &fmt_props_nan,
                    EnumFormatVariant::Stamp => &fmt_props_stamp,
                    _ => &fmt_props_cell,
                };
                let intent = SpecFormatIntent {
                    kind: cell.kind,
                    props,
                    profile: Some(&l_profiles[n_idx_col]),
                };
                let key = SpecFormatKey {
                    n_idx_col,
                    kind: cell.kind,
                    variant,
                };

                let fmt_handle = cache_formats.resolve(key, || backend.add_format(&intent))?;
                backend.write_cell(*n_row_cursor, n_idx_col, cell, &fmt_handle)?;
            }
            *n_row_cursor += 1;
        }
        Ok(())
    }

    /// Declare the written range, clear the cache, and close the table-write.
    fn finalize(&mut self, table: &SpecTableData) -> Result<SpecRenderReport, RenderError> {
        let n_cols = self.l_profiles.len();
        let bounds = SpecRangeBounds {
            n_row_header_first: self.options.n_row_header_first,
            n_row_header_last: self.n_row_header_last(),
            n_row_data_first: self.n_row_data_first(),
            n_row_data_last: self.n_row_cursor,
            n_col_first: 0,
            n_col_last: n_cols.saturating_sub(1),
        };
        self.backend.finalize_range(&bounds)?;

        let mut report = SpecRenderReport {
            c_sheet_name: self.c_sheet_name_current.clone().unwrap_or_default(),
            n_rows_data: table.rows.len(),
            n_cols,
            n_row_data_first: bounds.n_row_data_first,
            n_row_data_last: bounds.n_row_data_last,
            cnt_formats_created: self.cache_formats.builder_call_count(),
            warnings: Vec::new(),
        };
        for c_warning in self.l_warnings_pending.drain(..) {
            report.warn(c_warning);
        }

        self.cache_formats.clear();
        self.enum_state = EnumRenderState::Finalized;
        self.l_reports.push(report.clone());
        Ok(report)
    }
}
