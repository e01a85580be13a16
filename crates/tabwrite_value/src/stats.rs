//! Per-column statistics accumulation.
//!
//! A [`ColumnProfileBuilder`] is fed once per cell during the analyze phase
//! and frozen into a [`SpecColumnProfile`] before any output is emitted.
//! Updates are monotonic: maxima only grow, presence flags only turn on.

use std::collections::BTreeSet;

use crate::classify::estimate_display_width;
use crate::spec::{EnumValueKind, SpecColumnProfile, SpecTypedCell};

/// Mutable accumulator for one output column.
#[derive(Debug, Clone)]
pub struct ColumnProfileBuilder {
    n_idx_col: usize,
    max_decimal_places: Option<u32>,
    n_width_display_max: usize,
    if_has_real_number: bool,
    if_has_integer: bool,
    set_kinds_value: BTreeSet<EnumValueKind>,
    if_frozen: bool,
}

impl ColumnProfileBuilder {
    /// Create an empty accumulator for column `n_idx_col`.
    pub fn new(n_idx_col: usize) -> Self {
        Self {
            n_idx_col,
            max_decimal_places: None,
            n_width_display_max: 0,
            if_has_real_number: false,
            if_has_integer: false,
            set_kinds_value: BTreeSet::new(),
            if_frozen: false,
        }
    }

    /// Fold one classified cell into the column statistics.
    ///
    /// Decimal places accumulate for RealNumber cells only; display width
    /// accumulates unconditionally. Fails after [`Self::finalize`].
    pub fn observe(&mut self, cell: &SpecTypedCell) -> Result<(), String> {
        self.validate_not_frozen()?;

        self.n_width_display_max = usize::max(self.n_width_display_max, cell.n_width_display);

        match cell.kind {
            EnumValueKind::RealNumber => {
                self.if_has_real_number = true;
                if let Some(n_places) = cell.n_decimal_places {
                    self.max_decimal_places =
                        Some(u32::max(self.max_decimal_places.unwrap_or(0), n_places));
                }
            }
            EnumValueKind::Integer => self.if_has_integer = true,
            _ => {}
        }

        // Null/NaN/Infinity carry no type evidence for the column kind.
        if !matches!(
            cell.kind,
            EnumValueKind::Null | EnumValueKind::Nan | EnumValueKind::Infinity
        ) {
            self.set_kinds_value.insert(cell.kind);
        }

        Ok(())
    }

    /// Fold a header label into the width maximum (no kind evidence).
    pub fn observe_text_width(&mut self, text: &str) -> Result<(), String> {
        self.validate_not_frozen()?;
        self.n_width_display_max =
            usize::max(self.n_width_display_max, estimate_display_width(text));
        Ok(())
    }

    /// Freeze the accumulator and return the final profile.
    pub fn finalize(&mut self) -> SpecColumnProfile {
        self.if_frozen = true;
        SpecColumnProfile {
            n_idx_col: self.n_idx_col,
            max_decimal_places: self.max_decimal_places,
            n_width_display_max: self.n_width_display_max,
            if_has_real_number: self.if_has_real_number,
            if_has_integer: self.if_has_integer,
            kind_dominant: derive_dominant_kind(&self.set_kinds_value),
        }
    }

    fn validate_not_frozen(&self) -> Result<(), String> {
        if self.if_frozen {
            return Err(format!(
                "observe() called after finalize() for column {}.",
                self.n_idx_col
            ));
        }
        Ok(())
    }
}

/// Collapse the set of observed kinds into the column-level kind.
///
/// Any text evidence makes the column textual; otherwise RealNumber beats
/// Integer so mixed numeric columns keep their precision formatting.
fn derive_dominant_kind(set_kinds: &BTreeSet<EnumValueKind>) -> EnumValueKind {
    for kind in [
        EnumValueKind::String,
        EnumValueKind::RealNumber,
        EnumValueKind::Integer,
        EnumValueKind::Boolean,
        EnumValueKind::DateTime,
    ] {
        if set_kinds.contains(&kind) {
            return kind;
        }
    }
    EnumValueKind::String
}
