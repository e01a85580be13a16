//! Stateless helpers: sheet naming, number-format derivation, index casts.

use std::collections::BTreeSet;

use tabwrite_value::{EnumValueKind, SpecColumnProfile};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNaming

/// Replace invalid chars and trim to a valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Create a suffixed sheet name (`base_2`, `base_3`, ...) within the length cap.
pub fn create_sheet_identifier(base_name: &str, n_idx: usize) -> String {
    let c_suffix = format!("_{n_idx}");
    let n_len_base_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len());

    let c_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_max))
        .collect();
    format!("{c_base}{c_suffix}")
}

/// Register `name` in `set_names_existing`, suffixing on collision.
pub fn derive_unique_sheet_name(set_names_existing: &mut BTreeSet<String>, name: &str) -> String {
    if !set_names_existing.contains(name) {
        set_names_existing.insert(name.to_string());
        return name.to_string();
    }

    let mut n_idx = 2usize;
    loop {
        let c_candidate = create_sheet_identifier(name, n_idx);
        if !set_names_existing.contains(&c_candidate) {
            set_names_existing.insert(c_candidate.clone());
            return c_candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NumberFormats

/// Thousands-separated fixed-point code for the legacy binary backend.
///
/// Only RealNumber cells in a RealNumber-dominant column with a positive
/// decimal count qualify; everything else falls back silently.
pub fn derive_legacy_number_format(
    kind: EnumValueKind,
    profile: Option<&SpecColumnProfile>,
) -> Option<String> {
    if kind != EnumValueKind::RealNumber {
        return None;
    }
    let profile = profile?;
    if profile.kind_dominant != EnumValueKind::RealNumber {
        return None;
    }
    match profile.max_decimal_places {
        Some(n_digits) if n_digits > 0 => Some(format!(
            "#,{}0.{}",
            "#".repeat(n_digits as usize),
            "0".repeat(n_digits as usize)
        )),
        _ => None,
    }
}

/// Fixed-point `0.00…` code for the streaming backend.
///
/// Applies to Integer and RealNumber cells in a numeric-dominant column, so
/// whole numbers render with the column's shared precision.
pub fn derive_streaming_number_format(
    kind: EnumValueKind,
    profile: Option<&SpecColumnProfile>,
) -> Option<String> {
    if !kind.is_number() {
        return None;
    }
    let profile = profile?;
    if !profile.kind_dominant.is_number() {
        return None;
    }
    match profile.max_decimal_places {
        Some(n_digits) if n_digits > 0 => {
            Some(format!("0.{}", "0".repeat(n_digits as usize)))
        }
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasts

/// Cast a logical row index into the container row type.
pub fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

/// Cast a logical column index into the container column type.
pub fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn derive_profile(
        kind_dominant: EnumValueKind,
        max_decimal_places: Option<u32>,
    ) -> SpecColumnProfile {
        SpecColumnProfile {
            n_idx_col: 0,
            max_decimal_places,
            n_width_display_max: 0,
            if_has_real_number: kind_dominant == EnumValueKind::RealNumber,
            if_has_integer: kind_dominant == EnumValueKind::Integer,
            kind_dominant,
        }
    }

    #[test]
    fn test_sanitize_sheet_name_rules() {
        assert_eq!(sanitize_sheet_name("a*b:c?", "_"), "a_b_c_");
        assert_eq!(sanitize_sheet_name("  ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name("", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").chars().count(), 31);
    }

    #[test]
    fn test_derive_unique_sheet_name_suffixes_collisions() {
        let mut set_names = BTreeSet::new();
        assert_eq!(derive_unique_sheet_name(&mut set_names, "data"), "data");
        assert_eq!(derive_unique_sheet_name(&mut set_names, "data"), "data_2");
        assert_eq!(derive_unique_sheet_name(&mut set_names, "data"), "data_3");
    }

    #[test]
    fn test_legacy_number_format_gating() {
        let profile = derive_profile(EnumValueKind::RealNumber, Some(2));
        assert_eq!(
            derive_legacy_number_format(EnumValueKind::RealNumber, Some(&profile)).as_deref(),
            Some("#,##0.00")
        );
        // Integer cells never get the legacy style, even in a real column.
        assert_eq!(
            derive_legacy_number_format(EnumValueKind::Integer, Some(&profile)),
            None
        );
        let profile = derive_profile(EnumValueKind::RealNumber, Some(0));
        assert_eq!(
            derive_legacy_number_format(EnumValueKind::RealNumber, Some(&profile)),
            None
        );
        let profile = derive_profile(EnumValueKind::String, Some(2));
        assert_eq!(
            derive_legacy_number_format(EnumValueKind::RealNumber, Some(&profile)),
            None
        );
        assert_eq!(derive_legacy_number_format(EnumValueKind::RealNumber, None), None);
    }

    #[test]
    fn test_streaming_number_format_covers_integers_in_real_columns() {
        let profile = derive_profile(EnumValueKind::RealNumber, Some(3));
        assert_eq!(
            derive_streaming_number_format(EnumValueKind::Integer, Some(&profile)).as_deref(),
            Some("0.000")
        );
        let profile = derive_profile(EnumValueKind::Integer, None);
        assert_eq!(
            derive_streaming_number_format(EnumValueKind::Integer, Some(&profile)),
            None
        );
        assert_eq!(
            derive_streaming_number_format(EnumValueKind::String, Some(&profile)),
            None
        );
    }

    #[test]
    fn test_index_casts_reject_overflow() {
        assert_eq!(cast_row_num(12), Ok(12));
        assert_eq!(cast_col_num(usize::from(u16::MAX)), Ok(u16::MAX));
        assert!(cast_col_num(usize::from(u16::MAX) + 1).is_err());
    }
}
