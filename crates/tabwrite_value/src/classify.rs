//! Stateless value classification.
//!
//! `classify_cell_value` never fails: the check ladder runs Null -> NaN ->
//! Infinity -> Boolean -> Integer -> RealNumber -> DateTime -> String and the
//! String arm always matches. Textual input is probed through the same ladder
//! as native values.

use chrono::{NaiveDate, NaiveDateTime};
use unicode_width::UnicodeWidthStr;

use crate::spec::{EnumRenderValue, EnumValueKind, SpecCellValue, SpecTypedCell, SpecValuePolicy};

/// Date/time text layouts accepted by the classifier, probed in order.
const TUP_DATETIME_LAYOUTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];
/// Date-only text layouts accepted by the classifier, probed in order.
const TUP_DATE_LAYOUTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

////////////////////////////////////////////////////////////////////////////////
// #region Classification

/// Classify one raw value into a typed cell. Total and deterministic.
pub fn classify_cell_value(value: &SpecCellValue, policy: &SpecValuePolicy) -> SpecTypedCell {
    match value {
        SpecCellValue::None => derive_null_cell(policy),
        SpecCellValue::Bool(v) => derive_cell(EnumValueKind::Boolean, EnumRenderValue::Bool(*v)),
        SpecCellValue::Integer(v) => {
            derive_cell(EnumValueKind::Integer, EnumRenderValue::Integer(*v))
        }
        SpecCellValue::Real(v) => classify_real_value(*v, policy),
        SpecCellValue::Text(v) => classify_text_value(v, policy),
        SpecCellValue::DateTime(v) => {
            derive_cell(EnumValueKind::DateTime, EnumRenderValue::DateTime(*v))
        }
    }
}

fn classify_real_value(x: f64, policy: &SpecValuePolicy) -> SpecTypedCell {
    if x.is_nan() {
        return derive_cell(
            EnumValueKind::Nan,
            EnumRenderValue::Text(policy.nan_str.clone()),
        );
    }
    if x.is_infinite() {
        let c_text = if x.is_sign_positive() {
            policy.posinf_str.clone()
        } else {
            policy.neginf_str.clone()
        };
        return derive_cell(EnumValueKind::Infinity, EnumRenderValue::Text(c_text));
    }
    if x.fract() == 0.0 && x >= i64::MIN as f64 && x <= i64::MAX as f64 {
        return derive_cell(EnumValueKind::Integer, EnumRenderValue::Integer(x as i64));
    }

    let mut cell = derive_cell(EnumValueKind::RealNumber, EnumRenderValue::Real(x));
    cell.n_decimal_places = Some(count_decimal_places(x));
    cell
}

fn classify_text_value(text: &str, policy: &SpecValuePolicy) -> SpecTypedCell {
    let c_trimmed = text.trim();
    if c_trimmed.is_empty() {
        return derive_null_cell(policy);
    }

    let c_lower = c_trimmed.to_ascii_lowercase();
    if c_lower == "nan" {
        return derive_cell(
            EnumValueKind::Nan,
            EnumRenderValue::Text(policy.nan_str.clone()),
        );
    }
    if matches!(
        c_lower.as_str(),
        "inf" | "+inf" | "-inf" | "infinity" | "+infinity" | "-infinity"
    ) {
        let c_text = if c_lower.starts_with('-') {
            policy.neginf_str.clone()
        } else {
            policy.posinf_str.clone()
        };
        return derive_cell(EnumValueKind::Infinity, EnumRenderValue::Text(c_text));
    }
    if c_lower == "true" {
        return derive_cell(EnumValueKind::Boolean, EnumRenderValue::Bool(true));
    }
    if c_lower == "false" {
        return derive_cell(EnumValueKind::Boolean, EnumRenderValue::Bool(false));
    }
    if let Ok(v) = c_trimmed.parse::<i64>() {
        return derive_cell(EnumValueKind::Integer, EnumRenderValue::Integer(v));
    }
    if let Ok(v) = c_trimmed.parse::<f64>() {
        return classify_real_value(v, policy);
    }
    if let Some(v) = parse_datetime_text(c_trimmed) {
        return derive_cell(EnumValueKind::DateTime, EnumRenderValue::DateTime(v));
    }

    derive_cell(EnumValueKind::String, EnumRenderValue::Text(text.to_string()))
}

fn derive_null_cell(policy: &SpecValuePolicy) -> SpecTypedCell {
    let rendered = if policy.missing_str.is_empty() {
        EnumRenderValue::None
    } else {
        EnumRenderValue::Text(policy.missing_str.clone())
    };
    derive_cell(EnumValueKind::Null, rendered)
}

fn derive_cell(kind: EnumValueKind, rendered: EnumRenderValue) -> SpecTypedCell {
    let n_width_display = estimate_display_width(&rendered.to_display_text());
    SpecTypedCell {
        kind,
        rendered,
        n_decimal_places: None,
        n_width_display,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Measurement

/// Count digits after the decimal point in the canonical decimal string form.
///
/// `f64` Display strips trailing zeros, so `1.50` contributes 1, not 2.
pub fn count_decimal_places(x: f64) -> u32 {
    let c_canonical = x.to_string();
    match c_canonical.split_once('.') {
        Some((_, c_frac)) => c_frac.len() as u32,
        None => 0,
    }
}

/// Character cells needed to display `text` (East Asian wide chars count 2).
pub fn estimate_display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Parse a recognized date/time text layout into a `NaiveDateTime`.
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    if let Ok(v) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(v.naive_utc());
    }
    for c_layout in TUP_DATETIME_LAYOUTS {
        if let Ok(v) = NaiveDateTime::parse_from_str(text, c_layout) {
            return Some(v);
        }
    }
    for c_layout in TUP_DATE_LAYOUTS {
        if let Ok(v) = NaiveDate::parse_from_str(text, c_layout) {
            return v.and_hms_opt(0, 0, 0);
        }
    }
    None
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(value: SpecCellValue) -> SpecTypedCell {
        classify_cell_value(&value, &SpecValuePolicy::default())
    }

    #[test]
    fn test_classify_missing_and_blank_text_as_null() {
        for value in [
            SpecCellValue::None,
            SpecCellValue::Text(String::new()),
            SpecCellValue::Text("   ".to_string()),
        ] {
            let cell = classify(value);
            assert_eq!(cell.kind, EnumValueKind::Null);
            assert_eq!(cell.rendered, EnumRenderValue::None);
            assert_eq!(cell.n_width_display, 0);
        }
    }

    #[test]
    fn test_classify_null_with_missing_text_policy() {
        let policy = SpecValuePolicy {
            missing_str: "NA".to_string(),
            ..Default::default()
        };
        let cell = classify_cell_value(&SpecCellValue::None, &policy);
        assert_eq!(cell.kind, EnumValueKind::Null);
        assert_eq!(cell.rendered, EnumRenderValue::Text("NA".to_string()));
    }

    #[test]
    fn test_classify_nan_and_infinity() {
        let cell = classify(SpecCellValue::Real(f64::NAN));
        assert_eq!(cell.kind, EnumValueKind::Nan);
        assert_eq!(cell.rendered, EnumRenderValue::Text("NaN".to_string()));

        let cell = classify(SpecCellValue::Real(f64::INFINITY));
        assert_eq!(cell.kind, EnumValueKind::Infinity);
        assert_eq!(cell.rendered, EnumRenderValue::Text("Inf".to_string()));

        let cell = classify(SpecCellValue::Real(f64::NEG_INFINITY));
        assert_eq!(cell.rendered, EnumRenderValue::Text("-Inf".to_string()));
    }

    #[test]
    fn test_classify_textual_nan_and_infinity() {
        assert_eq!(
            classify(SpecCellValue::Text("NaN".to_string())).kind,
            EnumValueKind::Nan
        );
        assert_eq!(
            classify(SpecCellValue::Text("Infinity".to_string())).kind,
            EnumValueKind::Infinity
        );
        assert_eq!(
            classify(SpecCellValue::Text("-inf".to_string())).rendered,
            EnumRenderValue::Text("-Inf".to_string())
        );
    }

    #[test]
    fn test_classify_boolean_native_and_textual() {
        assert_eq!(
            classify(SpecCellValue::Bool(true)).kind,
            EnumValueKind::Boolean
        );
        assert_eq!(
            classify(SpecCellValue::Text("FALSE".to_string())).rendered,
            EnumRenderValue::Bool(false)
        );
    }

    #[test]
    fn test_classify_integer_from_whole_float_and_text() {
        let cell = classify(SpecCellValue::Real(2.0));
        assert_eq!(cell.kind, EnumValueKind::Integer);
        assert_eq!(cell.rendered, EnumRenderValue::Integer(2));

        let cell = classify(SpecCellValue::Text("42".to_string()));
        assert_eq!(cell.rendered, EnumRenderValue::Integer(42));

        let cell = classify(SpecCellValue::Text("2.0".to_string()));
        assert_eq!(cell.kind, EnumValueKind::Integer);

        let cell = classify(SpecCellValue::Text("1e3".to_string()));
        assert_eq!(cell.rendered, EnumRenderValue::Integer(1000));
    }

    #[test]
    fn test_classify_real_number_with_decimal_places() {
        let cell = classify(SpecCellValue::Real(2.25));
        assert_eq!(cell.kind, EnumValueKind::RealNumber);
        assert_eq!(cell.n_decimal_places, Some(2));
        assert_eq!(cell.n_width_display, 4);

        let cell = classify(SpecCellValue::Text("1.50".to_string()));
        assert_eq!(cell.kind, EnumValueKind::RealNumber);
        assert_eq!(cell.rendered, EnumRenderValue::Real(1.5));
        assert_eq!(cell.n_decimal_places, Some(1));
    }

    #[test]
    fn test_classify_huge_float_as_real_number() {
        let cell = classify(SpecCellValue::Real(1.0e19));
        assert_eq!(cell.kind, EnumValueKind::RealNumber);
    }

    #[test]
    fn test_classify_datetime_text_layouts() {
        for c_text in [
            "2026-08-07",
            "2026/08/07",
            "2026-08-07 12:30:00",
            "2026-08-07T12:30:00",
        ] {
            let cell = classify(SpecCellValue::Text(c_text.to_string()));
            assert_eq!(cell.kind, EnumValueKind::DateTime, "layout: {c_text}");
        }
    }

    #[test]
    fn test_classify_string_fallback() {
        let cell = classify(SpecCellValue::Text("hello".to_string()));
        assert_eq!(cell.kind, EnumValueKind::String);
        assert_eq!(cell.rendered, EnumRenderValue::Text("hello".to_string()));
    }

    #[test]
    fn test_classify_is_deterministic() {
        let value = SpecCellValue::Text("3.125".to_string());
        let policy = SpecValuePolicy::default();
        assert_eq!(
            classify_cell_value(&value, &policy),
            classify_cell_value(&value, &policy)
        );
    }

    #[test]
    fn test_count_decimal_places_strips_trailing_zeros() {
        assert_eq!(count_decimal_places(1.5), 1);
        assert_eq!(count_decimal_places(2.25), 2);
        assert_eq!(count_decimal_places(0.125), 3);
        assert_eq!(count_decimal_places(3.0), 0);
        assert_eq!(count_decimal_places(0.0001), 4);
    }

    #[test]
    fn test_estimate_display_width_counts_wide_chars_twice() {
        assert_eq!(estimate_display_width("abc"), 3);
        assert_eq!(estimate_display_width("データ"), 6);
        assert_eq!(estimate_display_width(""), 0);
    }

    #[test]
    fn test_display_width_of_rendered_values() {
        assert_eq!(classify(SpecCellValue::Bool(true)).n_width_display, 4);
        assert_eq!(classify(SpecCellValue::Integer(-120)).n_width_display, 4);
        assert_eq!(
            classify(SpecCellValue::Text("2026-08-07".to_string())).n_width_display,
            19
        );
    }
}
