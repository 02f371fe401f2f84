//! # Register Name Normalizer
//!
//! The extractor reports registers with decorations that depend on how the
//! data was pulled, e.g. `PGSRT|X8_SDP_TRIM_VPP_REG`. Rules and annotations are
//! written against the bare register (`TRIM_VPP`), so every raw identifier is
//! canonicalized here before anything else looks at it.
//!
//! Stripping order is fixed:
//!
//! 1. a step-prefix token ending in `|`
//! 2. a leading configuration segment (`X4_`, `X8_`, `X16_`)
//! 3. a leading package segment (`SDP_`, `DDP_`)
//! 4. a trailing `_REG` segment
//!
//! Each step is a no-op when its marker is absent. The pass is repeated until
//! the key stops changing, which makes `normalize` idempotent.

use core_types::Step;

const CONFIGURATION_SEGMENTS: [&str; 3] = ["X4", "X8", "X16"];
const PACKAGE_SEGMENTS: [&str; 2] = ["SDP", "DDP"];
const REGISTER_SUFFIX: &str = "_REG";

/// Canonicalizes a raw register identifier into a register key.
pub fn normalize(raw: &str) -> String {
    let mut key = raw.trim();
    loop {
        let next = normalize_once(key);
        if next == key {
            break;
        }
        key = next;
    }

    if key != raw {
        tracing::trace!(raw, key, "Normalized register name");
    }
    key.to_string()
}

/// True when `key` is already a fixed point of [`normalize`].
pub fn is_normalized(key: &str) -> bool {
    normalize(key) == key
}

fn normalize_once(key: &str) -> &str {
    let key = strip_step_prefix(key);
    let key = strip_leading_segment(key, &CONFIGURATION_SEGMENTS);
    let key = strip_leading_segment(key, &PACKAGE_SEGMENTS);
    let key = strip_register_suffix(key);
    key.trim()
}

fn strip_step_prefix(key: &str) -> &str {
    match key.split_once('|') {
        Some((token, rest)) if Step::ALL.iter().any(|step| token.contains(step.as_str())) => rest,
        _ => key,
    }
}

fn strip_leading_segment<'a>(key: &'a str, segments: &[&str]) -> &'a str {
    match key.split_once('_') {
        Some((head, rest)) if segments.contains(&head) => rest,
        _ => key,
    }
}

fn strip_register_suffix(key: &str) -> &str {
    key.strip_suffix(REGISTER_SUFFIX).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_all_decorations_in_order() {
        assert_eq!(normalize("PGSRT|X8_SDP_TRIM_VPP_REG"), "TRIM_VPP");
        assert_eq!(normalize("HSRT_X16|DDP_ROW_FAIL_REG"), "ROW_FAIL");
    }

    #[test]
    fn absent_markers_are_no_ops() {
        assert_eq!(normalize("ROW_FAIL"), "ROW_FAIL");
        assert_eq!(normalize("SDP_ROW_FAIL"), "ROW_FAIL");
        assert_eq!(normalize("X4_ROW_FAIL_REG"), "ROW_FAIL");
    }

    #[test]
    fn yield_row_passes_through() {
        assert_eq!(normalize("YIELD"), "YIELD");
        assert_eq!(normalize("  YIELD "), "YIELD");
    }

    #[test]
    fn pipe_without_step_token_is_kept() {
        assert_eq!(normalize("LOT|ROW_FAIL"), "LOT|ROW_FAIL");
    }

    #[test]
    fn markers_only_strip_whole_segments() {
        // `X8` inside a register name is not a configuration segment.
        assert_eq!(normalize("CAL_X8_TRIM"), "CAL_X8_TRIM");
        assert_eq!(normalize("SDPX_TRIM"), "SDPX_TRIM");
        assert_eq!(normalize("TRIM_REGX"), "TRIM_REGX");
    }

    #[test]
    fn nested_decorations_reach_a_fixed_point() {
        let key = normalize("CFIN|X8_SDP_X16_DDP_TRIM_REG_REG");
        assert_eq!(key, "TRIM");
        assert!(is_normalized(&key));
    }

    fn identifier() -> impl Strategy<Value = String> {
        let token = prop_oneof![
            Just("PGSRT|".to_string()),
            Just("BURN|".to_string()),
            Just("X4_".to_string()),
            Just("X8_".to_string()),
            Just("X16_".to_string()),
            Just("SDP_".to_string()),
            Just("DDP_".to_string()),
            Just("_REG".to_string()),
            Just("|".to_string()),
            Just(" ".to_string()),
            "[A-Z0-9_]{0,6}",
        ];
        prop::collection::vec(token, 0..8).prop_map(|parts| parts.concat())
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in identifier()) {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_normalize_never_grows(raw in identifier()) {
            prop_assert!(normalize(&raw).len() <= raw.len());
        }
    }
}
