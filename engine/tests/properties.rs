//! Property tests for the normalization functions.
//!
//! Slugs and normalized paint names are stored and compared across sync
//! runs, so every derivation must be a fixpoint of itself: re-deriving
//! from stored output has to be a no-op.

use fleetdock_engine::{
    compact_slug, normalize_paint_name, slug_from_name, slug_from_ship_code, strip_years,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ship_code_slug_is_idempotent(code in "[A-Za-z0-9_]{0,40}") {
        let once = slug_from_ship_code(&code);
        let twice = slug_from_ship_code(&once);
        prop_assert_eq!(&twice, &once);
    }

    #[test]
    fn name_slug_is_idempotent(name in any::<String>()) {
        let once = slug_from_name(&name);
        let twice = slug_from_name(&once);
        prop_assert_eq!(&twice, &once);
    }

    #[test]
    fn name_slug_shape(name in any::<String>()) {
        let slug = slug_from_name(&name);
        prop_assert!(!slug.ends_with('-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.contains("--"));
        prop_assert!(slug.chars().all(|c| c == '-' || c.is_alphanumeric()));
    }

    #[test]
    fn compact_slug_is_idempotent(s in any::<String>()) {
        let once = compact_slug(&s);
        let twice = compact_slug(&once);
        prop_assert_eq!(&twice, &once);
    }

    #[test]
    fn paint_normalization_is_idempotent(name in any::<String>()) {
        let once = normalize_paint_name(&name);
        let twice = normalize_paint_name(&once);
        prop_assert_eq!(&twice, &once);
    }

    #[test]
    fn strip_years_is_idempotent(s in "[A-Za-z0-9() ]{0,40}") {
        let once = strip_years(&s);
        let twice = strip_years(&once);
        prop_assert_eq!(&twice, &once);
    }

    #[test]
    fn strip_years_keeps_non_year_digits(n in 0u32..999) {
        let name = format!("Hull {n}");
        prop_assert_eq!(strip_years(&name), name);
    }
}
