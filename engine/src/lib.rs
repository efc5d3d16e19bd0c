//! # Fleetdock Engine
//!
//! Deterministic name matching for Star Citizen reference data.
//!
//! This crate holds every piece of name-coercion logic in Fleetdock:
//! slug derivation, paint-name normalization, the curated alias tables,
//! and the matching cascades that tie noisy upstream records (vehicles,
//! paints) back to canonical rows. The server crate performs IO and
//! persistence; everything here is pure.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of HTTP, databases, or clocks
//! - **Total**: every function returns a value for every input, no panics
//! - **Deterministic**: same inputs always produce the same outputs
//! - **Single source of truth**: no other crate may coerce names or slugs
//!
//! ## Core Concepts
//!
//! ### Slugs
//!
//! A slug is the stable, URL-safe vehicle identifier
//! (`"mercury-star-runner"`). [`slug::slug_from_ship_code`] derives one
//! from an in-engine ship code, [`slug::slug_from_name`] from a display
//! name, and [`slug::compact_slug`] produces the punctuation-free form
//! used for last-resort comparisons.
//!
//! ### Paint names
//!
//! Upstream paint names disagree on suffixes ("... Paint", "... Livery"),
//! diacritics, and the occasional misspelling. [`paint::normalize_paint_name`]
//! folds all of that away so two sources can be compared directly.
//!
//! ### Matching cascades
//!
//! [`matcher::match_vehicle_name`] and [`matcher::find_paint_match`] run
//! ordered fallback chains (direct, alias table, prefix-stripped,
//! year-stripped) and stop on the first hit. [`matcher::inherit_variant_images`]
//! is the second pass that lets an unmatched variant ("Corsair PYAM Exec
//! Edition") reuse the images of its base hull ("Corsair").

pub mod alias;
pub mod insurance;
pub mod matcher;
pub mod paint;
pub mod slug;

// Re-export main types at crate root
pub use insurance::{resolve_insurance, InsuranceTypeRef};
pub use matcher::{
    find_paint_match, inherit_variant_images, match_vehicle_name, ImageSet, MatchStats,
    PaintNameClass, VehicleNameSlug,
};
pub use paint::{expand_rsi_paint_name, normalize_paint_name, slug_from_paint_tag, strip_years};
pub use slug::{compact_slug, slug_from_name, slug_from_ship_code};

/// Type aliases for clarity
pub type Slug = String;
pub type ClassName = String;
