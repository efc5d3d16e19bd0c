//! Curated alias tables for upstream naming drift.
//!
//! Upstream sources disagree with the canonical reference names in a small
//! number of well-known ways: the RSI store prefixes manufacturer names,
//! abbreviates long ship names, and Scunpacked paint tags use compressed
//! hull codes. These tables capture the known divergences; unknown names
//! fall through the cascades in [`crate::matcher`] untouched.
//!
//! A few entries map a name to itself. Those are placeholders kept by key
//! for upstream names that have diverged in the past and may again.

/// RSI display name -> canonical vehicle name (both lowercase).
const SHIP_NAME_MAP: &[(&str, &str)] = &[
    ("600i explorer", "600i"),
    ("600i touring", "600i"),
    ("anvil ballista dunestalker", "ballista dunestalker"),
    ("anvil ballista snowblind", "ballista snowblind"),
    ("argo mole carbon edition", "mole carbon edition"),
    ("argo mole talus edition", "mole talus edition"),
    ("carrack", "carrack"),
    ("cutlass black", "cutlass black"),
    ("hornet f7c", "f7c hornet"),
    ("hornet f7c-m heartseeker", "f7c-m super hornet heartseeker"),
    ("mercury", "mercury star runner"),
    ("mustang omega : amd edition", "mustang omega"),
    ("nova tank", "nova"),
    ("p-72 archimedes", "p72 archimedes"),
    ("ursa rover", "ursa"),
    ("valkyrie liberator edition", "valkyrie"),
];

/// Paint `RequiredTags` slug -> canonical vehicle slug.
const PAINT_TAG_ALIASES: &[(&str, &str)] = &[
    ("890j", "890-jump"),
    ("cutlass", "cutlass-black"),
    ("f7a-mk1", "f7a-hornet-mk-i"),
    ("hornet", "f7c-hornet"),
    ("star-runner", "mercury-star-runner"),
];

/// Abbreviated ship name used in RSI paint SKUs -> full vehicle name.
const PAINT_SHIP_ALIASES: &[(&str, &str)] = &[
    ("Ares", "Ares Star Fighter"),
    ("Hornet", "F7C Hornet"),
    ("Mercury", "Mercury Star Runner"),
    ("Spirit", "C1 Spirit"),
];

/// Look up the canonical vehicle name for an RSI display name.
///
/// The key must already be lowercased; the table is keyed that way.
pub fn canonical_ship_name(rsi_name: &str) -> Option<&'static str> {
    SHIP_NAME_MAP
        .iter()
        .find(|(from, _)| *from == rsi_name)
        .map(|(_, to)| *to)
}

/// Look up the canonical vehicle slug for a paint-tag slug.
pub fn paint_tag_alias(tag_slug: &str) -> Option<&'static str> {
    PAINT_TAG_ALIASES
        .iter()
        .find(|(from, _)| *from == tag_slug)
        .map(|(_, to)| *to)
}

/// Expand an abbreviated ship name from an RSI paint SKU title.
pub fn paint_ship_alias(ship: &str) -> Option<&'static str> {
    PAINT_SHIP_ALIASES
        .iter()
        .find(|(from, _)| *from == ship)
        .map(|(_, to)| *to)
}
