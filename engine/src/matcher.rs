//! Matching cascades for vehicles and paints.
//!
//! Image-only sources (FleetYards, the RSI store) identify vehicles by
//! display name and paints by free-form title. The cascades here resolve
//! those names against the canonical reference rows, trying the cheap
//! exact comparison first and progressively weaker rules after it, and
//! stop on the first hit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{alias, paint};

/// One set of image URLs, smallest to largest plus the original.
///
/// Empty strings never overwrite stored URLs, so `None` and `Some("")`
/// are equivalent on the write path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    pub source: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
}

impl ImageSet {
    /// Fill all four slots with the same URL.
    pub fn uniform(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            source: Some(url.clone()),
            small: Some(url.clone()),
            medium: Some(url.clone()),
            large: Some(url),
        }
    }

    /// True when no slot carries a non-empty URL.
    pub fn is_empty(&self) -> bool {
        [&self.source, &self.small, &self.medium, &self.large]
            .into_iter()
            .all(|u| u.as_deref().unwrap_or_default().is_empty())
    }
}

/// A vehicle reference row as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleNameSlug {
    pub name: String,
    pub slug: String,
}

/// A paint reference row as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintNameClass {
    pub name: String,
    pub class_name: String,
    pub has_image: bool,
}

/// Counters emitted alongside each image-sync record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub matched: usize,
    pub inherited: usize,
    pub skipped: usize,
}

impl MatchStats {
    /// Total rows that received images.
    pub fn total(&self) -> usize {
        self.matched + self.inherited
    }
}

/// Resolve an upstream vehicle display name to a canonical slug.
///
/// Cascade, stopping on the first hit:
/// 1. direct: lowercased display name equals a vehicle name
/// 2. alias table: curated RSI-name -> canonical-name mapping, then direct
/// 3. manufacturer prefix: drop the first whitespace token, then direct
pub fn match_vehicle_name<'a>(
    display_name: &str,
    vehicles: &'a [VehicleNameSlug],
) -> Option<&'a VehicleNameSlug> {
    let wanted = display_name.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    let direct = |name: &str| vehicles.iter().find(|v| v.name.to_lowercase() == name);

    if let Some(hit) = direct(&wanted) {
        return Some(hit);
    }
    if let Some(mapped) = alias::canonical_ship_name(&wanted) {
        if let Some(hit) = direct(mapped) {
            return Some(hit);
        }
    }
    if let Some((_, rest)) = wanted.split_once(char::is_whitespace) {
        let rest = rest.trim();
        if !rest.is_empty() {
            if let Some(hit) = direct(rest) {
                return Some(hit);
            }
        }
    }
    None
}

/// Second-pass variant inheritance.
///
/// For each local vehicle that received no images in the first pass,
/// shorten its name one trailing word at a time and look the prefix up
/// among the upstream names already seen; the first hit donates its
/// images. `"Corsair PYAM Exec Edition"` inherits from `"Corsair"`.
///
/// `seen` is keyed by lowercased upstream display name.
pub fn inherit_variant_images<'a>(
    unmatched: &'a [VehicleNameSlug],
    seen: &HashMap<String, ImageSet>,
) -> Vec<(&'a VehicleNameSlug, ImageSet)> {
    let mut inherited = Vec::new();
    for vehicle in unmatched {
        let words: Vec<&str> = vehicle.name.split_whitespace().collect();
        if words.len() < 2 {
            continue;
        }
        for end in (1..words.len()).rev() {
            let prefix = words[..end].join(" ").to_lowercase();
            if let Some(images) = seen.get(&prefix) {
                inherited.push((vehicle, images.clone()));
                break;
            }
        }
    }
    inherited
}

/// Resolve an upstream paint name to a canonical paint row.
///
/// Both sides are normalized first. Cascade, stopping on the first hit:
/// 1. exact normalized equality
/// 2. containment either way (this also covers the DB-name-starts-with-
///    upstream-name rule: `"eclipse ambush camo"` matches `"eclipse ambush"`)
/// 3. year-stripped equality (`"Lovestruck 2951"` matches `"Lovestruck"`)
pub fn find_paint_match<'a>(
    upstream_name: &str,
    paints: &'a [PaintNameClass],
) -> Option<&'a PaintNameClass> {
    let wanted = paint::normalize_paint_name(upstream_name);
    if wanted.is_empty() {
        return None;
    }

    if let Some(hit) = paints
        .iter()
        .find(|p| paint::normalize_paint_name(&p.name) == wanted)
    {
        return Some(hit);
    }

    if let Some(hit) = paints.iter().find(|p| {
        let db = paint::normalize_paint_name(&p.name);
        !db.is_empty() && (db.contains(&wanted) || wanted.contains(&db))
    }) {
        return Some(hit);
    }

    let wanted_stripped = paint::strip_years(&wanted);
    if wanted_stripped.is_empty() {
        return None;
    }
    paints.iter().find(|p| {
        paint::strip_years(&paint::normalize_paint_name(&p.name)) == wanted_stripped
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicles() -> Vec<VehicleNameSlug> {
        [
            ("600i", "600i"),
            ("Ballista Dunestalker", "ballista-dunestalker"),
            ("Corsair", "corsair"),
            ("Mercury Star Runner", "mercury-star-runner"),
            ("Nomad", "nomad"),
        ]
        .into_iter()
        .map(|(name, slug)| VehicleNameSlug {
            name: name.to_string(),
            slug: slug.to_string(),
        })
        .collect()
    }

    #[test]
    fn direct_name_match() {
        let refs = vehicles();
        assert_eq!(match_vehicle_name("Nomad", &refs).unwrap().slug, "nomad");
        assert_eq!(match_vehicle_name("CORSAIR", &refs).unwrap().slug, "corsair");
    }

    #[test]
    fn alias_match() {
        let refs = vehicles();
        assert_eq!(
            match_vehicle_name("Mercury", &refs).unwrap().slug,
            "mercury-star-runner"
        );
        assert_eq!(
            match_vehicle_name("600i Explorer", &refs).unwrap().slug,
            "600i"
        );
    }

    #[test]
    fn manufacturer_prefix_match() {
        let refs = vehicles();
        assert_eq!(
            match_vehicle_name("Anvil Ballista Dunestalker", &refs).unwrap().slug,
            "ballista-dunestalker"
        );
        assert_eq!(match_vehicle_name("Drake Corsair", &refs).unwrap().slug, "corsair");
    }

    #[test]
    fn no_match_falls_through() {
        let refs = vehicles();
        assert!(match_vehicle_name("Sabre Raven", &refs).is_none());
        assert!(match_vehicle_name("  ", &refs).is_none());
    }

    #[test]
    fn variant_inherits_base_images() {
        let unmatched = vec![VehicleNameSlug {
            name: "Corsair PYAM Exec Edition".to_string(),
            slug: "corsair-pyam-exec-edition".to_string(),
        }];
        let mut seen = HashMap::new();
        seen.insert(
            "corsair".to_string(),
            ImageSet::uniform("https://img.example/corsair.jpg"),
        );

        let inherited = inherit_variant_images(&unmatched, &seen);
        assert_eq!(inherited.len(), 1);
        assert_eq!(inherited[0].0.slug, "corsair-pyam-exec-edition");
        assert_eq!(
            inherited[0].1.source.as_deref(),
            Some("https://img.example/corsair.jpg")
        );
    }

    #[test]
    fn single_word_names_never_inherit() {
        let unmatched = vec![VehicleNameSlug {
            name: "Corsair".to_string(),
            slug: "corsair".to_string(),
        }];
        let seen = HashMap::new();
        assert!(inherit_variant_images(&unmatched, &seen).is_empty());
    }

    fn paints() -> Vec<PaintNameClass> {
        [
            ("Eclipse Ambush Camo", "AEGS_Eclipse_Paint_Ambush"),
            ("Ghoulish Green", "DRAK_Cutter_Paint_Ghoulish"),
            ("Lovestruck 2951", "MISC_Prospector_Paint_Lovestruck"),
        ]
        .into_iter()
        .map(|(name, class_name)| PaintNameClass {
            name: name.to_string(),
            class_name: class_name.to_string(),
            has_image: false,
        })
        .collect()
    }

    #[test]
    fn paint_exact_match() {
        let refs = paints();
        assert_eq!(
            find_paint_match("Ghoulish Green Paint", &refs).unwrap().class_name,
            "DRAK_Cutter_Paint_Ghoulish"
        );
    }

    #[test]
    fn paint_containment_match() {
        let refs = paints();
        assert_eq!(
            find_paint_match("Eclipse Ambush", &refs).unwrap().class_name,
            "AEGS_Eclipse_Paint_Ambush"
        );
    }

    #[test]
    fn paint_year_stripped_match() {
        let refs = paints();
        // different years on both sides, so neither side contains the other
        assert_eq!(
            find_paint_match("Lovestruck 2952", &refs).unwrap().class_name,
            "MISC_Prospector_Paint_Lovestruck"
        );
    }

    #[test]
    fn paint_no_match() {
        let refs = paints();
        assert!(find_paint_match("Invictus Blue", &refs).is_none());
        assert!(find_paint_match("", &refs).is_none());
    }

    #[test]
    fn image_set_serialization_roundtrip() {
        let images = ImageSet {
            source: Some("https://img.example/source.jpg".to_string()),
            small: None,
            medium: Some(String::new()),
            large: Some("https://img.example/large.jpg".to_string()),
        };

        let json = serde_json::to_string(&images).unwrap();
        let parsed: ImageSet = serde_json::from_str(&json).unwrap();

        assert_eq!(images, parsed);
        assert!(!images.is_empty());
        assert!(ImageSet::default().is_empty());
    }
}
