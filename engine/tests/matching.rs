//! End-to-end matching flows across the cascades.
//!
//! These tests run the same two-pass flow the image syncers use: direct
//! matching over every upstream record first, variant inheritance for the
//! leftovers second.

use std::collections::HashMap;

use fleetdock_engine::{
    expand_rsi_paint_name, find_paint_match, inherit_variant_images, match_vehicle_name,
    ImageSet, MatchStats, PaintNameClass, VehicleNameSlug,
};

fn reference_vehicles() -> Vec<VehicleNameSlug> {
    [
        ("600i", "600i"),
        ("Aurora CL", "aurora-cl"),
        ("Aurora ES", "aurora-es"),
        ("Ballista Dunestalker", "ballista-dunestalker"),
        ("Corsair", "corsair"),
        ("Corsair PYAM Exec Edition", "corsair-pyam-exec-edition"),
        ("Mercury Star Runner", "mercury-star-runner"),
    ]
    .into_iter()
    .map(|(name, slug)| VehicleNameSlug {
        name: name.to_string(),
        slug: slug.to_string(),
    })
    .collect()
}

// ============================================================================
// Two-pass vehicle image flow
// ============================================================================

#[test]
fn two_pass_flow_matches_then_inherits() {
    let locals = reference_vehicles();
    let upstream = [
        ("Corsair", "https://img.example/corsair.jpg"),
        ("Mercury", "https://img.example/msr.jpg"),
        ("600i Explorer", "https://img.example/600i.jpg"),
        ("Sabre Raven", "https://img.example/raven.jpg"),
    ];

    let mut stats = MatchStats::default();
    let mut seen: HashMap<String, ImageSet> = HashMap::new();
    let mut updated: Vec<(String, ImageSet)> = Vec::new();

    for (name, url) in upstream {
        let images = ImageSet::uniform(url);
        seen.insert(name.to_lowercase(), images.clone());
        match match_vehicle_name(name, &locals) {
            Some(hit) => {
                updated.push((hit.slug.clone(), images));
                stats.matched += 1;
            }
            None => stats.skipped += 1,
        }
    }

    assert_eq!(stats.matched, 3);
    assert_eq!(stats.skipped, 1);
    assert!(updated.iter().any(|(slug, _)| slug == "mercury-star-runner"));
    assert!(updated.iter().any(|(slug, _)| slug == "600i"));

    let touched: Vec<&str> = updated.iter().map(|(slug, _)| slug.as_str()).collect();
    let unmatched: Vec<VehicleNameSlug> = locals
        .iter()
        .filter(|v| !touched.contains(&v.slug.as_str()))
        .cloned()
        .collect();

    let inherited = inherit_variant_images(&unmatched, &seen);
    stats.inherited = inherited.len();

    // the exec edition picks up the base Corsair images
    assert_eq!(stats.inherited, 1);
    assert_eq!(inherited[0].0.slug, "corsair-pyam-exec-edition");
    assert_eq!(
        inherited[0].1.source.as_deref(),
        Some("https://img.example/corsair.jpg")
    );
    assert_eq!(stats.total(), 4);
}

// ============================================================================
// RSI paint SKU flow
// ============================================================================

#[test]
fn rsi_sku_title_resolves_paint() {
    let paints = vec![
        PaintNameClass {
            name: "Ares Star Fighter Radiant".to_string(),
            class_name: "CRUS_Ares_Paint_Radiant".to_string(),
            has_image: false,
        },
        PaintNameClass {
            name: "Luminex".to_string(),
            class_name: "ORIG_890Jump_Paint_Luminex".to_string(),
            has_image: true,
        },
    ];

    let expanded = expand_rsi_paint_name("Ares - Radiant");
    assert_eq!(expanded, "Ares Star Fighter Radiant");
    assert_eq!(
        find_paint_match(&expanded, &paints).unwrap().class_name,
        "CRUS_Ares_Paint_Radiant"
    );

    // "890 Jump - Luminex" contains the stored "Luminex" name
    let expanded = expand_rsi_paint_name("890 Jump - Luminex");
    assert_eq!(
        find_paint_match(&expanded, &paints).unwrap().class_name,
        "ORIG_890Jump_Paint_Luminex"
    );
}
