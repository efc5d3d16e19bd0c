//! Paint-name normalization.
//!
//! Paint names arrive from three sources that never quite agree:
//! Scunpacked carries the in-engine item name, FleetYards appends
//! "Paint" or "Livery", and the RSI store prefixes the ship and uses
//! typographic apostrophes and macrons ("Kamposī"). Everything funnels
//! through [`normalize_paint_name`] before comparison.

use crate::alias;

/// Known upstream misspellings, applied after normalization.
///
/// Replacements must not contain their own pattern or normalization
/// would stop being idempotent.
const MISSPELLINGS: &[(&str, &str)] = &[
    ("bushwacker", "bushwhacker"),
    ("auspicous", "auspicious"),
    ("stoneskipper", "stone skipper"),
];

/// Normalize a paint display name for comparison.
///
/// Lowercases and trims, strips trailing `" paint"` / `" livery"` /
/// `" skin"` (repeatedly, so stacked suffixes cannot survive a pass),
/// transliterates macron vowels, maps typographic apostrophes to `'`,
/// and applies the misspelling table. Idempotent.
pub fn normalize_paint_name(name: &str) -> String {
    let mut s: String = name
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'ā' => Some('a'),
            'ē' => Some('e'),
            'ī' => Some('i'),
            'ō' => Some('o'),
            'ū' => Some('u'),
            // combining macron left over from decomposed input
            '\u{0304}' => None,
            '\u{2018}' | '\u{2019}' | '\u{02bc}' => Some('\''),
            c => Some(c),
        })
        .collect();
    s = s.trim().to_string();

    loop {
        let before = s.len();
        for suffix in [" paint", " livery", " skin"] {
            if let Some(stripped) = s.strip_suffix(suffix) {
                s = stripped.trim_end().to_string();
            }
        }
        if s.len() == before {
            break;
        }
    }

    for (wrong, right) in MISSPELLINGS {
        if s.contains(wrong) {
            s = s.replace(wrong, right);
        }
    }
    s.trim().to_string()
}

/// Remove four-digit year tokens and collapse internal whitespace.
///
/// `"Lovestruck 2951"` and `"Lovestruck"` compare equal after this.
pub fn strip_years(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut keep = vec![true; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let bounded = (start == 0 || !chars[start - 1].is_alphanumeric())
                && (i == chars.len() || !chars[i].is_alphanumeric());
            if i - start == 4 && bounded {
                for flag in &mut keep[start..i] {
                    *flag = false;
                }
            }
        } else {
            i += 1;
        }
    }
    let filtered: String = chars
        .iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(c, _)| *c)
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive the vehicle slug a Scunpacked paint tag points at.
///
/// `"Paint_890j_luminex"` -> `"890-jump"` (via the tag alias table).
/// Strips the `Paint_` prefix and any `_Paint` suffix, lowercases and
/// maps `_` to `-`, then applies [`alias::paint_tag_alias`] to the full
/// tag and, failing that, to each dash-prefix longest-first. Tags often
/// carry a paint-specific tail after the hull code; the prefix walk is
/// what lets the hull alias still fire.
pub fn slug_from_paint_tag(tag: &str) -> String {
    let t = tag.strip_prefix("Paint_").unwrap_or(tag);
    let t = t.strip_suffix("_Paint").unwrap_or(t);
    let base = t.to_lowercase().replace('_', "-");
    if let Some(canonical) = alias::paint_tag_alias(&base) {
        return canonical.to_string();
    }
    let mut end = base.len();
    while let Some(pos) = base[..end].rfind('-') {
        if let Some(canonical) = alias::paint_tag_alias(&base[..pos]) {
            return canonical.to_string();
        }
        end = pos;
    }
    base
}

/// Expand an RSI `"Ship - Paint Name"` SKU title for matching.
///
/// The abbreviated ship half is expanded via the paint-ship alias table
/// and the halves are rejoined with a single space:
/// `"Ares - Radiant"` -> `"Ares Star Fighter Radiant"`. Titles without
/// a `" - "` separator are returned unchanged.
pub fn expand_rsi_paint_name(title: &str) -> String {
    match title.split_once(" - ") {
        Some((ship, paint)) => {
            let ship = ship.trim();
            let paint = paint.trim();
            let ship = alias::paint_ship_alias(ship).unwrap_or(ship);
            format!("{ship} {paint}")
        }
        None => title.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_suffixes() {
        assert_eq!(normalize_paint_name("Ambush Paint"), "ambush");
        assert_eq!(normalize_paint_name("Ghoulish Green Livery"), "ghoulish green");
        assert_eq!(normalize_paint_name("Dunestalker Skin"), "dunestalker");
        assert_eq!(normalize_paint_name("Red Paint Livery"), "red");
    }

    #[test]
    fn normalize_transliterates() {
        assert_eq!(normalize_paint_name("Kamposī"), "kamposi");
        assert_eq!(normalize_paint_name("Kamposi\u{0304}"), "kamposi");
        assert_eq!(normalize_paint_name("Auspicious Red \u{2019}52"), "auspicious red '52");
    }

    #[test]
    fn normalize_fixes_misspellings() {
        assert_eq!(normalize_paint_name("Bushwacker"), "bushwhacker");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["Ambush Paint Paint", "Kamposī Livery", "Bushwacker Skin"] {
            let once = normalize_paint_name(input);
            assert_eq!(normalize_paint_name(&once), once);
        }
    }

    #[test]
    fn years_are_stripped() {
        assert_eq!(strip_years("Lovestruck 2951"), "Lovestruck");
        assert_eq!(strip_years("2952 Auspicious Red"), "Auspicious Red");
        assert_eq!(strip_years("Code 2951X"), "Code 2951X");
        assert_eq!(strip_years("12345"), "12345");
    }

    #[test]
    fn paint_tag_to_slug() {
        assert_eq!(slug_from_paint_tag("Paint_890j_luminex"), "890-jump");
        assert_eq!(slug_from_paint_tag("Paint_890j"), "890-jump");
        assert_eq!(slug_from_paint_tag("Paint_Aurora_Sunburst"), "aurora-sunburst");
        assert_eq!(slug_from_paint_tag("Paint_Aurora"), "aurora");
        assert_eq!(slug_from_paint_tag("Star_Runner_Paint"), "mercury-star-runner");
    }

    #[test]
    fn rsi_titles_expand() {
        assert_eq!(expand_rsi_paint_name("Ares - Radiant"), "Ares Star Fighter Radiant");
        assert_eq!(expand_rsi_paint_name("890 Jump - Luminex"), "890 Jump Luminex");
        assert_eq!(expand_rsi_paint_name("Solo Name"), "Solo Name");
    }
}
