//! Slug derivation from ship codes and display names.
//!
//! Slugs are the stable identity of a vehicle row. They are derived once
//! from upstream data and never rewritten, so every function here must be
//! idempotent: feeding a slug back through its own derivation yields the
//! same slug.

/// Derive a slug from an in-engine ship code.
///
/// The first underscore-delimited segment is a manufacturer prefix and is
/// dropped; the remaining segments are lowercased and joined with `-`:
/// `"ANVL_F7A_Hornet_Mk_I"` becomes `"f7a-hornet-mk-i"`. A single-segment
/// input has no prefix to strip and returns its lowercased self, which is
/// what makes the function idempotent over its own output.
pub fn slug_from_ship_code(code: &str) -> String {
    let mut parts = code.split('_');
    let first = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();
    if rest.is_empty() {
        return first.to_lowercase();
    }
    rest.join("-").to_lowercase()
}

/// Derive a slug from a display name.
///
/// Lowercases, maps spaces and underscores to `-` (collapsing runs),
/// drops punctuation other than `-`, and trims any trailing `-`.
pub fn slug_from_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_dash = true; // swallows leading separators
    for ch in name.to_lowercase().chars() {
        if ch == ' ' || ch == '_' || ch == '-' {
            if !prev_dash {
                out.push('-');
                prev_dash = true;
            }
        } else if ch.is_alphanumeric() {
            out.push(ch);
            prev_dash = false;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Reduce a slug or name to its alphanumeric skeleton.
///
/// `"a-t-l-s"` becomes `"atls"`. Used as the last resort when comparing a
/// hangar entry against vehicle slugs that disagree on separators.
pub fn compact_slug(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect()
}
