//! UK postcode normalization.
//!
//! A postcode is normalized by uppercasing and removing all whitespace
//! (`se20 7ua` -> `SE207UA`). The inward code is always three characters, so
//! the outcode is whatever precedes the final three.

/// Length of the inward part of a UK postcode.
pub const INWARD_CODE_LEN: usize = 3;

/// Uppercase a postcode and strip every whitespace character.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Outward code of a normalized postcode (`SE207UA` -> `SE20`).
///
/// Returns an empty string when the input is too short to carry an inward code.
pub fn outcode(normalized: &str) -> &str {
    match normalized.char_indices().rev().nth(INWARD_CODE_LEN - 1) {
        Some((idx, _)) => &normalized[..idx],
        None => "",
    }
}

/// Leading letters of an outcode (`SE20` -> `SE`, `E1W` -> `E`).
pub fn area_letters(outcode: &str) -> &str {
    let end = outcode
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphabetic())
        .map_or(outcode.len(), |(idx, _)| idx);
    &outcode[..end]
}

/// Whether an outcode's area letters start with any of the allowed areas.
///
/// Allowed entries are compared case-insensitively; blank entries never match.
pub fn area_allowed(outcode: &str, allowed_areas: &[String]) -> bool {
    let letters = area_letters(outcode);
    allowed_areas.iter().any(|area| {
        let area = area.trim();
        !area.is_empty() && letters.starts_with(&area.to_ascii_uppercase())
    })
}
