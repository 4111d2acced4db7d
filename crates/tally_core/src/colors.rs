//! Color Assigner: deterministic display color per choice label.
//!
//! Canonical labels (matched on the leading word, trimmed, ASCII case-insensitive)
//! get fixed colors; everything else is hashed into a fixed palette. No RNG, no
//! platform-dependent hashing.

use sha2::{Digest, Sha256};

use crate::registry::ChoiceRegistry;

pub const FOR_COLOR: &str = "#16A34A";
pub const AGAINST_COLOR: &str = "#DC2626";
pub const ABSTAIN_COLOR: &str = "#6B7280";

/// Fallback palette, indexed by the first byte of SHA-256(label).
pub const PALETTE: [&str; 12] = [
    "#2563EB", "#9333EA", "#EA580C", "#0891B2", "#DB2777", "#65A30D",
    "#CA8A04", "#4F46E5", "#0D9488", "#C026D3", "#E11D48", "#7C3AED",
];

fn leading_word(label: &str) -> String {
    label
        .trim()
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn canonical_color(label: &str) -> Option<&'static str> {
    match leading_word(label).as_str() {
        "for" | "yes" | "yae" => Some(FOR_COLOR),
        "against" | "no" | "nay" => Some(AGAINST_COLOR),
        "abstain" => Some(ABSTAIN_COLOR),
        _ => None,
    }
}

fn hashed_color(label: &str) -> &'static str {
    let digest = Sha256::digest(label.as_bytes());
    PALETTE[digest[0] as usize % PALETTE.len()]
}

/// Color for a single label.
pub fn color_for_label(label: &str) -> String {
    canonical_color(label)
        .unwrap_or_else(|| hashed_color(label))
        .to_string()
}

/// Colors parallel to the registry's labels.
pub fn assign_colors(registry: &ChoiceRegistry<'_>) -> Vec<String> {
    registry.labels().iter().map(|l| color_for_label(l)).collect()
}
