use crate::types::dto::place::Place;

pub const DEFAULT_COLOR: &str = "#60a5fa";

const PALETTE: [(&str, &str); 4] = [
    ("maker", "#34d399"),
    ("cowork", "#6366f1"),
    ("studio", "#facc15"),
    ("gallery", "#f472b6"),
];

/// Lowercased tag with whitespace runs collapsed to `-`, industry first then vibes.
pub fn palette_key(place: &Place) -> String {
    [place.industry.as_deref(), place.vibes.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|tag| !tag.is_empty())
        .map(|tag| {
            tag.split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .to_lowercase()
        })
        .unwrap_or_else(|| String::from("default"))
}

pub fn marker_color(place: &Place) -> &'static str {
    let key = palette_key(place);
    PALETTE
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(DEFAULT_COLOR, |(_, color)| *color)
}
