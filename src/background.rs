use crate::color::Color;

// Achromatic ramp, near-white to near-black. Declaration order breaks ties.
const NEUTRAL_RAMP: [Color; 6] = [
    Color::rgb(0xfa, 0xfa, 0xfa),
    Color::rgb(0xe0, 0xe0, 0xe0),
    Color::rgb(0x9e, 0x9e, 0x9e),
    Color::rgb(0x61, 0x61, 0x61),
    Color::rgb(0x37, 0x37, 0x37),
    Color::rgb(0x14, 0x14, 0x14),
];

const DISTANCE_WEIGHT: f64 = 0.6;
const LUMINANCE_WEIGHT: f64 = 0.4;

pub fn candidates() -> &'static [Color] {
    &NEUTRAL_RAMP
}

/// Pick a backdrop that neither merges with nor clashes against the
/// document's own colors.
///
/// Score = weighted minimum RGB distance to the palette (the backdrop must
/// stay visually separate) + closeness of the candidate's luminance to the
/// complement of the palette's mean luminance (light art gets a dark
/// backdrop and vice versa). Pure and deterministic; an empty palette yields
/// the second-lightest ramp entry.
pub fn select(palette: &[Color]) -> Color {
    if palette.is_empty() {
        return NEUTRAL_RAMP[1];
    }
    let mean_luminance =
        palette.iter().map(|color| color.luminance()).sum::<f64>() / palette.len() as f64;
    let target_luminance = 1.0 - mean_luminance;

    let mut best = NEUTRAL_RAMP[0];
    let mut best_score = f64::NEG_INFINITY;
    for candidate in NEUTRAL_RAMP {
        let score = score(candidate, palette, target_luminance);
        // Strict comparison keeps declaration order on ties.
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    best
}

fn score(candidate: Color, palette: &[Color], target_luminance: f64) -> f64 {
    let diagonal = (3.0f64).sqrt() * 255.0;
    let min_distance = palette
        .iter()
        .map(|color| candidate.distance(*color))
        .fold(f64::INFINITY, f64::min);
    let separation = min_distance / diagonal;
    let luminance_fit = 1.0 - (candidate.luminance() - target_luminance).abs();
    DISTANCE_WEIGHT * separation + LUMINANCE_WEIGHT * luminance_fit
}
