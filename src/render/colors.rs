//! Palette for the room view.
//!
//! Item colors use the Okabe-Ito colorblind-safe palette so neighbouring
//! items stay distinguishable; ghost states use green/red/amber.

use ratatui::style::Color;

use roomplan::grid::Surface;

/// Okabe-Ito palette (8 colors), one per placed item by draft index
pub const ITEM_COLORS: [Color; 8] = [
    Color::Rgb(0, 114, 178),   // Blue
    Color::Rgb(230, 159, 0),   // Orange
    Color::Rgb(0, 158, 115),   // Bluish Green
    Color::Rgb(240, 228, 66),  // Yellow
    Color::Rgb(86, 180, 233),  // Sky Blue
    Color::Rgb(213, 94, 0),    // Vermillion
    Color::Rgb(204, 121, 167), // Reddish Purple
    Color::Rgb(136, 136, 136), // Gray
];

/// Colors for the three ghost states
#[derive(Debug, Clone, Copy)]
pub struct GhostColors {
    pub valid: Color,
    pub invalid: Color,
    pub pending: Color,
}

pub const GHOST_COLORS: GhostColors = GhostColors {
    valid: Color::Rgb(0, 200, 100),
    invalid: Color::Rgb(255, 80, 80),
    pending: Color::Rgb(255, 200, 80),
};

pub const GRID_LINE: Color = Color::Rgb(70, 70, 85);
pub const BACKGROUND: Color = Color::Rgb(15, 15, 22);

/// Base fill of a surface; alternate cells get a slightly darker shade
pub fn surface_color(surface: Surface, checker: bool) -> Color {
    let base = match surface {
        Surface::Floor => Color::Rgb(92, 74, 58),
        Surface::LeftWall => Color::Rgb(70, 78, 96),
        Surface::RightWall => Color::Rgb(82, 90, 108),
    };
    if checker {
        dim_color(base, 0.85)
    } else {
        base
    }
}

pub fn item_color(index: usize) -> Color {
    ITEM_COLORS[index % ITEM_COLORS.len()]
}

/// Dim a color by a factor (0.0 = black, 1.0 = unchanged).
/// Non-RGB colors come back unchanged.
pub fn dim_color(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            (r as f32 * factor) as u8,
            (g as f32 * factor) as u8,
            (b as f32 * factor) as u8,
        ),
        other => other,
    }
}

/// Interpolate between two RGB colors
pub fn lerp_color(from: Color, to: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        (from, to) => {
            if t < 0.5 {
                from
            } else {
                to
            }
        }
    }
}
