use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::colors::{Rgb, player_color};
use crate::tile::PlayerId;

/// Light/dark pair for the checkerboard on defended borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefendedBorderColors {
    pub light: Rgb,
    pub dark: Rgb,
}

/// Colour policy. A `None` means "no colour for this context"; the tile is skipped.
pub trait Theme {
    fn territory_color(&self, player: PlayerId) -> Option<Rgb>;
    fn border_color(&self, player: PlayerId) -> Option<Rgb>;
    fn defended_border_colors(&self, player: PlayerId) -> Option<DefendedBorderColors>;
    fn focused_border_color(&self) -> Option<Rgb>;
    fn fallout_color(&self) -> Option<Rgb>;
    fn spawn_highlight_color(&self) -> Option<Rgb>;
    fn self_color(&self) -> Option<Rgb>;
}

/// Palette-driven theme. Players without an explicit entry get a colour
/// hashed from their registered name; unregistered players have none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteTheme {
    pub player_names: HashMap<PlayerId, String>,
    pub player_colors: HashMap<PlayerId, Rgb>,
    pub border_shade: f64,
    pub defended_shade: f64,
    pub focused_border: Rgb,
    pub fallout: Rgb,
    pub spawn_highlight: Rgb,
    pub self_highlight: Rgb,
}

impl Default for PaletteTheme {
    fn default() -> Self {
        Self {
            player_names: HashMap::new(),
            player_colors: HashMap::new(),
            border_shade: -0.2,
            defended_shade: 0.12,
            focused_border: Rgb(230, 230, 230),
            fallout: Rgb(120, 255, 71),
            spawn_highlight: Rgb(255, 213, 79),
            self_highlight: Rgb(0, 255, 0),
        }
    }
}

impl PaletteTheme {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn register_player(&mut self, player: PlayerId, name: impl Into<String>) {
        self.player_names.insert(player, name.into());
    }

    pub fn set_player_color(&mut self, player: PlayerId, color: Rgb) {
        self.player_colors.insert(player, color);
    }
}

impl Theme for PaletteTheme {
    fn territory_color(&self, player: PlayerId) -> Option<Rgb> {
        self.player_colors
            .get(&player)
            .copied()
            .or_else(|| self.player_names.get(&player).map(|name| player_color(name)))
    }

    fn border_color(&self, player: PlayerId) -> Option<Rgb> {
        self.territory_color(player)
            .map(|base| base.shade(self.border_shade))
    }

    fn defended_border_colors(&self, player: PlayerId) -> Option<DefendedBorderColors> {
        let border = self.border_color(player)?;
        Some(DefendedBorderColors {
            light: border.shade(self.defended_shade),
            dark: border.shade(-self.defended_shade),
        })
    }

    fn focused_border_color(&self) -> Option<Rgb> {
        Some(self.focused_border)
    }

    fn fallout_color(&self) -> Option<Rgb> {
        Some(self.fallout)
    }

    fn spawn_highlight_color(&self) -> Option<Rgb> {
        Some(self.spawn_highlight)
    }

    fn self_color(&self) -> Option<Rgb> {
        Some(self.self_highlight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_player_has_no_colors() {
        let theme = PaletteTheme::default();
        assert_eq!(theme.territory_color(PlayerId(9)), None);
        assert_eq!(theme.defended_border_colors(PlayerId(9)), None);
    }

    #[test]
    fn explicit_color_wins_over_name_hash() {
        let mut theme = PaletteTheme::default();
        theme.register_player(PlayerId(1), "Aurelia");
        assert_eq!(theme.territory_color(PlayerId(1)), Some(player_color("Aurelia")));

        theme.set_player_color(PlayerId(1), Rgb(10, 20, 200));
        assert_eq!(theme.territory_color(PlayerId(1)), Some(Rgb(10, 20, 200)));
    }

    #[test]
    fn defended_pair_brackets_border_color() {
        let mut theme = PaletteTheme::default();
        theme.set_player_color(PlayerId(1), Rgb(40, 90, 200));
        let pair = theme.defended_border_colors(PlayerId(1)).unwrap();
        assert_ne!(pair.light, pair.dark);
    }

    #[test]
    fn palette_loads_from_partial_json() {
        let theme = PaletteTheme::from_json(r#"{"fallout":[1,2,3]}"#).unwrap();
        assert_eq!(theme.fallout, Rgb(1, 2, 3));
        assert_eq!(theme.spawn_highlight, PaletteTheme::default().spawn_highlight);
    }
}
