//! Deterministic color lookups: frequency bands, chakra bands and theme palettes.
//!
//! Band edges are hard cutoffs. Neighbouring bands never blend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maps a frequency in Hz onto one of six fixed spectral bands.
pub fn frequency_to_color(frequency: f32) -> String {
    let (hue, lightness) = if frequency < 60.0 {
        (0, 40)
    } else if frequency < 250.0 {
        (30, 50)
    } else if frequency < 500.0 {
        (60, 50)
    } else if frequency < 2000.0 {
        (120, 45)
    } else if frequency < 6000.0 {
        (240, 60)
    } else {
        (280, 70)
    };
    format!("hsl({hue}, 70%, {lightness}%)")
}

pub const CHAKRA_COLORS: [&str; 7] = [
    "#FF0000", // root
    "#FF7F00", // sacral
    "#FFFF00", // solar plexus
    "#00FF00", // heart
    "#0000FF", // throat
    "#4B0082", // third eye
    "#8B00FF", // crown
];

const CHAKRA_BREAKPOINTS: [f32; 6] = [256.0, 288.0, 320.0, 341.0, 384.0, 426.0];

/// Maps a frequency in Hz onto the chakra it is closest to, by fixed breakpoints.
pub fn chakra_frequency_to_color(frequency: f32) -> &'static str {
    let band = CHAKRA_BREAKPOINTS
        .iter()
        .position(|&edge| frequency < edge)
        .unwrap_or(CHAKRA_BREAKPOINTS.len());
    CHAKRA_COLORS[band]
}

/// Named gradient palettes selectable from the settings UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColorTheme {
    #[default]
    CosmicViolet,
    ChakraRainbow,
    EarthTones,
    OceanDepths,
    FireEssence,
    EtherealMist,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 6] = [
        ColorTheme::CosmicViolet,
        ColorTheme::ChakraRainbow,
        ColorTheme::EarthTones,
        ColorTheme::OceanDepths,
        ColorTheme::FireEssence,
        ColorTheme::EtherealMist,
    ];

    /// Resolves a theme by name. Unknown names resolve to cosmic-violet.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|theme| theme.name() == name)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorTheme::CosmicViolet => "cosmic-violet",
            ColorTheme::ChakraRainbow => "chakra-rainbow",
            ColorTheme::EarthTones => "earth-tones",
            ColorTheme::OceanDepths => "ocean-depths",
            ColorTheme::FireEssence => "fire-essence",
            ColorTheme::EtherealMist => "ethereal-mist",
        }
    }

    /// Ordered gradient stops, darkest or first hue first.
    pub fn stops(self) -> &'static [&'static str] {
        match self {
            ColorTheme::CosmicViolet => &["#1A0033", "#4B0082", "#8B00FF", "#DA70D6", "#E6E6FA"],
            ColorTheme::ChakraRainbow => &CHAKRA_COLORS,
            ColorTheme::EarthTones => &["#3E2723", "#5D4037", "#8D6E63", "#A1887F", "#D7CCC8"],
            ColorTheme::OceanDepths => &["#001F3F", "#003366", "#0074D9", "#39CCCC", "#7FDBFF"],
            ColorTheme::FireEssence => &["#330000", "#8B0000", "#FF4500", "#FF8C00", "#FFD700"],
            ColorTheme::EtherealMist => &["#E0F7FA", "#B2EBF2", "#D1C4E9", "#F3E5F5", "#FFFFFF"],
        }
    }

    /// Picks the stop covering `t` in [0, 1]. Stepped, like the band mappers.
    pub fn sample(self, t: f32) -> &'static str {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let index = ((t * stops.len() as f32) as usize).min(stops.len() - 1);
        stops[index]
    }

    /// CSS linear-gradient for hosts that paint the palette directly.
    pub fn css_gradient(self) -> String {
        format!("linear-gradient(135deg, {})", self.stops().join(", "))
    }
}

impl From<String> for ColorTheme {
    fn from(value: String) -> Self {
        ColorTheme::from_name(&value)
    }
}

impl From<ColorTheme> for String {
    fn from(value: ColorTheme) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for ColorTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Linear float color used by materials and surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Converts hue in degrees, saturation and lightness in [0, 1].
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Self::new(r + m, g + m, b + m)
    }

    /// Parses the two string forms the mappers emit: hex and `hsl(h, s%, l%)`.
    pub fn parse(css: &str) -> Option<Self> {
        let css = css.trim();
        if let Some(body) = css.strip_prefix("hsl(").and_then(|rest| rest.strip_suffix(')')) {
            let mut parts = body
                .split(',')
                .map(|part| part.trim().trim_end_matches('%').parse::<f32>());
            let h = parts.next()?.ok()?;
            let s = parts.next()?.ok()?;
            let l = parts.next()?.ok()?;
            if parts.next().is_some() {
                return None;
            }
            return Some(Self::from_hsl(h, s / 100.0, l / 100.0));
        }
        Self::from_hex(css)
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(
            (self.r * factor).clamp(0.0, 1.0),
            (self.g * factor).clamp(0.0, 1.0),
            (self.b * factor).clamp(0.0, 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_bands_use_hard_cutoffs() {
        assert_eq!(frequency_to_color(59.9), "hsl(0, 70%, 40%)");
        assert_eq!(frequency_to_color(60.0), "hsl(30, 70%, 50%)");
        assert_eq!(frequency_to_color(440.0), "hsl(60, 70%, 50%)");
        assert_eq!(frequency_to_color(1999.0), "hsl(120, 70%, 45%)");
        assert_eq!(frequency_to_color(2000.0), "hsl(240, 70%, 60%)");
        assert_eq!(frequency_to_color(12_000.0), "hsl(280, 70%, 70%)");
    }

    #[test]
    fn mappers_are_pure() {
        for freq in [0.0, 100.0, 300.0, 432.0, 5000.0, 20_000.0] {
            assert_eq!(frequency_to_color(freq), frequency_to_color(freq));
            assert_eq!(chakra_frequency_to_color(freq), chakra_frequency_to_color(freq));
        }
    }

    #[test]
    fn chakra_breakpoints() {
        assert_eq!(chakra_frequency_to_color(200.0), "#FF0000");
        assert_eq!(chakra_frequency_to_color(256.0), "#FF7F00");
        assert_eq!(chakra_frequency_to_color(300.0), "#FFFF00");
        assert_eq!(chakra_frequency_to_color(330.0), "#00FF00");
        assert_eq!(chakra_frequency_to_color(341.0), "#0000FF");
        assert_eq!(chakra_frequency_to_color(400.0), "#4B0082");
        assert_eq!(chakra_frequency_to_color(426.0), "#8B00FF");
        assert_eq!(chakra_frequency_to_color(f32::NAN), "#8B00FF");
    }

    #[test]
    fn unknown_theme_is_cosmic_violet() {
        assert_eq!(ColorTheme::from_name("ocean-depths"), ColorTheme::OceanDepths);
        assert_eq!(ColorTheme::from_name("vaporwave"), ColorTheme::CosmicViolet);
        assert_eq!(ColorTheme::from_name(""), ColorTheme::CosmicViolet);
    }

    #[test]
    fn theme_sampling_covers_every_stop() {
        let theme = ColorTheme::ChakraRainbow;
        assert_eq!(theme.sample(0.0), "#FF0000");
        assert_eq!(theme.sample(1.0), "#8B00FF");
        assert_eq!(theme.sample(-3.0), "#FF0000");
        assert!(theme.css_gradient().starts_with("linear-gradient(135deg, #FF0000"));
    }

    #[test]
    fn parses_emitted_colors() {
        let red = Rgb::parse("#FF0000").unwrap();
        assert_eq!(red, Rgb::new(1.0, 0.0, 0.0));

        let green = Rgb::parse("hsl(120, 100%, 50%)").unwrap();
        assert!((green.g - 1.0).abs() < 1e-5 && green.r.abs() < 1e-5);

        for freq in [10.0, 100.0, 400.0, 1000.0, 3000.0, 9000.0] {
            assert!(Rgb::parse(&frequency_to_color(freq)).is_some());
        }
        assert!(Rgb::parse("#12345").is_none());
        assert!(Rgb::parse("hsl(1, 2%)").is_none());
    }

    #[test]
    fn scaling_clamps_channels() {
        let color = Rgb::new(0.8, 0.5, 0.1).scaled(2.0);
        assert_eq!(color, Rgb::new(1.0, 1.0, 0.2));
    }
}
