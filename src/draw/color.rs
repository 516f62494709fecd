//! RGBA color type, predefined constants, and packed-color conversion.

use serde::{Deserialize, Serialize};

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum).
///
/// # Examples
///
/// ```
/// use plotboard::draw::Color;
/// let red = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
/// let semi_transparent_blue = Color { r: 0.0, g: 0.0, b: 1.0, a: 0.5 };
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0.0 = no red, 1.0 = full red)
    pub r: f64,
    /// Green component (0.0 = no green, 1.0 = full green)
    pub g: f64,
    /// Blue component (0.0 = no blue, 1.0 = full blue)
    pub b: f64,
    /// Alpha/transparency (0.0 = fully transparent, 1.0 = fully opaque)
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Decodes a packed `0xAABBGGRR` color as delivered over the engine ABI
    /// (byte order: red in the low byte, alpha in the high byte).
    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed & 0xff) as f64 / 255.0,
            g: ((packed >> 8) & 0xff) as f64 / 255.0,
            b: ((packed >> 16) & 0xff) as f64 / 255.0,
            a: ((packed >> 24) & 0xff) as f64 / 255.0,
        }
    }

    /// Formats the color as a `#rrggbb` hex string for markup output.
    ///
    /// Alpha is emitted separately as an opacity attribute, so it is not
    /// part of the hex form.
    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_byte(self.r),
            channel_byte(self.g),
            channel_byte(self.b)
        )
    }

    /// Returns true when the color draws nothing at all.
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

fn channel_byte(component: f64) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Predefined white color (R=1.0, G=1.0, B=1.0)
pub const WHITE: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Predefined black color (R=0.0, G=0.0, B=0.0)
pub const BLACK: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Fully transparent color (alpha = 0.0)
pub const TRANSPARENT: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_round_trips_channel_order() {
        let c = Color::from_packed(0xff00_80ff);
        assert!((c.r - 1.0).abs() < 1e-9);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
        assert!((c.b - 0.0).abs() < 1e-9);
        assert!((c.a - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hex_formatting_clamps_and_rounds() {
        assert_eq!(WHITE.to_hex(), "#ffffff");
        assert_eq!(BLACK.to_hex(), "#000000");
        assert_eq!(Color::new(1.5, -0.2, 0.5, 1.0).to_hex(), "#ff0080");
    }

    #[test]
    fn transparency_check_uses_alpha_only() {
        assert!(TRANSPARENT.is_transparent());
        assert!(!WHITE.is_transparent());
        assert!(Color::new(1.0, 1.0, 1.0, 0.0).is_transparent());
    }
}
