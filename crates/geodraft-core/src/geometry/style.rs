//! Style bundles for geometries and their handles.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn yellow() -> Self {
        Self::new(255, 255, 0, 255)
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style of a point marker (point geometries, vertices and midpoints).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    pub color: SerializableColor,
    /// Marker diameter in screen pixels.
    pub pixel_size: f64,
    pub outline_color: SerializableColor,
    pub outline_width: f64,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::yellow(),
            pixel_size: 8.0,
            outline_color: SerializableColor::white(),
            outline_width: 0.0,
        }
    }
}

impl PointStyle {
    /// Default style for midpoint handles: translucent vertex markers.
    pub fn midpoint() -> Self {
        Self {
            color: SerializableColor::yellow().with_alpha(128),
            ..Self::default()
        }
    }
}

/// Style of a polyline body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolylineStyle {
    pub color: SerializableColor,
    pub width: f64,
    pub clamp_to_ground: bool,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            // greenyellow
            color: SerializableColor::new(173, 255, 47, 255),
            width: 1.0,
            clamp_to_ground: true,
        }
    }
}

/// Style of a polygon body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonStyle {
    pub fill: bool,
    pub fill_color: SerializableColor,
    pub outline: bool,
    pub outline_color: SerializableColor,
    pub outline_width: f64,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            fill: true,
            fill_color: SerializableColor::new(255, 0, 0, 128),
            outline: true,
            outline_color: SerializableColor::black(),
            outline_width: 1.0,
        }
    }
}

/// Text label attached to a point marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub text: String,
    pub fill_color: SerializableColor,
    pub scale: f64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            fill_color: SerializableColor::white(),
            scale: 1.0,
        }
    }
}
