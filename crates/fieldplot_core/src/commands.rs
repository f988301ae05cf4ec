//! The draw-command vocabulary emitted by the plotter.
//!
//! Commands mirror the subset of the HTML canvas 2D API the renderer needs,
//! in logical pixel units. A frame is a `Vec<DrawCommand>` that a
//! [`Surface`](crate::render::Surface) replays in order.
//!
//! # Command Categories
//!
//! - **Surface**: `Scale`, `ClearRect`
//! - **State**: `Save`, `Restore`, `SetLineWidth`, `SetStrokeColor`, `SetFillColor`
//! - **Path**: `BeginPath`, `MoveTo`, `LineTo`, `Arc`, `ClosePath`
//! - **Paint**: `Stroke`, `Fill`

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color with 8-bit components.
///
/// Serializes as a CSS hex string (`#RRGGBB`, or `#RRGGBBAA` when not
/// opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let short = |i: usize| {
                    let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
                    Some(v * 17)
                };
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// CSS color string accepted by `strokeStyle` / `fillStyle`.
    pub fn to_css(self) -> String {
        self.to_string()
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TICK: Color = Color::rgb(0xDD, 0xDD, 0xDD);
    pub const GRID: Color = Color::rgb(0xBB, 0xBB, 0xBB);
    pub const POINT: Color = Color::rgb(0x55, 0x55, 0x55);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02X}{:02X}{:02X}{:02X}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// One drawing operation in logical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Scale the context. Issued once, when the surface is attached.
    Scale { x: f64, y: f64 },
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Save,
    Restore,
    SetLineWidth { width: f64 },
    SetStrokeColor { color: Color },
    SetFillColor { color: Color },
    BeginPath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    ClosePath,
    Stroke,
    Fill,
}
