//! Keys and values of the host's theme resource table.
//!
//! The engine only ever writes the keys enumerated by [`ResourceKey::all`].

use std::fmt;

use crate::color::Rgb;
use crate::palette::PaletteField;

/// Gradient and solid brushes published alongside the plain colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BrushKey {
    Overlay,
    Focus,
    MenuBorder,
    NoFocus,
    ButtonPlay,
    Shade,
    Glow,
    ControlBackground,
    Success,
}

impl BrushKey {
    pub const ALL: [BrushKey; 9] = [
        BrushKey::Overlay,
        BrushKey::Focus,
        BrushKey::MenuBorder,
        BrushKey::NoFocus,
        BrushKey::ButtonPlay,
        BrushKey::Shade,
        BrushKey::Glow,
        BrushKey::ControlBackground,
        BrushKey::Success,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BrushKey::Overlay => "Overlay",
            BrushKey::Focus => "Focus",
            BrushKey::MenuBorder => "MenuBorder",
            BrushKey::NoFocus => "NoFocus",
            BrushKey::ButtonPlay => "ButtonPlay",
            BrushKey::Shade => "Shade",
            BrushKey::Glow => "Glow",
            BrushKey::ControlBackground => "ControlBackground",
            BrushKey::Success => "Success",
        }
    }
}

/// A key in the fixed, enumerable set of resources the engine may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKey {
    Color(PaletteField),
    Brush(BrushKey),
}

impl ResourceKey {
    /// Every key the engine writes: one color per palette field, then one
    /// entry per brush.
    pub fn all() -> impl Iterator<Item = ResourceKey> {
        PaletteField::ALL
            .into_iter()
            .map(ResourceKey::Color)
            .chain(BrushKey::ALL.into_iter().map(ResourceKey::Brush))
    }

    pub const COUNT: usize = PaletteField::COUNT + BrushKey::ALL.len();

    /// Host-facing resource name, e.g. `DynAccentColor` or `DynOverlayBrush`.
    pub fn name(self) -> String {
        match self {
            ResourceKey::Color(field) => format!("Dyn{}Color", field.name()),
            ResourceKey::Brush(brush) => format!("Dyn{}Brush", brush.name()),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<PaletteField> for ResourceKey {
    fn from(field: PaletteField) -> Self {
        ResourceKey::Color(field)
    }
}

impl From<BrushKey> for ResourceKey {
    fn from(brush: BrushKey) -> Self {
        ResourceKey::Brush(brush)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradientStop {
    /// Position along the gradient axis, `0.0..=1.0`.
    pub offset: f32,
    pub color: Rgb,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgb) -> Self {
        Self { offset, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Brush {
    Solid(Rgb),
    /// Vertical linear gradient; stops are ordered by offset.
    LinearGradient(Vec<GradientStop>),
}

impl Brush {
    /// Evenly spaced vertical gradient over `colors`.
    pub fn vertical(colors: &[Rgb]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        Brush::LinearGradient(
            colors
                .iter()
                .enumerate()
                .map(|(i, color)| GradientStop::new(i as f32 / last, *color))
                .collect(),
        )
    }
}

/// A value stored in the host's resource table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceValue {
    Color(Rgb),
    Brush(Brush),
}

impl ResourceValue {
    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            ResourceValue::Color(color) => Some(*color),
            ResourceValue::Brush(Brush::Solid(color)) => Some(*color),
            ResourceValue::Brush(Brush::LinearGradient(_)) => None,
        }
    }
}
