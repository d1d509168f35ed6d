//! The full set of UI colors derived from one accent.

use std::fmt;

use crate::color::{Rgb, lerp};
use crate::error::ModelError;

macro_rules! palette_fields {
    ($($variant:ident),+ $(,)?) => {
        /// Named slot in a [`Palette`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize)
        )]
        pub enum PaletteField {
            $($variant),+
        }

        impl PaletteField {
            /// Every field, in declaration order.
            pub const ALL: [PaletteField; PaletteField::COUNT] =
                [$(PaletteField::$variant),+];

            /// The field's PascalCase name, as used in the disk cache.
            pub const fn name(self) -> &'static str {
                match self {
                    $(PaletteField::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

palette_fields!(
    Accent,
    Glow,
    Highlight,
    Secondary,
    Text,
    TextSecondary,
    TextDetail,
    OverlayTop,
    OverlayMid,
    OverlayBot,
    ButtonPlayMid,
    ButtonPlayEnd,
    FocusStart,
    FocusMid,
    FocusEnd,
    MenuBorderStart,
    MenuBorderEnd,
    NoFocusStart,
    NoFocusEnd,
    ShadeMid,
    ShadeEnd,
    ControlBackground,
    SuccessStart,
    GlowMid,
    GlowEnd,
);

impl PaletteField {
    pub const COUNT: usize = 25;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| ModelError::UnknownField(name.to_string()))
    }
}

impl fmt::Display for PaletteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable palette. Two palettes synthesized from the same accent compare
/// equal field for field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette {
    colors: [Rgb; PaletteField::COUNT],
}

impl Palette {
    /// Build a palette by evaluating `f` once per field.
    pub fn from_fn(mut f: impl FnMut(PaletteField) -> Rgb) -> Self {
        let mut colors = [Rgb::BLACK; PaletteField::COUNT];
        for field in PaletteField::ALL {
            colors[field.index()] = f(field);
        }
        Self { colors }
    }

    /// A palette where every field holds `color`.
    pub fn uniform(color: Rgb) -> Self {
        Self {
            colors: [color; PaletteField::COUNT],
        }
    }

    #[inline]
    pub fn get(&self, field: PaletteField) -> Rgb {
        self.colors[field.index()]
    }

    pub fn accent(&self) -> Rgb {
        self.get(PaletteField::Accent)
    }

    /// Copy of this palette with one field replaced.
    pub fn with(mut self, field: PaletteField, color: Rgb) -> Self {
        self.colors[field.index()] = color;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaletteField, Rgb)> + '_ {
        PaletteField::ALL
            .into_iter()
            .map(|field| (field, self.get(field)))
    }

    /// Interpolate every channel of every field. `t` is clamped to `0..=1`.
    pub fn lerp(from: &Palette, to: &Palette, t: f64) -> Palette {
        Palette::from_fn(|field| lerp(from.get(field), to.get(field), t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in PaletteField::ALL {
            assert_eq!(PaletteField::from_name(field.name()), Ok(field));
        }
        assert_eq!(PaletteField::ALL.len(), PaletteField::COUNT);
        assert_eq!(PaletteField::GlowEnd.index(), PaletteField::COUNT - 1);
        assert!(PaletteField::from_name("Accentt").is_err());
    }

    #[test]
    fn lerp_endpoints_match_inputs() {
        let from = Palette::uniform(Rgb::new(10, 20, 30));
        let to = Palette::from_fn(|f| Rgb::gray(f.index() as u8 * 10));

        assert_eq!(Palette::lerp(&from, &to, 0.0), from);
        assert_eq!(Palette::lerp(&from, &to, 1.0), to);

        let mid = Palette::lerp(&from, &to, 0.5);
        assert_eq!(mid.get(PaletteField::Accent), Rgb::new(5, 10, 15));
    }

    #[test]
    fn with_replaces_single_field() {
        let base = Palette::uniform(Rgb::BLACK);
        let changed = base.with(PaletteField::Text, Rgb::WHITE);
        assert_eq!(changed.get(PaletteField::Text), Rgb::WHITE);
        assert_eq!(changed.accent(), Rgb::BLACK);
        assert_eq!(changed.iter().filter(|(_, c)| *c == Rgb::WHITE).count(), 1);
    }
}
