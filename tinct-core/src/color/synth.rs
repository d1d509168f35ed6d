//! Palette synthesis from a single accent.

use tinct_model::{Palette, PaletteField, Rgb, darken, lighten, mix};

use crate::constants::synth::*;

/// Clamp an accent for readability: pull it 20% toward the gray of equal HSL
/// lightness, then darken it when it is still too luminous to carry white
/// text.
pub fn safe_accent(accent: Rgb) -> Rgb {
    let gray = accent.lightness().round() as u8;
    let softened = mix(accent, Rgb::gray(gray), DESATURATE);

    let luminance = softened.luminance();
    if luminance <= LUMINANCE_CEILING {
        return softened;
    }
    let excess = (luminance - LUMINANCE_CEILING) / (1.0 - LUMINANCE_CEILING);
    darken(softened, excess.min(MAX_CLAMP_DARKEN))
}

/// Expand one accent into a complete palette.
pub fn synthesize(accent: Rgb) -> Palette {
    let safe = safe_accent(accent);
    let overlay_mid = darken(safe, OVERLAY_MID_DARKEN);
    let overlay_bot = darken(safe, OVERLAY_BOT_DARKEN);
    let text = mix(Rgb::WHITE, overlay_mid, TEXT_MIX);

    let focus_start = if safe.luminance() > FOCUS_LIGHT_THRESHOLD {
        darken(safe, 0.20)
    } else {
        lighten(safe, 0.20)
    };

    Palette::from_fn(|field| match field {
        PaletteField::Accent => safe,
        PaletteField::Glow => lighten(safe, 0.20),
        PaletteField::Highlight => lighten(safe, 0.35),
        PaletteField::Secondary => darken(safe, 0.35),
        PaletteField::Text => text,
        PaletteField::TextSecondary => {
            mix(Rgb::WHITE, overlay_mid, TEXT_SECONDARY_MIX)
        }
        PaletteField::TextDetail => darken(text, TEXT_DETAIL_DARKEN),
        PaletteField::OverlayTop => safe,
        PaletteField::OverlayMid => overlay_mid,
        PaletteField::OverlayBot => overlay_bot,
        PaletteField::ButtonPlayMid => darken(safe, 0.20),
        PaletteField::ButtonPlayEnd => darken(safe, 0.50),
        PaletteField::FocusStart => focus_start,
        PaletteField::FocusMid => safe,
        PaletteField::FocusEnd => darken(safe, 0.50),
        PaletteField::MenuBorderStart => lighten(safe, 0.50),
        PaletteField::MenuBorderEnd => darken(overlay_mid, 0.35),
        PaletteField::NoFocusStart => darken(overlay_mid, 0.50),
        PaletteField::NoFocusEnd => darken(overlay_bot, 0.70),
        PaletteField::ShadeMid => darken(safe, 0.80),
        PaletteField::ShadeEnd => darken(overlay_bot, 0.80),
        PaletteField::ControlBackground => darken(overlay_bot, 0.50),
        PaletteField::SuccessStart => mix(safe, SUCCESS_BASE, SUCCESS_MIX),
        PaletteField::GlowMid => darken(safe, 0.20),
        PaletteField::GlowEnd => darken(safe, 0.70),
    })
}
