//! Entity to palette: cache lookup, then decode, sample and synthesize.
//!
//! Everything here blocks on file IO and decoding; async callers run it on
//! `spawn_blocking`.

use std::sync::Arc;

use image::RgbaImage;
use tinct_model::{Entity, Palette};
use tracing::debug;

use crate::cache::{CacheKey, PaletteCache};
use crate::color::{PixelView, sample, synthesize};
use crate::resolver::{ImageCandidate, ImageResolver, ImageSource};

#[derive(Debug, Clone, PartialEq)]
pub struct ComputedPalette {
    pub palette: Palette,
    pub key: CacheKey,
    pub source: ImageSource,
    /// Served from RAM or disk without decoding.
    pub cached: bool,
}

pub fn palette_from_pixels(pixels: &RgbaImage) -> Palette {
    synthesize(sample(&PixelView::from_rgba(pixels)))
}

/// Cached palette for `candidate`, or decode and store a fresh one.
pub fn palette_for_candidate(
    candidate: &ImageCandidate,
    resolver: &ImageResolver,
    cache: &Arc<PaletteCache>,
) -> Option<ComputedPalette> {
    if let Some(palette) = cache.get(&candidate.key) {
        return Some(ComputedPalette {
            palette,
            key: candidate.key.clone(),
            source: candidate.source,
            cached: true,
        });
    }

    let pixels = match resolver.decode(candidate) {
        Ok(pixels) => pixels,
        Err(e) => {
            debug!(
                path = %candidate.path.display(),
                error = %e,
                "artwork candidate rejected"
            );
            return None;
        }
    };
    let palette = palette_from_pixels(&pixels);
    cache.put(candidate.key.clone(), palette);
    Some(ComputedPalette {
        palette,
        key: candidate.key.clone(),
        source: candidate.source,
        cached: false,
    })
}

/// Palette for the first usable candidate of `entity`. `None` means the
/// entity has no usable artwork and the theme should be left alone.
pub fn palette_for_entity(
    entity: &Entity,
    resolver: &ImageResolver,
    cache: &Arc<PaletteCache>,
) -> Option<ComputedPalette> {
    resolver
        .locate(entity)
        .iter()
        .find_map(|candidate| palette_for_candidate(candidate, resolver, cache))
}
