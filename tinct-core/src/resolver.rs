//! Locate and decode the artwork a palette is sampled from.
//!
//! An entity offers up to two candidates, background art first and cover art
//! second. [`ImageResolver::locate`] does only the cheap checks (extension and
//! `stat`) so callers can consult the palette cache before paying for a
//! decode.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use image::{ImageReader, RgbaImage};
use tinct_model::Entity;
use tracing::debug;

use crate::cache::CacheKey;
use crate::config::ThemingConfig;
use crate::constants::artwork::{
    MAX_DECODE_DIMENSION, MIN_DIMENSION, STATIC_EXTENSIONS, VIDEO_EXTENSIONS,
};
use crate::error::{Result, ThemeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSource {
    Background,
    Cover,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Background => f.write_str("background"),
            ImageSource::Cover => f.write_str("cover"),
        }
    }
}

/// A still image on disk that has not been decoded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub path: PathBuf,
    pub source: ImageSource,
    pub key: CacheKey,
}

#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub pixels: RgbaImage,
    pub source: ImageSource,
    pub key: CacheKey,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageResolver {
    min_dimension: u32,
    max_decode_dimension: u32,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(MIN_DIMENSION, MAX_DECODE_DIMENSION)
    }
}

impl ImageResolver {
    pub fn new(min_dimension: u32, max_decode_dimension: u32) -> Self {
        Self {
            min_dimension,
            max_decode_dimension: max_decode_dimension.max(1),
        }
    }

    pub fn from_config(config: &ThemingConfig) -> Self {
        Self::new(config.min_image_dimension, config.max_decode_dimension)
    }

    /// Candidates for `entity` in preference order, each with its cache key.
    pub fn locate(&self, entity: &Entity) -> Vec<ImageCandidate> {
        [
            (entity.background(), ImageSource::Background),
            (entity.cover(), ImageSource::Cover),
        ]
        .into_iter()
        .filter_map(|(path, source)| {
            let path = path?;
            if !is_static_image(path) {
                debug!(
                    path = %path.display(),
                    %source,
                    "skipping non-image artwork"
                );
                return None;
            }
            let Some(key) = CacheKey::for_file(path) else {
                debug!(path = %path.display(), %source, "artwork missing");
                return None;
            };
            Some(ImageCandidate {
                path: path.to_path_buf(),
                source,
                key,
            })
        })
        .collect()
    }

    /// Decode one candidate, downscaled so neither side exceeds the decode
    /// limit.
    pub fn decode(&self, candidate: &ImageCandidate) -> Result<RgbaImage> {
        let (width, height) = image::image_dimensions(&candidate.path)?;
        if width < self.min_dimension || height < self.min_dimension {
            return Err(ThemeError::ImageUnavailable(format!(
                "{} is {width}x{height}, below {}px",
                candidate.path.display(),
                self.min_dimension
            )));
        }

        let decoded = ImageReader::open(&candidate.path)?
            .with_guessed_format()?
            .decode()?;

        let limit = self.max_decode_dimension;
        let decoded = if decoded.width() > limit || decoded.height() > limit {
            decoded.thumbnail(limit, limit)
        } else {
            decoded
        };
        Ok(decoded.to_rgba8())
    }

    /// First candidate that decodes. Failures are logged and the next
    /// candidate is tried.
    pub fn resolve(&self, entity: &Entity) -> Option<ResolvedImage> {
        self.locate(entity).into_iter().find_map(|candidate| {
            match self.decode(&candidate) {
                Ok(pixels) => Some(ResolvedImage {
                    pixels,
                    source: candidate.source,
                    key: candidate.key,
                }),
                Err(e) => {
                    debug!(
                        entity = %entity.id,
                        path = %candidate.path.display(),
                        error = %e,
                        "artwork candidate rejected"
                    );
                    None
                }
            }
        })
    }
}

fn extension_in(path: &Path, set: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            set.iter().any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Still-image extension, never a video.
pub fn is_static_image(path: &Path) -> bool {
    !extension_in(path, VIDEO_EXTENSIONS)
        && extension_in(path, STATIC_EXTENSIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tinct_model::EntityId;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba([180, 40, 40, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn extension_filter() {
        assert!(is_static_image(Path::new("/a/B.PNG")));
        assert!(is_static_image(Path::new("/a/b.jpeg")));
        assert!(!is_static_image(Path::new("/a/b.mp4")));
        assert!(!is_static_image(Path::new("/a/b.MKV")));
        assert!(!is_static_image(Path::new("/a/b.txt")));
        assert!(!is_static_image(Path::new("/a/noext")));
    }

    #[test]
    fn background_preferred_over_cover() {
        let dir = tempfile::tempdir().unwrap();
        let bg = write_png(dir.path(), "bg.png", 80, 80);
        let cover = write_png(dir.path(), "cover.png", 80, 80);
        let entity = Entity::new(EntityId::new(), "Game")
            .with_background(&bg)
            .with_cover(&cover);

        let resolver = ImageResolver::default();
        let candidates = resolver.locate(&entity);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].source, ImageSource::Background);

        let resolved = resolver.resolve(&entity).unwrap();
        assert_eq!(resolved.source, ImageSource::Background);
        assert_eq!(resolved.key, CacheKey::for_file(&bg).unwrap());
    }

    #[test]
    fn small_background_falls_through_to_cover() {
        let dir = tempfile::tempdir().unwrap();
        let bg = write_png(dir.path(), "bg.png", 32, 200);
        let cover = write_png(dir.path(), "cover.png", 64, 64);
        let entity = Entity::new(EntityId::new(), "Game")
            .with_background(&bg)
            .with_cover(&cover);

        let resolved = ImageResolver::default().resolve(&entity).unwrap();
        assert_eq!(resolved.source, ImageSource::Cover);
        assert_eq!(resolved.pixels.dimensions(), (64, 64));
    }

    #[test]
    fn oversize_artwork_is_downscaled() {
        let dir = tempfile::tempdir().unwrap();
        let bg = write_png(dir.path(), "bg.png", 800, 200);
        let entity = Entity::new(EntityId::new(), "Game").with_background(&bg);

        let resolved = ImageResolver::default().resolve(&entity).unwrap();
        let (w, h) = resolved.pixels.dimensions();
        assert!(w <= MAX_DECODE_DIMENSION && h <= MAX_DECODE_DIMENSION);
        assert_eq!(w, 400);
    }

    #[test]
    fn videos_and_missing_files_yield_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("trailer.mp4");
        std::fs::write(&video, b"not really a video").unwrap();
        let entity = Entity::new(EntityId::new(), "Game")
            .with_background(&video)
            .with_cover(dir.path().join("missing.png"));

        let resolver = ImageResolver::default();
        assert!(resolver.locate(&entity).is_empty());
        assert!(resolver.resolve(&entity).is_none());
    }

    #[test]
    fn corrupt_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("bg.png");
        std::fs::write(&broken, b"\x89PNG garbage").unwrap();
        let entity =
            Entity::new(EntityId::new(), "Game").with_background(&broken);

        let resolver = ImageResolver::default();
        assert_eq!(resolver.locate(&entity).len(), 1);
        assert!(resolver.resolve(&entity).is_none());
    }
}
