//! On-disk palette index.
//!
//! The file is a single JSON object mapping cache keys to palettes. Two older
//! layouts stored only the accent, first as `#RRGGBB` strings and later as
//! `[r, g, b]` arrays; both are still readable and are resynthesized into full
//! palettes on load.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use tinct_model::{Palette, PaletteField, Rgb};
use tracing::{debug, warn};

use crate::cache::key::CacheKey;
use crate::color::synthesize;
use crate::error::{Result, ThemeError};

/// Serialized palette: every field as a six digit hex string under its
/// PascalCase name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Rgb>",
    into = "BTreeMap<String, Rgb>"
)]
pub struct PaletteDto(pub Palette);

impl TryFrom<BTreeMap<String, Rgb>> for PaletteDto {
    type Error = String;

    fn try_from(
        mut raw: BTreeMap<String, Rgb>,
    ) -> std::result::Result<Self, Self::Error> {
        let mut colors = [Rgb::BLACK; PaletteField::COUNT];
        for field in PaletteField::ALL {
            colors[field.index()] = raw
                .remove(field.name())
                .ok_or_else(|| format!("missing palette field {field}"))?;
        }
        if let Some(extra) = raw.keys().next() {
            return Err(format!("unknown palette field {extra}"));
        }
        Ok(Self(Palette::from_fn(|field| colors[field.index()])))
    }
}

impl From<PaletteDto> for BTreeMap<String, Rgb> {
    fn from(dto: PaletteDto) -> Self {
        dto.0
            .iter()
            .map(|(field, color)| (field.name().to_string(), color))
            .collect()
    }
}

/// Every layout the cache file has used. Variants are tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CacheFileFormat {
    Current(BTreeMap<String, PaletteDto>),
    AccentArrays(BTreeMap<String, [u8; 3]>),
    AccentHex(BTreeMap<String, String>),
}

#[derive(Debug, Default)]
pub(crate) struct LoadedIndex {
    pub entries: HashMap<CacheKey, Palette>,
    /// The file used a legacy layout and should be rewritten.
    pub migrated: bool,
}

pub(crate) fn load_index_file(path: &Path) -> LoadedIndex {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return LoadedIndex::default();
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "palette cache unreadable"
            );
            return LoadedIndex::default();
        }
    };

    match decode_index(&bytes) {
        Ok(loaded) => {
            debug!(
                path = %path.display(),
                entries = loaded.entries.len(),
                migrated = loaded.migrated,
                "palette cache loaded"
            );
            loaded
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "palette cache unparseable; starting empty"
            );
            LoadedIndex::default()
        }
    }
}

pub(crate) fn decode_index(bytes: &[u8]) -> Result<LoadedIndex> {
    let parsed: CacheFileFormat = serde_json::from_slice(bytes)
        .map_err(|e| ThemeError::CacheRead(e.to_string()))?;

    let loaded = match parsed {
        CacheFileFormat::Current(entries) => LoadedIndex {
            entries: entries
                .into_iter()
                .map(|(key, dto)| (CacheKey::new(key), dto.0))
                .collect(),
            migrated: false,
        },
        CacheFileFormat::AccentArrays(entries) => LoadedIndex {
            entries: entries
                .into_iter()
                .map(|(key, rgb)| {
                    (CacheKey::new(key), synthesize(Rgb::from_channels(rgb)))
                })
                .collect(),
            migrated: true,
        },
        CacheFileFormat::AccentHex(entries) => {
            let mut out = HashMap::with_capacity(entries.len());
            for (key, hex) in entries {
                match Rgb::from_hex(&hex) {
                    Ok(accent) => {
                        out.insert(CacheKey::new(key), synthesize(accent));
                    }
                    Err(e) => {
                        debug!(key = %key, error = %e, "dropping legacy entry");
                    }
                }
            }
            LoadedIndex {
                entries: out,
                migrated: true,
            }
        }
    };
    Ok(loaded)
}

/// Serialize with sorted keys so identical contents produce identical files.
pub(crate) fn encode_index(
    entries: &HashMap<CacheKey, Palette>,
) -> Result<Vec<u8>> {
    let sorted: BTreeMap<&str, PaletteDto> = entries
        .iter()
        .map(|(key, palette)| (key.as_str(), PaletteDto(*palette)))
        .collect();
    Ok(serde_json::to_vec_pretty(&sorted)?)
}

/// Write to a sibling temp file, then replace the target.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|v| v.to_str()).unwrap_or("palettes"),
        nanos
    ));
    std::fs::write(&tmp_path, bytes)?;
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
    }
    std::fs::rename(tmp_path, path)
}
