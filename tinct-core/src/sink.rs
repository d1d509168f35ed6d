//! Outbound seam to the host's theme resource table.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use parking_lot::RwLock;
use tinct_model::{
    Brush, BrushKey, Palette, PaletteField, ResourceKey, ResourceValue, Rgb,
};

pub type ResourceBatch = Vec<(ResourceKey, ResourceValue)>;

/// Writes theme resources into the host.
///
/// The engine only touches keys from [`ResourceKey::all`]. Implementations
/// own any marshaling onto the host's UI thread.
pub trait ThemeSink: Send + Sync + 'static {
    fn get(&self, key: ResourceKey) -> Option<ResourceValue>;
    fn set_color(&self, key: ResourceKey, color: Rgb);
    fn set_brush(&self, key: ResourceKey, brush: Brush);
    fn remove(&self, key: ResourceKey);

    /// Publish one frame. Hosts that can swap a whole dictionary at once
    /// should override this.
    fn apply(&self, batch: ResourceBatch) {
        for (key, value) in batch {
            match value {
                ResourceValue::Color(color) => self.set_color(key, color),
                ResourceValue::Brush(brush) => self.set_brush(key, brush),
            }
        }
    }
}

fn brush_for(palette: &Palette, brush: BrushKey) -> Brush {
    use PaletteField::*;

    let stops = |fields: &[PaletteField]| {
        Brush::vertical(
            &fields.iter().map(|f| palette.get(*f)).collect::<Vec<_>>(),
        )
    };
    match brush {
        BrushKey::Overlay => stops(&[OverlayTop, OverlayMid, OverlayBot]),
        BrushKey::Focus => stops(&[FocusStart, FocusMid, FocusEnd]),
        BrushKey::MenuBorder => stops(&[MenuBorderStart, MenuBorderEnd]),
        BrushKey::NoFocus => stops(&[NoFocusStart, NoFocusEnd]),
        BrushKey::ButtonPlay => stops(&[Accent, ButtonPlayMid, ButtonPlayEnd]),
        BrushKey::Shade => stops(&[ShadeMid, ShadeEnd]),
        BrushKey::Glow => stops(&[Glow, GlowMid, GlowEnd]),
        BrushKey::ControlBackground => {
            Brush::Solid(palette.get(ControlBackground))
        }
        BrushKey::Success => Brush::Solid(palette.get(SuccessStart)),
    }
}

/// Every color and brush resource for one palette, in [`ResourceKey::all`]
/// order.
pub fn palette_resources(palette: &Palette) -> ResourceBatch {
    ResourceKey::all()
        .map(|key| {
            let value = match key {
                ResourceKey::Color(field) => {
                    ResourceValue::Color(palette.get(field))
                }
                ResourceKey::Brush(brush) => {
                    ResourceValue::Brush(brush_for(palette, brush))
                }
            };
            (key, value)
        })
        .collect()
}

/// Read the palette currently shown by the host. Fields the host does not
/// hold as a color come from `fallback`.
pub fn capture_palette(sink: &dyn ThemeSink, fallback: &Palette) -> Palette {
    Palette::from_fn(|field| {
        sink.get(ResourceKey::Color(field))
            .and_then(|value| value.as_color())
            .unwrap_or_else(|| fallback.get(field))
    })
}

/// The host's values for every engine key, including which were absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: Vec<(ResourceKey, Option<ResourceValue>)>,
}

impl Snapshot {
    pub fn capture(sink: &dyn ThemeSink) -> Self {
        Self {
            values: ResourceKey::all()
                .map(|key| (key, sink.get(key)))
                .collect(),
        }
    }

    /// Put every key back exactly as captured; keys that were absent are
    /// removed.
    pub fn restore(&self, sink: &dyn ThemeSink) {
        for (key, value) in &self.values {
            match value {
                Some(ResourceValue::Color(color)) => {
                    sink.set_color(*key, *color)
                }
                Some(ResourceValue::Brush(brush)) => {
                    sink.set_brush(*key, brush.clone())
                }
                None => sink.remove(*key),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resource table held in memory. Useful for headless hosts and tests.
#[derive(Debug, Default)]
pub struct InMemorySink {
    table: RwLock<HashMap<ResourceKey, ResourceValue>>,
    applies: AtomicUsize,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`ThemeSink::apply`] calls, i.e. published frames.
    pub fn apply_count(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    pub fn color(&self, field: PaletteField) -> Option<Rgb> {
        self.get(ResourceKey::Color(field))
            .and_then(|value| value.as_color())
    }

    /// The palette currently held, if every color key is present.
    pub fn palette(&self) -> Option<Palette> {
        let table = self.table.read();
        let mut colors = Vec::with_capacity(PaletteField::COUNT);
        for field in PaletteField::ALL {
            colors.push(table.get(&ResourceKey::Color(field))?.as_color()?);
        }
        Some(Palette::from_fn(|field| colors[field.index()]))
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

impl ThemeSink for InMemorySink {
    fn get(&self, key: ResourceKey) -> Option<ResourceValue> {
        self.table.read().get(&key).cloned()
    }

    fn set_color(&self, key: ResourceKey, color: Rgb) {
        self.table.write().insert(key, ResourceValue::Color(color));
    }

    fn set_brush(&self, key: ResourceKey, brush: Brush) {
        self.table.write().insert(key, ResourceValue::Brush(brush));
    }

    fn remove(&self, key: ResourceKey) {
        self.table.write().remove(&key);
    }

    fn apply(&self, batch: ResourceBatch) {
        {
            let mut table = self.table.write();
            for (key, value) in batch {
                table.insert(key, value);
            }
        }
        self.applies.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::synthesize;

    #[test]
    fn batch_covers_the_whole_key_set() {
        let palette = synthesize(Rgb::new(200, 60, 60));
        let batch = palette_resources(&palette);
        assert_eq!(batch.len(), ResourceKey::COUNT);

        let overlay = batch
            .iter()
            .find(|(key, _)| *key == ResourceKey::Brush(BrushKey::Overlay))
            .map(|(_, value)| value.clone())
            .unwrap();
        let ResourceValue::Brush(Brush::LinearGradient(stops)) = overlay else {
            panic!("overlay should be a gradient");
        };
        assert_eq!(stops.len(), 3);
        assert_eq!(stops[1].color, palette.get(PaletteField::OverlayMid));
    }

    #[test]
    fn apply_then_read_back_palette() {
        let sink = InMemorySink::new();
        let palette = synthesize(Rgb::new(30, 140, 90));
        sink.apply(palette_resources(&palette));

        assert_eq!(sink.apply_count(), 1);
        assert_eq!(sink.palette(), Some(palette));
        let fallback = Palette::uniform(Rgb::BLACK);
        assert_eq!(capture_palette(&sink, &fallback), palette);
    }

    #[test]
    fn capture_falls_back_per_field() {
        let sink = InMemorySink::new();
        sink.set_color(PaletteField::Accent.into(), Rgb::new(1, 2, 3));

        let fallback = Palette::uniform(Rgb::gray(9));
        let captured = capture_palette(&sink, &fallback);
        assert_eq!(captured.accent(), Rgb::new(1, 2, 3));
        assert_eq!(captured.get(PaletteField::Glow), Rgb::gray(9));
    }

    #[test]
    fn snapshot_restores_exactly_including_absent_keys() {
        let sink = InMemorySink::new();
        sink.set_color(PaletteField::Accent.into(), Rgb::new(10, 20, 30));
        sink.set_brush(
            BrushKey::Shade.into(),
            Brush::Solid(Rgb::new(5, 5, 5)),
        );
        let snapshot = Snapshot::capture(&sink);
        assert_eq!(snapshot.len(), ResourceKey::COUNT);

        sink.apply(palette_resources(&synthesize(Rgb::new(200, 60, 60))));
        assert_eq!(sink.len(), ResourceKey::COUNT);

        snapshot.restore(&sink);
        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.color(PaletteField::Accent),
            Some(Rgb::new(10, 20, 30))
        );
        assert_eq!(
            sink.get(BrushKey::Shade.into()),
            Some(ResourceValue::Brush(Brush::Solid(Rgb::new(5, 5, 5))))
        );
        assert_eq!(Snapshot::capture(&sink), snapshot);
    }
}
