#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use tinct_core::{ThemeHost, ThemingConfig};
use tinct_model::{Entity, EntityId};

#[derive(Debug)]
struct HostState {
    enabled: bool,
    active: bool,
    selected: Option<Entity>,
    entities: Vec<Entity>,
}

/// Host whose answers tests flip at will.
#[derive(Debug, Clone)]
pub struct FakeHost(Arc<Mutex<HostState>>);

impl FakeHost {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self(Arc::new(Mutex::new(HostState {
            enabled: true,
            active: true,
            selected: None,
            entities,
        })))
    }

    pub fn select(&self, entity: Option<Entity>) {
        self.0.lock().selected = entity;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.0.lock().enabled = enabled;
    }

    pub fn set_active(&self, active: bool) {
        self.0.lock().active = active;
    }
}

impl ThemeHost for FakeHost {
    fn theming_enabled(&self) -> bool {
        self.0.lock().enabled
    }

    fn is_active(&self) -> bool {
        self.0.lock().active
    }

    fn selected(&self) -> Option<Entity> {
        self.0.lock().selected.clone()
    }

    fn entities(&self) -> Vec<Entity> {
        self.0.lock().entities.clone()
    }
}

/// Solid-color PNG large enough to pass the dimension check.
pub fn write_solid_png(dir: &Path, name: &str, rgb: [u8; 3]) -> PathBuf {
    write_sized_png(dir, name, rgb, 96)
}

/// Square solid-color PNG of `side` pixels. Large sides make decoding slow
/// enough to observe the reactor mid-computation.
pub fn write_sized_png(
    dir: &Path,
    name: &str,
    rgb: [u8; 3],
    side: u32,
) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(side, side, Rgba([rgb[0], rgb[1], rgb[2], 255]))
        .save(&path)
        .expect("write fixture png");
    path
}

pub fn entity_with_background(name: &str, background: PathBuf) -> Entity {
    Entity::new(EntityId::new(), name).with_background(background)
}

/// Fast timings so flows finish within a few hundred milliseconds.
pub fn fast_config(cache_file: PathBuf) -> ThemingConfig {
    ThemingConfig {
        poll_interval_ms: 10,
        debounce_ms: 30,
        transition_duration_ms: 20,
        transition_steps: 4,
        disk_save_debounce_ms: 50,
        precache_item_delay_ms: 1,
        precache_idle_poll_ms: 10,
        cache_file: Some(cache_file),
        ..ThemingConfig::default()
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_until(
    timeout: Duration,
    mut condition: impl FnMut() -> bool,
) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
