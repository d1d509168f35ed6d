//! Two-tier palette cache.
//!
//! The RAM tier is a bounded map that is reset wholesale when it fills up.
//! The disk tier is an in-memory index mirrored to a single JSON file; writes
//! are coalesced behind a restartable debounce timer and can be forced with
//! [`PaletteCache::flush`]. Each tier has its own lock.

pub mod disk;
pub mod key;
pub mod stats;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use parking_lot::{Mutex, RwLock};
use tinct_model::Palette;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ThemingConfig;
use crate::error::{Result, ThemeError};

pub use key::CacheKey;
pub use stats::PaletteCacheStatsSnapshot;

use disk::{encode_index, load_index_file, write_atomic};
use stats::PaletteCacheStats;

#[derive(Debug, Default)]
struct DiskIndex {
    entries: HashMap<CacheKey, Palette>,
    dirty: bool,
    /// Bumped by `clear`; a save armed under an older generation is void.
    generation: u64,
}

#[derive(Debug)]
pub struct PaletteCache {
    path: PathBuf,
    ram: RwLock<HashMap<CacheKey, Palette>>,
    ram_capacity: usize,
    disk: Mutex<DiskIndex>,
    save_debounce: Duration,
    pending_save: Mutex<Option<CancellationToken>>,
    stats: PaletteCacheStats,
}

impl PaletteCache {
    /// Open the cache file at `path`, loading whatever layout it holds.
    /// Legacy layouts are rewritten in the current format right away.
    pub fn open(
        path: impl Into<PathBuf>,
        ram_capacity: usize,
        save_debounce: Duration,
    ) -> Self {
        let path = path.into();
        let loaded = load_index_file(&path);
        let cache = Self {
            path,
            ram: RwLock::new(HashMap::new()),
            ram_capacity: ram_capacity.max(1),
            disk: Mutex::new(DiskIndex {
                entries: loaded.entries,
                dirty: loaded.migrated,
                generation: 0,
            }),
            save_debounce,
            pending_save: Mutex::new(None),
            stats: PaletteCacheStats::default(),
        };

        if loaded.migrated {
            info!(path = %cache.path.display(), "migrating palette cache");
            if let Err(e) = cache.flush() {
                warn!(error = %e, "palette cache migration write failed");
            }
        }
        cache
    }

    pub fn from_config(config: &ThemingConfig) -> Result<Self> {
        Ok(Self::open(
            config.cache_path()?,
            config.ram_capacity,
            config.disk_save_debounce(),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// RAM first, then disk. Disk hits are promoted into RAM.
    pub fn get(&self, key: &CacheKey) -> Option<Palette> {
        if let Some(palette) = self.ram.read().get(key).copied() {
            self.stats.on_ram_hit();
            return Some(palette);
        }

        let from_disk = self.disk.lock().entries.get(key).copied();
        match from_disk {
            Some(palette) => {
                self.stats.on_disk_hit();
                self.insert_ram(key.clone(), palette);
                Some(palette)
            }
            None => {
                self.stats.on_miss();
                None
            }
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.ram.read().contains_key(key)
            || self.disk.lock().entries.contains_key(key)
    }

    /// Store in both tiers and (re)arm the debounced disk write.
    pub fn put(self: &Arc<Self>, key: CacheKey, palette: Palette) {
        self.insert_ram(key.clone(), palette);
        {
            let mut disk = self.disk.lock();
            disk.entries.insert(key, palette);
            disk.dirty = true;
        }
        self.schedule_save();
    }

    /// Cancel any pending debounced write and persist now if anything changed.
    pub fn flush(&self) -> Result<()> {
        self.cancel_pending_save();
        let mut disk = self.disk.lock();
        self.write_locked(&mut disk)
    }

    /// Drop every disk entry and delete the file; optionally empty RAM too.
    /// A save armed before this call never recreates the file.
    pub fn clear(&self, also_ram: bool) -> Result<()> {
        self.cancel_pending_save();
        {
            let mut disk = self.disk.lock();
            disk.generation = disk.generation.wrapping_add(1);
            disk.entries.clear();
            disk.dirty = false;
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(ThemeError::CacheWrite(e)),
            }
        }
        if also_ram {
            self.ram.write().clear();
        }
        info!(also_ram, "palette cache cleared");
        Ok(())
    }

    pub fn stats(&self) -> PaletteCacheStatsSnapshot {
        let ram_entries = self.ram.read().len();
        let disk_entries = self.disk.lock().entries.len();
        self.stats.snapshot(ram_entries, disk_entries)
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save.lock().is_some()
    }

    fn insert_ram(&self, key: CacheKey, palette: Palette) {
        let mut ram = self.ram.write();
        if ram.len() >= self.ram_capacity && !ram.contains_key(&key) {
            debug!(
                capacity = self.ram_capacity,
                "palette RAM tier full; resetting"
            );
            ram.clear();
            self.stats.on_ram_reset();
        }
        ram.insert(key, palette);
    }

    fn schedule_save(self: &Arc<Self>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            if let Err(e) = self.flush() {
                warn!(error = %e, "palette cache write failed");
            }
            return;
        };

        let token = CancellationToken::new();
        let generation = {
            let mut pending = self.pending_save.lock();
            if let Some(previous) = pending.replace(token.clone()) {
                previous.cancel();
            }
            self.disk.lock().generation
        };

        let cache = Arc::clone(self);
        let delay = self.save_debounce;
        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    cache.save_if_current(generation, &token);
                }
            }
        });
    }

    fn save_if_current(&self, generation: u64, token: &CancellationToken) {
        {
            // A re-arm cancels this token before replacing it, so an
            // uncancelled token is still the pending one.
            let mut pending = self.pending_save.lock();
            if token.is_cancelled() {
                return;
            }
            *pending = None;
        }

        let mut disk = self.disk.lock();
        if disk.generation != generation {
            debug!("discarding palette save armed before clear");
            return;
        }
        if let Err(e) = self.write_locked(&mut disk) {
            warn!(error = %e, "debounced palette cache write failed");
        }
    }

    fn write_locked(&self, disk: &mut DiskIndex) -> Result<()> {
        if !disk.dirty {
            return Ok(());
        }
        let bytes = encode_index(&disk.entries)?;
        match write_atomic(&self.path, &bytes) {
            Ok(()) => {
                disk.dirty = false;
                self.stats.on_disk_write_ok();
                debug!(
                    path = %self.path.display(),
                    entries = disk.entries.len(),
                    "palette cache written"
                );
                Ok(())
            }
            Err(e) => {
                self.stats.on_disk_write_err();
                Err(ThemeError::CacheWrite(e))
            }
        }
    }

    fn cancel_pending_save(&self) {
        if let Some(token) = self.pending_save.lock().take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinct_model::Rgb;

    use crate::color::synthesize;

    fn key(n: u32) -> CacheKey {
        CacheKey::new(format!("/art/{n}.png|{n}|{n}"))
    }

    fn open_in(dir: &Path, ram_capacity: usize) -> Arc<PaletteCache> {
        Arc::new(PaletteCache::open(
            dir.join("colors.json"),
            ram_capacity,
            Duration::from_secs(45),
        ))
    }

    #[test]
    fn put_then_get_hits_ram() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), 8);
        let palette = synthesize(Rgb::new(200, 60, 60));

        cache.put(key(1), palette);
        assert_eq!(cache.get(&key(1)), Some(palette));
        assert!(cache.contains(&key(1)));
        assert_eq!(cache.get(&key(2)), None);

        let stats = cache.stats();
        assert_eq!(stats.ram_hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn ram_overflow_resets_ram_but_disk_still_serves() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), 2);
        for n in 0..3 {
            cache.put(key(n), synthesize(Rgb::new(n as u8 * 40, 90, 160)));
        }

        let stats = cache.stats();
        assert_eq!(stats.ram_entries, 1);
        assert_eq!(stats.disk_entries, 3);
        assert_eq!(stats.ram_resets, 1);

        assert!(cache.get(&key(0)).is_some());
        assert_eq!(cache.stats().disk_hits, 1);
    }

    #[test]
    fn without_runtime_put_writes_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), 8);
        cache.put(key(7), synthesize(Rgb::new(10, 200, 90)));

        assert!(cache.path().exists());
        assert!(!cache.has_pending_save());
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_save_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), 8);

        cache.put(key(1), synthesize(Rgb::new(200, 60, 60)));
        tokio::time::sleep(Duration::from_secs(30)).await;
        cache.put(key(2), synthesize(Rgb::new(60, 60, 200)));
        tokio::time::sleep(Duration::from_secs(30)).await;
        // 60s after the first put, but only 30s after the second.
        assert!(!cache.path().exists());

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(cache.path().exists());
        assert!(!cache.has_pending_save());
        assert_eq!(cache.stats().disk_writes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_while_save_armed_never_recreates_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), 8);

        cache.put(key(1), synthesize(Rgb::new(200, 60, 60)));
        cache.flush().unwrap();
        cache.put(key(2), synthesize(Rgb::new(60, 60, 200)));
        assert!(cache.has_pending_save());

        cache.clear(true).unwrap();
        assert!(!cache.path().exists());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!cache.path().exists());
        assert!(!cache.contains(&key(1)));
        assert!(!cache.contains(&key(2)));
    }

    #[test]
    fn clear_keeping_ram_still_serves_from_ram() {
        let dir = tempfile::tempdir().unwrap();
        let cache = open_in(dir.path(), 8);
        let palette = synthesize(Rgb::new(200, 60, 60));
        cache.put(key(1), palette);

        cache.clear(false).unwrap();
        assert_eq!(cache.get(&key(1)), Some(palette));
        assert_eq!(cache.stats().disk_entries, 0);
    }
}
