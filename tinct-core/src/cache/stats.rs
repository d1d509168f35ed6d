use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaletteCacheStatsSnapshot {
    pub ram_entries: usize,
    pub disk_entries: usize,
    pub ram_hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
    pub ram_resets: u64,
    pub disk_writes: u64,
    pub disk_write_errors: u64,
}

#[derive(Debug, Default)]
pub(crate) struct PaletteCacheStats {
    ram_hits: AtomicU64,
    disk_hits: AtomicU64,
    misses: AtomicU64,
    ram_resets: AtomicU64,
    disk_writes: AtomicU64,
    disk_write_errors: AtomicU64,
}

impl PaletteCacheStats {
    pub fn on_ram_hit(&self) {
        self.ram_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_disk_hit(&self) {
        self.disk_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_ram_reset(&self) {
        self.ram_resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_disk_write_ok(&self) {
        self.disk_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_disk_write_err(&self) {
        self.disk_write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(
        &self,
        ram_entries: usize,
        disk_entries: usize,
    ) -> PaletteCacheStatsSnapshot {
        PaletteCacheStatsSnapshot {
            ram_entries,
            disk_entries,
            ram_hits: self.ram_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ram_resets: self.ram_resets.load(Ordering::Relaxed),
            disk_writes: self.disk_writes.load(Ordering::Relaxed),
            disk_write_errors: self
                .disk_write_errors
                .load(Ordering::Relaxed),
        }
    }
}
