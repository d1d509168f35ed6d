//! Trickle precache.
//!
//! One background pass over every host entity that fills the palette cache
//! ahead of selection. The pass is opt-in and yields to the user: before each
//! item it waits until theming is enabled, the opt-in switch is on and the
//! host window is active.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tinct_model::Entity;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::PaletteCache;
use crate::config::ThemingConfig;
use crate::host::ThemeHost;
use crate::pipeline::palette_from_pixels;
use crate::resolver::ImageResolver;

/// Runtime opt-in toggle, shared between the engine and the settings UI.
#[derive(Debug, Clone, Default)]
pub struct PrecacheSwitch(Arc<AtomicBool>);

impl PrecacheSwitch {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrecacheReport {
    pub visited: usize,
    pub already_cached: usize,
    pub computed: usize,
    pub no_artwork: usize,
    /// Artwork was found but none of it decoded.
    pub failed: usize,
    /// Shutdown interrupted the pass.
    pub aborted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemResult {
    AlreadyCached,
    Computed,
    /// Decodes were attempted and all failed.
    Failed,
    NoArtwork,
}

#[derive(Debug, Clone, Copy)]
pub struct PrecacheSettings {
    pub batch_size: usize,
    pub item_delay: Duration,
    pub idle_poll: Duration,
}

impl PrecacheSettings {
    pub fn from_config(config: &ThemingConfig) -> Self {
        Self {
            batch_size: config.precache_batch_size,
            item_delay: config.precache_item_delay(),
            idle_poll: config.precache_idle_poll(),
        }
    }
}

pub struct Precacher {
    host: Arc<dyn ThemeHost>,
    cache: Arc<PaletteCache>,
    resolver: ImageResolver,
    switch: PrecacheSwitch,
    settings: PrecacheSettings,
    started: AtomicBool,
}

impl std::fmt::Debug for Precacher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Precacher")
            .field("switch", &self.switch.is_enabled())
            .field("settings", &self.settings)
            .field("started", &self.started.load(Ordering::SeqCst))
            .finish()
    }
}

impl Precacher {
    pub fn new(
        host: Arc<dyn ThemeHost>,
        cache: Arc<PaletteCache>,
        resolver: ImageResolver,
        switch: PrecacheSwitch,
        settings: PrecacheSettings,
    ) -> Self {
        Self {
            host,
            cache,
            resolver,
            switch,
            settings,
            started: AtomicBool::new(false),
        }
    }

    pub fn switch(&self) -> &PrecacheSwitch {
        &self.switch
    }

    /// Spawn the pass. Only the first call starts anything.
    pub fn start(
        self: &Arc<Self>,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<PrecacheReport>> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("precache already started");
            return None;
        }
        let precacher = Arc::clone(self);
        Some(tokio::spawn(async move {
            let report = precacher.run_pass(&shutdown).await;
            info!(
                visited = report.visited,
                computed = report.computed,
                already_cached = report.already_cached,
                no_artwork = report.no_artwork,
                failed = report.failed,
                aborted = report.aborted,
                "precache pass finished"
            );
            report
        }))
    }

    /// Visit each entity once, computing at most `batch_size` new palettes.
    pub async fn run_pass(
        &self,
        shutdown: &CancellationToken,
    ) -> PrecacheReport {
        let mut report = PrecacheReport::default();
        let entities = self.host.entities();
        debug!(entities = entities.len(), "precache pass starting");

        for entity in entities {
            if report.computed >= self.settings.batch_size {
                debug!(
                    batch_size = self.settings.batch_size,
                    "precache batch full"
                );
                break;
            }
            if !self.wait_until_allowed(shutdown).await {
                report.aborted = true;
                break;
            }

            let resolver = self.resolver;
            let cache = Arc::clone(&self.cache);
            let result = tokio::task::spawn_blocking(move || {
                precache_entity(&entity, &resolver, &cache)
            })
            .await;

            report.visited += 1;
            let did_work = match result {
                Ok(ItemResult::AlreadyCached) => {
                    report.already_cached += 1;
                    false
                }
                Ok(ItemResult::NoArtwork) => {
                    report.no_artwork += 1;
                    false
                }
                Ok(ItemResult::Computed) => {
                    report.computed += 1;
                    true
                }
                Ok(ItemResult::Failed) => {
                    report.failed += 1;
                    true
                }
                Err(e) => {
                    warn!(error = %e, "precache item panicked");
                    report.failed += 1;
                    true
                }
            };

            if did_work {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        report.aborted = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.settings.item_delay) => {}
                }
            }
        }
        report
    }

    fn allowed(&self) -> bool {
        self.switch.is_enabled()
            && self.host.theming_enabled()
            && self.host.is_active()
    }

    /// False when shutdown fired while waiting.
    async fn wait_until_allowed(&self, shutdown: &CancellationToken) -> bool {
        loop {
            if shutdown.is_cancelled() {
                return false;
            }
            if self.allowed() {
                return true;
            }
            tokio::select! {
                _ = shutdown.cancelled() => return false,
                _ = tokio::time::sleep(self.settings.idle_poll) => {}
            }
        }
    }
}

/// Mirrors the reactor's candidate order: the first candidate that is cached
/// or decodes wins.
fn precache_entity(
    entity: &Entity,
    resolver: &ImageResolver,
    cache: &Arc<PaletteCache>,
) -> ItemResult {
    let candidates = resolver.locate(entity);
    if candidates.is_empty() {
        return ItemResult::NoArtwork;
    }

    for candidate in &candidates {
        if cache.contains(&candidate.key) {
            return ItemResult::AlreadyCached;
        }
        match resolver.decode(candidate) {
            Ok(pixels) => {
                cache.put(candidate.key.clone(), palette_from_pixels(&pixels));
                if let Err(e) = cache.flush() {
                    warn!(error = %e, "precache flush failed");
                }
                return ItemResult::Computed;
            }
            Err(e) => {
                debug!(
                    entity = %entity.id,
                    path = %candidate.path.display(),
                    error = %e,
                    "precache candidate rejected"
                );
            }
        }
    }
    ItemResult::Failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_is_shared_between_clones() {
        let switch = PrecacheSwitch::new(false);
        let other = switch.clone();
        other.set(true);
        assert!(switch.is_enabled());
    }
}
