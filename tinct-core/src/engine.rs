//! Wires the cache, resolver, animator, reactor and precache task together.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::animator::{TransitionAnimator, TransitionSettings};
use crate::cache::{PaletteCache, PaletteCacheStatsSnapshot};
use crate::config::ThemingConfig;
use crate::error::Result;
use crate::host::ThemeHost;
use crate::precache::{PrecacheSettings, PrecacheSwitch, Precacher};
use crate::reactor::{ReactorState, SelectionReactor};
use crate::resolver::ImageResolver;
use crate::sink::ThemeSink;

/// Background tasks spawned by [`DynamicThemeEngine::start`].
#[derive(Debug, Default)]
pub struct EngineHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task to finish. Only returns after shutdown.
    pub async fn join(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "theme engine task ended abnormally");
            }
        }
    }
}

#[derive(Debug)]
pub struct DynamicThemeEngine {
    config: ThemingConfig,
    cache: Arc<PaletteCache>,
    animator: Arc<TransitionAnimator>,
    reactor: Arc<SelectionReactor>,
    precacher: Arc<Precacher>,
    shutdown: CancellationToken,
    started: AtomicBool,
}

impl DynamicThemeEngine {
    /// Validate `config` and open the palette cache. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(
        config: ThemingConfig,
        host: Arc<dyn ThemeHost>,
        sink: Arc<dyn ThemeSink>,
    ) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(PaletteCache::from_config(&config)?);
        let resolver = ImageResolver::from_config(&config);
        let animator = Arc::new(TransitionAnimator::new(
            Arc::clone(&sink),
            TransitionSettings::from_config(&config),
        ));
        let reactor = Arc::new(SelectionReactor::new(
            Arc::clone(&host),
            sink,
            Arc::clone(&animator),
            Arc::clone(&cache),
            resolver,
            config.debounce(),
            config.poll_interval(),
        ));
        let precacher = Arc::new(Precacher::new(
            host,
            Arc::clone(&cache),
            resolver,
            PrecacheSwitch::new(config.precache_opt_in),
            PrecacheSettings::from_config(&config),
        ));

        Ok(Self {
            config,
            cache,
            animator,
            reactor,
            precacher,
            shutdown: CancellationToken::new(),
            started: AtomicBool::new(false),
        })
    }

    /// Spawn the selection poller and the precache pass. Must be called
    /// inside a Tokio runtime; later calls return an empty handle.
    pub fn start(&self) -> EngineHandle {
        if self.started.swap(true, Ordering::SeqCst) {
            return EngineHandle::default();
        }

        let mut tasks = Vec::with_capacity(2);
        tasks.push(tokio::spawn(
            Arc::clone(&self.reactor).run(self.shutdown.child_token()),
        ));
        let precache = self.precacher.start(self.shutdown.child_token());
        if let Some(precache) = precache {
            tasks.push(tokio::spawn(async move {
                if let Err(e) = precache.await {
                    warn!(error = %e, "precache pass ended abnormally");
                }
            }));
        }
        info!(
            cache = %self.cache.path().display(),
            precache_opt_in = self.precacher.switch().is_enabled(),
            "dynamic theme engine started"
        );
        EngineHandle { tasks }
    }

    /// Stop all background work and persist pending cache writes.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.reactor.suspend();
        self.animator.cancel();
        if let Err(e) = self.cache.flush() {
            warn!(error = %e, "palette cache flush at shutdown failed");
        }
        info!("dynamic theme engine stopped");
    }

    /// Forget every cached palette on disk, and in RAM when `also_ram`.
    pub fn clear_cache(&self, also_ram: bool) -> Result<()> {
        self.cache.clear(also_ram)
    }

    pub fn precache_switch(&self) -> PrecacheSwitch {
        self.precacher.switch().clone()
    }

    pub fn cache(&self) -> &Arc<PaletteCache> {
        &self.cache
    }

    pub fn cache_stats(&self) -> PaletteCacheStatsSnapshot {
        self.cache.stats()
    }

    pub fn reactor(&self) -> &Arc<SelectionReactor> {
        &self.reactor
    }

    pub fn reactor_state(&self) -> ReactorState {
        self.reactor.state()
    }

    pub fn config(&self) -> &ThemingConfig {
        &self.config
    }
}
