//! Selection reactor.
//!
//! Polls the host, debounces selection changes and drives the
//! cache/compute/animate pipeline for the entity that stays selected. All
//! cancellation tokens, the processed/pending ids and the activation snapshot
//! live here.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tinct_model::EntityId;
use tokio::runtime::Handle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::animator::TransitionAnimator;
use crate::cache::PaletteCache;
use crate::host::ThemeHost;
use crate::pipeline::palette_for_entity;
use crate::resolver::ImageResolver;
use crate::sink::{Snapshot, ThemeSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactorState {
    /// Theming disabled; the host's own resources are in place.
    Inactive,
    Idle,
    Debouncing,
    Computing,
    Animating,
}

/// What a single [`SelectionReactor::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another tick was still running.
    Busy,
    /// Theming is off; nothing to do.
    Disabled,
    /// Theming was just turned off and the snapshot restored.
    Deactivated,
    /// Host lost focus or was minimized.
    Unfocused,
    NoSelection,
    /// Called outside a Tokio runtime; nothing was done.
    NoRuntime,
    /// Selection already processed or already pending.
    Unchanged,
    /// A new selection started its debounce.
    Debouncing(EntityId),
}

#[derive(Debug)]
struct ReactorInner {
    state: ReactorState,
    snapshot: Option<Snapshot>,
    last_processed: Option<EntityId>,
    pending: Option<EntityId>,
    debounce: Option<CancellationToken>,
}

impl Default for ReactorInner {
    fn default() -> Self {
        Self {
            state: ReactorState::Inactive,
            snapshot: None,
            last_processed: None,
            pending: None,
            debounce: None,
        }
    }
}

impl ReactorInner {
    fn cancel_debounce(&mut self) {
        if let Some(token) = self.debounce.take() {
            token.cancel();
        }
        self.pending = None;
    }
}

pub struct SelectionReactor {
    host: Arc<dyn ThemeHost>,
    sink: Arc<dyn ThemeSink>,
    animator: Arc<TransitionAnimator>,
    cache: Arc<PaletteCache>,
    resolver: ImageResolver,
    debounce: Duration,
    poll_interval: Duration,
    gate: tokio::sync::Mutex<()>,
    inner: Mutex<ReactorInner>,
}

impl std::fmt::Debug for SelectionReactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionReactor")
            .field("debounce", &self.debounce)
            .field("poll_interval", &self.poll_interval)
            .field("inner", &*self.inner.lock())
            .finish()
    }
}

impl SelectionReactor {
    pub fn new(
        host: Arc<dyn ThemeHost>,
        sink: Arc<dyn ThemeSink>,
        animator: Arc<TransitionAnimator>,
        cache: Arc<PaletteCache>,
        resolver: ImageResolver,
        debounce: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            host,
            sink,
            animator,
            cache,
            resolver,
            debounce,
            poll_interval,
            gate: tokio::sync::Mutex::new(()),
            inner: Mutex::new(ReactorInner::default()),
        }
    }

    pub fn state(&self) -> ReactorState {
        self.inner.lock().state
    }

    pub fn last_processed(&self) -> Option<EntityId> {
        self.inner.lock().last_processed
    }

    /// Poll the host once. Overlapping calls are dropped rather than queued.
    pub fn tick(self: &Arc<Self>) -> TickOutcome {
        let Ok(runtime) = Handle::try_current() else {
            warn!("reactor tick outside a Tokio runtime; ignored");
            return TickOutcome::NoRuntime;
        };
        let Ok(_gate) = self.gate.try_lock() else {
            trace!("reactor tick dropped; previous tick still running");
            return TickOutcome::Busy;
        };

        if !self.host.theming_enabled() {
            return if self.deactivate() {
                TickOutcome::Deactivated
            } else {
                TickOutcome::Disabled
            };
        }
        self.activate();

        if !self.host.is_active() {
            self.suspend();
            return TickOutcome::Unfocused;
        }

        let Some(entity) = self.host.selected() else {
            return TickOutcome::NoSelection;
        };

        let token = {
            let mut inner = self.inner.lock();
            if inner.last_processed == Some(entity.id)
                || inner.pending == Some(entity.id)
            {
                return TickOutcome::Unchanged;
            }
            // Whatever was pending or computing is superseded, so the
            // previous selection must be re-evaluated if it comes back.
            inner.cancel_debounce();
            inner.last_processed = None;
            let token = CancellationToken::new();
            inner.debounce = Some(token.clone());
            inner.pending = Some(entity.id);
            inner.state = ReactorState::Debouncing;
            token
        };

        trace!(entity = %entity.id, "selection changed; debouncing");
        let reactor = Arc::clone(self);
        let id = entity.id;
        runtime.spawn(async move { reactor.process(id, token).await });
        TickOutcome::Debouncing(id)
    }

    /// Tick every poll interval until `shutdown` fires.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            poll_interval = ?self.poll_interval,
            "selection reactor started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("selection reactor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let reactor = Arc::clone(&self);
                    tokio::spawn(async move {
                        reactor.tick();
                    });
                }
            }
        }
        self.suspend();
    }

    /// Cancel debounce and animation without touching the resources.
    pub fn suspend(&self) {
        let mut inner = self.inner.lock();
        let busy = inner.debounce.is_some() || inner.last_processed.is_some();
        inner.cancel_debounce();
        inner.last_processed = None;
        self.animator.cancel();
        if inner.state != ReactorState::Inactive {
            inner.state = ReactorState::Idle;
        }
        if busy {
            debug!("reactor suspended");
        }
    }

    fn activate(&self) {
        let mut inner = self.inner.lock();
        if inner.state != ReactorState::Inactive {
            return;
        }
        inner.snapshot = Some(Snapshot::capture(self.sink.as_ref()));
        inner.state = ReactorState::Idle;
        info!("dynamic theming activated");
    }

    /// Returns whether anything was restored.
    fn deactivate(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state == ReactorState::Inactive {
            return false;
        }
        inner.cancel_debounce();
        self.animator.cancel();
        if let Some(snapshot) = inner.snapshot.take() {
            snapshot.restore(self.sink.as_ref());
        }
        inner.last_processed = None;
        inner.state = ReactorState::Inactive;
        info!("dynamic theming deactivated; host resources restored");
        true
    }

    async fn process(self: Arc<Self>, id: EntityId, token: CancellationToken) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(self.debounce) => {}
        }

        let still_wanted = self.host.theming_enabled() && self.host.is_active();
        let selected = self.host.selected().filter(|e| e.id == id);
        let entity = {
            let mut inner = self.inner.lock();
            if token.is_cancelled() {
                return;
            }
            inner.pending = None;
            let Some(entity) = selected.filter(|_| still_wanted) else {
                inner.debounce = None;
                inner.state = ReactorState::Idle;
                trace!(entity = %id, "selection invalid after debounce");
                return;
            };
            // The debounce token stays installed so a newer selection or a
            // deactivation can still stop this run before it animates.
            inner.last_processed = Some(id);
            inner.state = ReactorState::Computing;
            entity
        };

        let resolver = self.resolver;
        let cache = Arc::clone(&self.cache);
        let computed = tokio::task::spawn_blocking(move || {
            palette_for_entity(&entity, &resolver, &cache)
        })
        .await;

        let computed = match computed {
            Ok(Some(computed)) => computed,
            Ok(None) => {
                debug!(entity = %id, "no usable artwork; theme unchanged");
                self.finish(&token);
                return;
            }
            Err(e) => {
                warn!(entity = %id, error = %e, "palette computation panicked");
                self.finish(&token);
                return;
            }
        };

        let transition = {
            let mut inner = self.inner.lock();
            if token.is_cancelled() {
                trace!(entity = %id, "selection superseded before animating");
                return;
            }
            inner.state = ReactorState::Animating;
            self.animator.begin_transition(computed.palette)
        };
        debug!(
            entity = %id,
            source = %computed.source,
            cached = computed.cached,
            accent = %computed.palette.accent(),
            "applying palette"
        );

        match transition.run().await {
            Ok(outcome) => {
                trace!(entity = %id, ?outcome, "transition finished")
            }
            Err(e) if e.is_benign() => {
                trace!(entity = %id, error = %e, "transition stopped")
            }
            Err(e) => warn!(entity = %id, error = %e, "transition failed"),
        }
        self.finish(&token);
    }

    fn finish(&self, token: &CancellationToken) {
        let mut inner = self.inner.lock();
        if token.is_cancelled() {
            return;
        }
        inner.debounce = None;
        if inner.state != ReactorState::Inactive {
            inner.state = ReactorState::Idle;
        }
    }
}
