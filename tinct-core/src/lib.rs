//! # Tinct Core
//!
//! Per-item dynamic theming: derive an accent color from the artwork of the
//! selected entity, expand it into a full UI palette and animate the host's
//! theme resources towards it.
//!
//! ## Overview
//!
//! - **Sampling**: histogram vote over the central region of the artwork,
//!   ignoring transparent, near-black, washed-out and skin-tone pixels
//! - **Synthesis**: a readable 25-color palette from a single accent
//! - **Caching**: RAM tier plus a debounced, atomically written JSON file
//! - **Transitions**: eased, cancellable palette animations
//! - **Reactor**: polls the host, debounces selection changes and restores
//!   the host's own resources when theming is turned off
//! - **Precache**: an opt-in trickle pass that warms the cache in the
//!   background
//!
//! ## Architecture
//!
//! The host plugs in through two traits: [`ThemeHost`] answers what is
//! selected and whether theming may run, and [`ThemeSink`] receives the
//! color and brush resources. [`DynamicThemeEngine`] wires everything else.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tinct_core::{
//!     DynamicThemeEngine, InMemorySink, ThemeHost, ThemingConfig,
//! };
//! use tinct_model::Entity;
//!
//! struct Library(Vec<Entity>);
//!
//! impl ThemeHost for Library {
//!     fn theming_enabled(&self) -> bool { true }
//!     fn is_active(&self) -> bool { true }
//!     fn selected(&self) -> Option<Entity> { self.0.first().cloned() }
//!     fn entities(&self) -> Vec<Entity> { self.0.clone() }
//! }
//!
//! # async fn demo() -> tinct_core::Result<()> {
//! let engine = DynamicThemeEngine::new(
//!     ThemingConfig::default(),
//!     Arc::new(Library(Vec::new())),
//!     Arc::new(InMemorySink::new()),
//! )?;
//! let tasks = engine.start();
//! // ... run the application ...
//! engine.shutdown();
//! tasks.join().await;
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

pub mod animator;
pub mod cache;
pub mod color;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod precache;
pub mod reactor;
pub mod resolver;
pub mod sink;

pub use animator::{
    Transition, TransitionAnimator, TransitionOutcome, TransitionSettings,
};
pub use cache::{CacheKey, PaletteCache, PaletteCacheStatsSnapshot};
pub use color::{PixelView, safe_accent, sample, synthesize};
pub use config::ThemingConfig;
pub use engine::{DynamicThemeEngine, EngineHandle};
pub use error::{Result, ThemeError};
pub use host::ThemeHost;
pub use precache::{PrecacheReport, PrecacheSettings, PrecacheSwitch, Precacher};
pub use reactor::{ReactorState, SelectionReactor, TickOutcome};
pub use resolver::{ImageCandidate, ImageResolver, ImageSource, ResolvedImage};
pub use sink::{InMemorySink, ResourceBatch, Snapshot, ThemeSink};
