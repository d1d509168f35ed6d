//! Core data model definitions shared across Tinct crates.
#![allow(missing_docs)]

pub mod color;
pub mod entity;
pub mod error;
pub mod palette;
pub mod resource;

pub use color::{Rgb, darken, lerp, lighten, mix};
pub use entity::{Entity, EntityId};
pub use error::{ModelError, Result as ModelResult};
pub use palette::{Palette, PaletteField};
pub use resource::{Brush, BrushKey, GradientStop, ResourceKey, ResourceValue};
