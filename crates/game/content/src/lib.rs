//! Data-driven level content and loaders.
//!
//! This crate reads puzzle content from RON/TOML data files:
//! - Game configuration (data-driven via TOML)
//! - Mask compatibility tables (data-driven via RON)
//! - Level layouts: ground, player, interactables, actors, trigger effects (RON)
//!
//! Loaded levels are turned into a ready-to-tick [`maskgrid_core::World`].
//!
//! All loaders use maskgrid-core types directly with serde for RON/TOML deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, EffectSpec, EntityKindSpec, EntitySpec, GroundSpec, Level,
    LevelLoader, LevelSpec, LoadResult, MaskTableLoader, PlayerSpec, WanderSpec,
};
