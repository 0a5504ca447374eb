//! Macro implementations

pub mod deep_entity;

pub use deep_entity::derive_deep_entity;
