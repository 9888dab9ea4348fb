//! Shared test utilities for the extension-manager workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each hand-assemble extensions. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`builder`]: [`ExtensionBuilder`] and catalogue shorthands
//! - [`workspace`]: [`TestExtensionsDir`] for on-disk manifests and profiles

pub mod builder;
pub mod workspace;

pub use builder::{ExtensionBuilder, catalogue, ext, id};
pub use workspace::TestExtensionsDir;
