//! Core data types for the hoist deploy tool.
//!
//! This crate defines the inputs the deploy pipeline works on: Maven
//! coordinates, artifact records, build units, typed deploy destinations,
//! deploy/registry settings, and the `Hoist.toml` manifest that ties them
//! together.
//!
//! Nothing here is async or touches the network.

/// File name of the manifest looked up by the CLI.
pub const MANIFEST_FILE: &str = "Hoist.toml";

pub mod artifact;
pub mod config;
pub mod destination;
pub mod manifest;
pub mod unit;
pub mod version;
