//! Core types and configuration for dockerize.
//!
//! This crate defines the `dockerize.toml` schema ([`DockerizeConfig`]),
//! the caller-facing application input ([`AppInput`]), archive entries
//! ([`Entry`]), per-invocation [`BuildOptions`], and shared error types.

pub mod config;
pub mod error;
pub mod input;
pub mod options;

pub use config::{DEFAULT_HOST_PORT, DefaultsConfig, DockerizeConfig, EndpointConfig, RecipeConfig, TransportOptions};
pub use error::{Error, Result};
pub use input::{AppInput, AppStream, Entry, EntryData, EntryKind};
pub use options::{BuildOptions, default_app_name, resolve_host_port};
