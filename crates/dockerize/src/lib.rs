//! Package application code into a container image and launch it.
//!
//! This is the facade crate: it drives the build → create → start
//! workflow against a container engine and re-exports the sub-crates.
//!
//! | Module | Crate | Description |
//! |--------|-------|-------------|
//! | [`types`] | `dockerize-core` | Inputs, options, and `dockerize.toml` |
//! | [`build`] | `dockerize-build` | Recipe rendering and build-context tarballs |
//! | [`engine`] | `dockerize-engine` | Engine API client and transports |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use dockerize::{AppInput, BuildOptions, Dockerizer, EndpointConfig};
//!
//! # async fn run() -> Result<(), dockerize::Error> {
//! let docker = Dockerizer::new(EndpointConfig::new("unix:///var/run/docker.sock"))?;
//! let id = docker
//!     .dockerize(
//!         AppInput::from("require('http').createServer((q, s) => s.end('hi')).listen(8080)"),
//!         BuildOptions::default().port(3000),
//!     )
//!     .await?;
//! println!("started {id}");
//! # Ok(())
//! # }
//! ```

mod error;
mod pipeline;

pub use error::Error;
pub use pipeline::{Dockerizer, Stage};

pub use dockerize_core::{
    AppInput, AppStream, BuildOptions, DockerizeConfig, EndpointConfig, Entry, EntryData,
    EntryKind, TransportOptions,
};
pub use dockerize_engine::{ContainerId, RequestOptions, ResponseBody};

/// Shared types and configuration.
pub mod types {
    pub use dockerize_core::*;
}

/// Recipe rendering, input normalization, and tar assembly.
pub mod build {
    pub use dockerize_build::*;
}

/// Engine API client and transports.
pub mod engine {
    pub use dockerize_engine::*;
}
