//! gemmirror - Mirror a remote gem repository to a local directory
//!
//! This library fetches a compressed manifest describing every artifact a
//! gem repository publishes, works out which artifacts are missing locally,
//! and downloads them with a bounded pool of worker threads.
//!
//! # High-Level API
//!
//! For most use cases, [`mirror::MirrorEngine`] is the only entry point:
//!
//! ```ignore
//! use gemmirror::manifest::ManifestFormat;
//! use gemmirror::mirror::{MirrorEngine, MirrorEntry};
//!
//! let engine = MirrorEngine::new(ManifestFormat::Line.decoder()).with_workers(10);
//! let summary = engine.run(&MirrorEntry::new("https://gems.example.com", "/srv/mirror"))?;
//! println!("{} fetched, {} failed", summary.fetched, summary.failed());
//! ```
//!
//! # Modules
//!
//! - [`config`]: `~/.gemmirror/config.ini` loading and the list of mirror entries
//! - [`manifest`]: manifest records and the decoders for supported index formats
//! - [`transport`]: source locations and blocking HTTP / filesystem transports
//! - [`mirror`]: the concurrent mirror engine
//! - [`logging`]: tracing subscriber setup for binaries

pub mod config;
pub mod logging;
pub mod manifest;
pub mod mirror;
pub mod transport;

/// Version of the gemmirror library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
