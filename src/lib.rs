//! # chisel - Incremental Build Helper for C
//!
//! chisel is a tiny make-like build helper: it scans the project's source
//! directories, compiles stale `.c` files into objects, links them into one
//! executable, and remembers modification times in a flat on-disk cache so
//! unchanged files are never recompiled.
//!
//! ## Features
//!
//! - **Zero Configuration**: builds `src/*.c` into `build/app` out of the box
//! - **Incremental**: mtime-based build cache, one compile per changed file
//! - **Header-Aware**: any changed header forces a full rebuild of the set
//! - **Honest Failures**: the first failed step stops the whole build
//!
//! ## Quick Start
//!
//! ```bash
//! # Build the project in the current directory
//! chisel
//!
//! # Remove artifacts and the build cache
//! chisel clean
//! ```
//!
//! ## Module Organization
//!
//! - [`builder`] - Compile-and-link orchestration
//! - [`cache`] - Persisted modification-time cache
//! - [`config`] - Configuration parsing (`chisel.toml`)
//! - [`runner`] - External command execution

/// Incremental compile-and-link orchestration.
pub mod builder;

/// Persisted modification-time cache.
pub mod cache;

/// Configuration file parsing (`chisel.toml`).
pub mod config;

/// Embedding files into generated C source.
pub mod embed;

/// Filesystem queries (mtime, directory listing).
pub mod fsutil;

/// External command execution.
pub mod runner;

/// Terminal output helpers.
pub mod ui;
