//! # imgstamp - Batch Composite Image Renderer
//!
//! imgstamp loads a base image per job, draws a list of overlay items on
//! top of it and saves the result as PNG. Items are:
//!
//! - **Text** in a TrueType/OpenType font and an RGB color
//! - **QR codes** rendered borderless at a fixed pixel size
//! - **Sub-images** loaded from disk, optionally scaled about their anchor
//!
//! ## Quick Start
//!
//! ```no_run
//! use imgstamp::{batch, config::Config};
//! use std::path::Path;
//!
//! let config = Config::discover(".")?;
//! config.check_params()?;
//!
//! let report = batch::run_batch(&config, Path::new("out"));
//! println!("{} written, {} failed", report.outputs.len(), report.failures.len());
//! # Ok::<(), imgstamp::StampError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | YAML batch description |
//! | [`job`] | Per-job validation and render pipeline |
//! | [`item`] | Item kinds, validation, rendering |
//! | [`canvas`] | Raster surface, draw state, fonts |
//! | [`batch`] | Sequential batch runner |
//! | [`fsutil`] | Output directory and file checks |
//! | [`error`] | Error types |

pub mod batch;
pub mod canvas;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod item;
pub mod job;

// Re-exports for convenience
pub use config::Config;
pub use error::StampError;
