//! Utilities for preparing tabular and text datasets.
//!
//! This crate provides tools for:
//! - Converting global coordinates into the fixed local frame
//! - Merging every `*.txt` file in a folder into one text file
//! - Merging the rows of every `*.csv` file in a folder into one CSV
//! - Removing rows whose leading tab-separated identifier repeats
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use dataset_prep::processors::{merge_csv, remove_duplicates, DEFAULT_CSV_OUTPUT};
//!
//! merge_csv(Path::new("exports/"), Path::new(DEFAULT_CSV_OUTPUT), ',').unwrap();
//! remove_duplicates(Path::new("ids.tsv")).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;

pub use config::{DedupConfig, MergeConfig, PrepConfig};
pub use core::transforms::{global_to_local, CoordinateFrame, Point3D};
pub use core::writers::WriteMode;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
