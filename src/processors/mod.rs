//! Data preparation operations.

pub mod dedup;
pub mod merging;

// Re-export key types for convenience
pub use dedup::{remove_duplicates, remove_duplicates_with, DedupError, DedupReport};
pub use merging::{
    merge_csv, merge_text, MergeError, MergeReport, DEFAULT_CSV_OUTPUT, DEFAULT_DELIMITER,
    DEFAULT_TEXT_OUTPUT,
};
