//! Core data types and I/O operations.

pub mod loaders;
pub mod transforms;
pub mod writers;

pub use loaders::{LoaderError, Row};
pub use transforms::{global_to_local, CoordinateFrame, Point3D, LOCAL_FRAME};
pub use writers::{write_delimited, write_text, WriteError, WriteMode};
