//
// lib.rs
// ExifDiff-rs
//
// Library entry that re-exports modules so the binary and any external users can access metadata records, alignment, refinement, rendering and the exiftool session.
//
// Thales Matheus Mendonça Santos - November 2025
//
// Public crate interface: re-export modules used by the binary and tests.
pub mod align;
pub mod cli;
pub mod diff;
pub mod error;
pub mod exiftool;
pub mod metadata;
pub mod ops;
pub mod refine;
pub mod render;
pub mod utils;

pub use align::{align, edit_script};
pub use cli::{build_options, Args, Options};
pub use diff::{diff_pair, run_exifdiff, DiffStats};
pub use error::{DiffResult, ExifDiffError};
pub use exiftool::{ExifTool, MetadataSource};
pub use metadata::MetadataRecord;
pub use ops::{EditOperation, OpTag};
pub use refine::refine_replace;
pub use render::{render_operations, DiffLine, Layout, Marker};
