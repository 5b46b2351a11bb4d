//! Command-line dumper for LMDB environments.
//!
//! Opens an existing environment read-only, looks up one named database and
//! prints every record in ascending key order, one record per line. Keys and
//! values are never interpreted; they are rendered as escaped byte strings
//! only at the final print step (see [`render`][render]).
//!
//! [render]: crate::render

pub mod args;
pub mod dump;
pub mod error;
pub mod render;

pub use args::Args;
pub use dump::{dump, write_records, DumpOptions, DumpStats};
pub use error::DumpError;
pub use render::Format;
