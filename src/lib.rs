//! Read-only dumper for named databases inside LMDB environments.
//!
//! The work is split across two crates, re-exported here:
//! - [`kv_store`][kv_store]: read-only environment, transaction and cursor
//!   API, with the LMDB implementation enabled.
//! - [`cli`][cli]: the dump pipeline, record rendering and the error taxonomy
//!   behind the `dumpdb` binary.
//!
//! [kv_store]: crate::kv_store
//! [cli]: crate::cli

pub use dumpdb_cli as cli;
pub use dumpdb_kv_store as kv_store;
