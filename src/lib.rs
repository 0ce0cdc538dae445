//! Purpose: Shared library crate used by the `hostel` CLI and tests.
//! Exports: `core` (record store, text codec, records, errors), `notice`, `store_paths`.
//! Role: Backs the binary; the store is usable on its own with an explicit path.
//! Invariants: No hidden global file; every store handle is built from a resolved path.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;
pub mod notice;
pub mod store_paths;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::record::{Record, RecordUpdate};
pub use crate::core::store::{Durability, RecordStore, StoreOptions};
