//! Shared state primitives for QR Bolt.
//!
//! - [`Store`] / [`StateReader`]: a single-writer, multi-reader observable value whose
//!   snapshots are replaced wholesale.
//! - [`TaskTracker`] / [`TaskId`] / [`TaskHandle`]: generation counters that let an owner
//!   drop results from asynchronous work it has since superseded.

mod state;
mod task;

pub use state::{StateReader, Store};
pub use task::{TaskHandle, TaskId, TaskTracker};
