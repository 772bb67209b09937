//! Prediction history persistence for carclass.
//!
//! This crate owns the single persisted entity of the system, the
//! [`Prediction`] record, and the SQLite table backing it. It provides:
//!
//! - [`PredictionStore`]: CRUD + full-table scan over prediction records,
//!   backed by one SQLite connection guarded by a mutex.
//! - [`Stats`] / [`aggregate`]: a pure reduction over the full record set
//!   (counts, most-frequent class, mean confidence, per-class histogram).
//!
//! A record is created exactly once per successful inference request and is
//! immutable afterwards except for hard deletion. The uploaded image file and
//! the database row are independently lifecycled artifacts: deleting a record
//! does not touch the file on disk.

pub mod error;
pub mod record;
pub mod stats;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use record::{NewPrediction, Prediction};
pub use stats::{aggregate, Stats};
pub use store::PredictionStore;
