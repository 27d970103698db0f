//! Domain rules shared by every Perspecto crate.
//!
//! Nothing in here performs I/O. The data layer (`perspecto-db`) and the
//! view-state layer (`perspecto-app`) call into these helpers so that the
//! same rules apply whether data came from the hosted backend or from the
//! in-process test backend.

pub mod credentials;
pub mod error;
pub mod ids;
pub mod media;
pub mod optimistic;
pub mod severity;
pub mod storage;
pub mod text;
pub mod types;
