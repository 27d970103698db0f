//! Remote data layer: row models, the [`Backend`](backend::Backend) seam,
//! and one repository per concern.
//!
//! Repositories never talk HTTP themselves. They are constructed with an
//! `Arc<dyn Backend>`; production code injects the hosted client from
//! `perspecto-supabase`, tests inject [`memory::MemoryBackend`].

pub mod backend;
pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;

pub use backend::{Backend, Filter, Query};
pub use error::{DataError, DataResult};
pub use memory::MemoryBackend;
