//! HTTP implementation of the [`perspecto_db::Backend`] seam for a
//! Supabase project.
//!
//! Three services sit behind one base URL:
//!
//! - PostgREST under `/rest/v1` ([`postgrest`]),
//! - object storage under `/storage/v1` ([`storage`]),
//! - GoTrue auth under `/auth/v1` ([`auth`]).
//!
//! [`SupabaseClient`] owns the token session and attaches it to every
//! request; a [`SessionStore`] persists it between runs.

pub mod auth;
pub mod client;
mod http;
pub mod postgrest;
pub mod session;
pub mod storage;

pub use client::SupabaseClient;
pub use http::extract_error_message;
pub use session::SessionStore;
