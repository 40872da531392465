//! Provider-facing configuration (endpoints, credentials) and dialects (API variants).
//!
//! `config` exposes validated strategy settings (`ProviderConfig`) covering the
//! login page, the API base URL, the two verification endpoint paths, and the
//! shared security key. `dialect` collapses the four historical variants of the
//! provider API into one [`ProviderDialect`](dialect::ProviderDialect)
//! descriptor (contact parameter name, slug passing style, member schema).

pub mod config;
pub mod dialect;

pub use config::*;
pub use dialect::*;
