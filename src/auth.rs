//! Typed domain data exchanged between the host application and the provider.
//!
//! `slug` covers origin slugs and the intermediate contact identifier, `secret`
//! the redacting wrappers around the shared security key and the callback
//! token, and `identity` the normalized member record handed back to the host.

pub mod identity;
pub mod secret;
pub mod slug;

pub use identity::*;
pub use secret::*;
pub use slug::*;
