//! # Pre-Authorized Issuance Sessions
//!
//! Session management for the [OpenID for Verifiable Credential Issuance](https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html)
//! Pre-Authorized Code Flow: credential offer creation, one-shot exchange of
//! the pre-authorized code for an access token, one-shot credential delivery,
//! expiry, and replay protection.
//!
//! The crate owns session state and its transitions only. Credential signing
//! and subject data are consumed as capabilities (see [`provider`]), and the
//! HTTP surface is left to an adapter (see `examples/issuer.rs`).

pub mod provider;
pub mod types;

mod error;
mod generate;
mod handlers;
mod state;
mod store;

pub use self::error::Error;
pub use self::handlers::*;
pub use self::state::{Expire, Issued, Session, Stage, Token};
pub use self::store::{DEFAULT_CAPACITY, SessionStore};
pub use self::types::*;
