//! Test providers for issuance flows.

pub mod issuer;
