//! The token lifecycle: assertion signing, assertion-for-token exchange, and the
//! [`TokenSource`] seam the API client draws bearer tokens from.

pub mod assertion;
pub mod common;

mod client_credentials;

pub use assertion::*;
pub use client_credentials::*;
pub use common::*;
