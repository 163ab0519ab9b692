//! Identity-provider descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the HTTPS-only
//! token endpoint, the assertion audience, and the requested scope. `strategy` defines
//! [`ProviderStrategy`], an HTTP-client-agnostic hook used by the exchanger to augment
//! outgoing token requests and map provider errors into the crate's error taxonomy.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
