//! Credential material, typed identifiers, token records, and clocks.

pub mod clock;
pub mod credential;
pub mod id;
pub mod secret;
pub mod token;

pub use clock::*;
pub use credential::*;
pub use id::*;
pub use secret::*;
pub use token::*;
