//! Credential inspection: JWT claim decoding, expiry checks, and token validation.

pub mod claims;
pub mod secret;
pub mod validation;

pub use claims::*;
pub use secret::*;
pub use validation::*;
