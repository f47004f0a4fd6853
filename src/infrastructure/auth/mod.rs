//! Authentication infrastructure module
//!
//! Session tokens stand in for the external identity provider's session.

mod session;

pub use session::{SessionClaims, SessionConfig, SessionTokenService, SessionTokens};
