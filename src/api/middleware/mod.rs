//! API middleware components

pub mod api_key;
pub mod logging;
pub mod session;

pub use api_key::{caller_address, presented_api_key, API_KEY_HEADER};
pub use logging::logging_middleware;
pub use session::RequireUser;
