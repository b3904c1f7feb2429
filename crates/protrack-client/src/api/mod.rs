//! API endpoint implementations.

mod auth;
mod protocols;

pub use auth::AuthApi;
pub use protocols::ProtocolsApi;
