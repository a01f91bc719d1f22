//! Credential model and the cache that mints, serves, and invalidates credentials.

pub mod cache;
pub mod credential;
pub mod scope;
pub mod secret;

pub use cache::*;
pub use credential::*;
pub use scope::*;
pub use secret::*;
