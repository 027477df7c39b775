//! HTTP handlers. Each resolves its operation through the authorization
//! gate before touching a service.

pub mod auth;
pub mod cookies;
pub mod metrics;
pub mod todo;
pub mod user;

pub use auth::*;
pub use todo::*;
pub use user::*;
