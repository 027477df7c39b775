pub mod auth;

pub use auth::{ClientContext, Credentials};
