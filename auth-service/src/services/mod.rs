//! Core services: credentials, access tokens, sessions and abilities, plus
//! the stores they persist through.

pub mod ability;
pub mod auth;
pub mod cookies;
pub mod credentials;
mod database;
pub mod error;
pub mod gate;
pub mod jwt;
mod memory;
pub mod session;
pub mod store;
pub mod todo;

pub use ability::{AbilityEngine, AbilitySet, Action, SubjectType};
pub use auth::{AuthOutcome, AuthService, Registration};
pub use cookies::{CookieDescriptor, CookiePolicy};
pub use credentials::CredentialVerifier;
pub use database::Database;
pub use error::ServiceError;
pub use gate::{AuthorizationGate, Authorized, Operation, RequiredRule};
pub use jwt::TokenIssuer;
pub use memory::MemoryStore;
pub use session::{spawn_expiry_sweeper, SessionManager};
pub use store::{SessionStore, TodoStore, UserStore};
pub use todo::TodoService;
