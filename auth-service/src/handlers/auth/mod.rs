pub mod registration;
pub mod session;

pub use registration::register;
pub use session::{
    list_sessions, login, logout, refresh, revoke_all_sessions, revoke_session,
};
