pub mod session;
pub mod todo;
pub mod user;

pub use session::{ClientInfo, Session, SessionInfo, SessionState, SESSION_TTL_DAYS};
pub use todo::{NewTodo, Todo, TodoChanges, TodoId};
pub use user::{Identity, NewUser, Role, User, UserId, UserResponse};
