pub mod clock;
pub mod password;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use password::{Argon2Hasher, CredentialHasher, Password};
pub use validation::ValidatedJson;
