//! Session authentication

pub mod session;

pub use session::{OptionalSession, SessionIdentity, require_admin, require_session};
