mod password;
mod session;

pub use password::login_handler;
pub use session::{logout_handler, me_handler};

/// Session key holding the authenticated [`rolegate_core::UserIdentity`].
pub const SESSION_USER_KEY: &str = "user_identity";

#[cfg(test)]
mod tests;
