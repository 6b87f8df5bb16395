//! Admin service models

pub mod association;
pub mod lenient;
pub mod user;
pub mod user_meta;

// Re-export for convenience
pub use association::{Association, Language, Town};
pub use user::{TRANSLATOR_ROLE, User, UserFields, UserRequest, UserStatus};
pub use user_meta::UserMeta;
