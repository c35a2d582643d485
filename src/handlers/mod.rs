// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod auth_user;
mod health;
mod messages;
mod metrics;
mod root;
mod shared_types;
mod users;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::root_handler;

// Authentication handlers
pub use auth::{login, register};

// Message handlers
pub use messages::{get_message, mark_read, send_message};

// User handlers
pub use users::{get_user, list_users, messages_from, messages_to};
