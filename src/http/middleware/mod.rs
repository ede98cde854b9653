pub mod auth;

pub use auth::require_verified_user;
