pub mod auth;
pub mod connection;
pub mod directory;
pub mod laundromats;
pub mod magic_auth;
pub mod reviews;
pub mod subscriptions;
