pub mod attachments;
pub mod auth;
pub mod config;
pub mod directory;
pub mod notifications;
pub mod server;
pub mod shared;
pub mod store;
pub mod tickets;
