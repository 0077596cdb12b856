pub mod admin;
pub mod auth;
pub mod dishes;
pub mod server;
pub mod users;
