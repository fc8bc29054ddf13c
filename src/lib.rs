#![doc = "The `taskforge` library crate."]
#![doc = ""]
#![doc = "Identity and ownership enforcement for a personal task list: account"]
#![doc = "registration and login, bearer-token resolution, and task storage where every"]
#![doc = "operation is scoped to the authenticated caller."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::config::Config;
pub use crate::error::AppError;
