/// Crunch Club API
///
/// REST backend for the Crunch Club social network: shouts, likes,
/// follower-gated feeds, and the car catalog (dream cars and co-owned
/// cars).
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for users, posts, cars
/// - `services`: Business logic, including the visibility & feed engine
/// - `db`: Database access layer and repositories
/// - `security`: Password hashing
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
