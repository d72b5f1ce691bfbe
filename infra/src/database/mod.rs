//! Database module - MySQL persistence for refresh tokens

pub mod mysql;

pub use mysql::MySqlTokenRepository;
