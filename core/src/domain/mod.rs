//! Domain model for the authentication core

pub mod entities;
