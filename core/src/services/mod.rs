//! Domain services

pub mod blacklist;
pub mod directory;
pub mod token;
