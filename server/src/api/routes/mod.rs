//! API route handlers

pub mod categories;
pub mod health;
pub mod tables;
