//! Route modules for the flipbook server

pub mod health;
pub mod proxy;
pub mod spa;
pub mod viewer;
