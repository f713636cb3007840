//! # Web Trigger Request Handlers

pub mod events;
pub mod health;
