//! HTTP handlers

pub mod health;
pub mod auth;
pub mod profile;
pub mod scans;
pub mod community;
pub mod posts;
pub mod analytics;
