//! Doorkeeper service library
//!
//! Links a Minecraft server player identity to a Discord identity and
//! answers, per login attempt, "is this player currently authorized?" by
//! asking the linked Discord user to press Allow or Deny.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `gateway` - Discord REST client and typed control identifiers
//! - `handlers` - HTTP request handlers
//! - `models` - Data models
//! - `registry` - In-memory correlation of prompts to button events
//! - `repositories` - Database access layer
//! - `routes` - Router assembly
//! - `services` - Business logic layer

pub mod config;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod repositories;
pub mod routes;
pub mod services;
