//! Ticketdesk Core - Telegram Mini App session and access control
//!
//! This crate provides the core of the Ticketdesk support-ticket Mini App:
//! session bootstrap from Telegram init data, the shared identity context,
//! role-based route gating, and the ticket and user administration
//! workflows over the backend API.

pub mod api;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod gate;
pub mod navigation;
pub mod service;
pub mod session;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
