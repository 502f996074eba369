//! Direct-messaging backend: user registration, password login, signed
//! session tokens, and sender/recipient-scoped message access.

pub mod api;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod service;
