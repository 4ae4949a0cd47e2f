//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - JWT issuing and validation
//! - Authentication request/response payloads

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;


pub use auth::{AuthResponse, Claims, LoginRequest, RegisterRequest, UpdateProfileRequest, UserProfile};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
