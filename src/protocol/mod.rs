//! Message types exchanged with the dashboard API.
//!
//! # Protocol Overview
//!
//! Every API call is a single `POST` whose body is an encoded request
//! message and whose response body is an encoded response message.
//! Application failures travel inside successful responses as a non-empty
//! `error_msg` field.
//!
//! | Path | Request | Response |
//! |------|---------|----------|
//! | `/_/login` | [`LoginRequest`] | [`LoginResponse`] |
//! | `/_/get-current-user` | [`GetCurrentUserRequest`] | [`GetCurrentUserResponse`] |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message` | The [`Message`] codec contract |
//! | `request` | Runtime-owned API messages |

// ============================================================================
// Submodules
// ============================================================================

/// Codec contract.
pub mod message;

/// Runtime-owned API messages.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::{ErrorMessage, JSON_CONTENT_TYPE, Message};
pub use request::{
    CURRENT_USER_PATH, Credentials, GetCurrentUserRequest, GetCurrentUserResponse, LOGIN_PATH,
    LoginRequest, LoginResponse, UserInfo,
};
