//! Dashboard API messages used by the runtime itself.
//!
//! Views bring their own messages; the runtime only needs the session
//! handshake and the login call.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use super::message::{ErrorMessage, json_message};

// ============================================================================
// API Paths
// ============================================================================

/// Path of the login endpoint.
pub const LOGIN_PATH: &str = "/_/login";

/// Path of the current-user endpoint.
pub const CURRENT_USER_PATH: &str = "/_/get-current-user";

// ============================================================================
// UserInfo
// ============================================================================

/// The authenticated principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Login name.
    #[serde(default)]
    pub login_name: String,

    /// Display name.
    #[serde(default)]
    pub display_name: String,

    /// Whether the user may manage other users.
    #[serde(default)]
    pub is_admin: bool,

    /// Whether the account is disabled.
    #[serde(default)]
    pub disabled: bool,
}

// ============================================================================
// Credentials
// ============================================================================

/// Login name and password entered in the login modal.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub login_name: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[inline]
    #[must_use]
    pub fn new(login_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_name: login_name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login_name", &self.login_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Login
// ============================================================================

/// Body of [`LOGIN_PATH`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub login_name: String,
    /// Password.
    pub password: String,
}

impl LoginRequest {
    /// Creates a login request.
    #[inline]
    #[must_use]
    pub fn new(login_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_name: login_name.into(),
            password: password.into(),
        }
    }
}

impl From<&Credentials> for LoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self::new(&credentials.login_name, &credentials.password)
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login_name", &self.login_name)
            .finish_non_exhaustive()
    }
}

/// Response of [`LOGIN_PATH`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Non-empty when the credentials were rejected.
    #[serde(default)]
    pub error_msg: String,
}

impl ErrorMessage for LoginResponse {
    fn error_msg(&self) -> &str {
        &self.error_msg
    }
}

// ============================================================================
// Current User
// ============================================================================

/// Body of [`CURRENT_USER_PATH`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCurrentUserRequest {}

/// Response of [`CURRENT_USER_PATH`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCurrentUserResponse {
    /// Non-empty when the user could not be resolved.
    #[serde(default)]
    pub error_msg: String,

    /// The current user.
    #[serde(default)]
    pub user: Option<UserInfo>,
}

impl ErrorMessage for GetCurrentUserResponse {
    fn error_msg(&self) -> &str {
        &self.error_msg
    }
}

json_message!(
    LoginRequest,
    LoginResponse,
    GetCurrentUserRequest,
    GetCurrentUserResponse,
);

// ============================================================================
// Tests
// ============================================================================
