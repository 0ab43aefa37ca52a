//! Codec contract for application messages.
//!
//! The runtime treats message encoding as opaque: every message type knows
//! how to turn itself into a request body and back, and names the content
//! type of that body. The core only moves the bytes.
//!
//! # Example
//!
//! ```ignore
//! use dashboard_runtime::protocol::{LoginRequest, Message};
//!
//! let body = LoginRequest::new("admin", "secret").encode()?;
//! let same = LoginRequest::decode(&body)?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Content type of bodies produced by [`json_message!`].
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// Message
// ============================================================================

/// A message that can be carried in a request or response body.
pub trait Message: Sized + Send {
    /// Value of the `Content-Type` header matching [`encode`](Self::encode).
    const CONTENT_TYPE: &'static str;

    /// Encodes the message into a request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if the message cannot be encoded.
    fn encode(&self) -> Result<Vec<u8>>;

    /// Decodes a message from a response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if the bytes are not a valid message.
    fn decode(bytes: &[u8]) -> Result<Self>;
}

// ============================================================================
// ErrorMessage
// ============================================================================

/// Response messages that carry an application-level error string.
///
/// An empty string means the call succeeded.
pub trait ErrorMessage {
    /// Returns the error message, empty on success.
    fn error_msg(&self) -> &str;

    /// Converts a non-empty error message into [`Error::Application`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Application`] if the response carries an error.
    fn check(&self) -> Result<()> {
        let message = self.error_msg();
        if message.is_empty() {
            Ok(())
        } else {
            Err(Error::application(message))
        }
    }
}

// ============================================================================
// JSON Encoding
// ============================================================================

/// Implements [`Message`] for serde types using a JSON body.
macro_rules! json_message {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::protocol::Message for $ty {
                const CONTENT_TYPE: &'static str = $crate::protocol::message::JSON_CONTENT_TYPE;

                fn encode(&self) -> $crate::error::Result<Vec<u8>> {
                    serde_json::to_vec(self)
                        .map_err(|e| $crate::error::Error::codec(e.to_string()))
                }

                fn decode(bytes: &[u8]) -> $crate::error::Result<Self> {
                    serde_json::from_slice(bytes)
                        .map_err(|e| $crate::error::Error::codec(e.to_string()))
                }
            }
        )+
    };
}

pub(crate) use json_message;

// ============================================================================
// Tests
// ============================================================================
