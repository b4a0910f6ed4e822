//! Shared response shapes for API handlers.
//!
//! Reads return the bare entity or array. Mutations that the console shows
//! as a toast return a [`MessageResponse`].

use serde::Serialize;

/// `{ "status": "success", "message": ..., ...details }` acknowledgement.
///
/// `details` is flattened into the top-level object.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub details: T,
}

impl<T: Serialize> MessageResponse<T> {
    pub fn success(message: impl Into<String>, details: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            details,
        }
    }
}
