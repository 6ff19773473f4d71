use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::VObjectState;

/// Request for server-side rendering of one content object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub object_id: String,
    /// Identity of this request; echoed back in the response and compared
    /// against the last request issued for the object.
    pub content_key: String,
    pub state: VObjectState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    pub content_key: String,
    /// Rendered size in canvas units.
    pub width: f64,
    pub height: f64,
    /// Encoded image (PNG, JPEG, ...) to display, if any.
    #[serde(default)]
    pub image: Option<Vec<u8>>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Render service unreachable: {0}")]
    Transport(String),

    #[error("Render service rejected '{object_id}': {message}")]
    Rejected { object_id: String, message: String },

    #[error("Invalid render response: {0}")]
    InvalidResponse(String),
}

/// Asynchronous render/update collaborator.
///
/// Completions may arrive with arbitrary latency and out of order with
/// respect to newer requests for the same object.
#[async_trait(?Send)]
pub trait RenderService {
    async fn render(&self, request: RenderRequest) -> Result<RenderResponse, ServiceError>;
}
