//! Per-object render-service bookkeeping.
//!
//! At most one request per object is in flight. Changes made while a
//! request is outstanding are coalesced into a single follow-up request
//! issued after the completion. Completions whose key does not match the
//! last issued request are stale and dropped.

use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, warn};

use super::{RenderResponse, ServiceError};

/// Outcome of applying a render-service completion.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentUpdate {
    /// The response was applied and the new image (if any) is visible.
    Applied,
    /// A newer request superseded this one; nothing changed.
    Stale,
    /// The request failed; the last good image stays visible.
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ContentState {
    dirty: bool,
    pending: bool,
    loading: bool,
    in_flight: Option<String>,
    last_requested: Option<String>,
    sequence: u64,
    image: Option<Arc<RgbaImage>>,
    rendered_size: Option<(f64, f64)>,
}

impl ContentState {
    /// Records that the object changed and needs fresh content.
    pub fn mark_dirty(&mut self) {
        if self.in_flight.is_some() {
            self.pending = true;
        } else {
            self.dirty = true;
        }
    }

    pub fn needs_request(&self) -> bool {
        self.dirty && self.in_flight.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    pub fn rendered_size(&self) -> Option<(f64, f64)> {
        self.rendered_size
    }

    /// Starts a request if none is in flight and returns its key.
    ///
    /// While a request is outstanding the change is queued instead and
    /// `None` is returned.
    pub fn begin_request(&mut self, object_id: &str) -> Option<String> {
        if self.in_flight.is_some() {
            self.pending = true;
            return None;
        }
        self.sequence += 1;
        let key = format!("{}:{}", object_id, self.sequence);
        self.in_flight = Some(key.clone());
        self.last_requested = Some(key.clone());
        self.dirty = false;
        self.loading = true;
        debug!("Render request {} issued", key);
        Some(key)
    }

    /// Applies a completion for the request identified by `key`.
    pub fn complete(
        &mut self,
        key: &str,
        result: Result<RenderResponse, ServiceError>,
    ) -> ContentUpdate {
        if self.last_requested.as_deref() != Some(key) {
            if self.in_flight.as_deref() == Some(key) {
                self.in_flight = None;
            }
            warn!("Discarding stale render completion {}", key);
            return ContentUpdate::Stale;
        }

        self.in_flight = None;
        self.loading = false;
        if std::mem::take(&mut self.pending) {
            self.dirty = true;
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => return ContentUpdate::Failed(e.to_string()),
        };

        if let Some(bytes) = &response.image {
            match image::load_from_memory(bytes) {
                Ok(decoded) => {
                    let back = Arc::new(decoded.to_rgba8());
                    self.image = Some(back);
                }
                Err(e) => return ContentUpdate::Failed(format!("image decode failed: {e}")),
            }
        }
        self.rendered_size = Some((response.width, response.height));
        ContentUpdate::Applied
    }

    /// Supersedes any outstanding request; its completion will be stale.
    pub fn invalidate(&mut self) {
        self.last_requested = None;
        self.in_flight = None;
        self.pending = false;
        self.loading = false;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(key: &str) -> RenderResponse {
        RenderResponse {
            content_key: key.to_string(),
            width: 10.0,
            height: 5.0,
            image: None,
        }
    }

    #[test]
    fn test_single_in_flight_and_coalescing() {
        let mut state = ContentState::default();
        state.mark_dirty();
        let key = state.begin_request("t1").unwrap();
        assert!(state.is_loading());

        state.mark_dirty();
        state.mark_dirty();
        assert!(state.begin_request("t1").is_none());
        assert!(!state.needs_request());

        assert_eq!(state.complete(&key, Ok(response(&key))), ContentUpdate::Applied);
        assert!(state.needs_request());
        assert!(state.begin_request("t1").is_some());
        assert!(!state.needs_request());
    }

    #[test]
    fn test_stale_completion_discarded() {
        let mut state = ContentState::default();
        let old = state.begin_request("t1").unwrap();
        state.invalidate();
        let new = state.begin_request("t1").unwrap();
        assert_ne!(old, new);

        assert_eq!(state.complete(&old, Ok(response(&old))), ContentUpdate::Stale);
        assert!(state.rendered_size().is_none());
        assert_eq!(state.complete(&new, Ok(response(&new))), ContentUpdate::Applied);
        assert_eq!(state.rendered_size(), Some((10.0, 5.0)));
    }

    #[test]
    fn test_failure_keeps_last_good_image() {
        let mut state = ContentState::default();
        let key = state.begin_request("i1").unwrap();
        let mut png = Vec::new();
        image::RgbaImage::new(2, 2)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let ok = RenderResponse {
            image: Some(png),
            ..response(&key)
        };
        assert_eq!(state.complete(&key, Ok(ok)), ContentUpdate::Applied);
        assert_eq!(state.image().map(|i| i.dimensions()), Some((2, 2)));

        state.mark_dirty();
        let key = state.begin_request("i1").unwrap();
        let failed = state.complete(&key, Err(ServiceError::Transport("offline".into())));
        assert!(matches!(failed, ContentUpdate::Failed(_)));
        assert!(state.image().is_some());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_undecodable_image_fails() {
        let mut state = ContentState::default();
        let key = state.begin_request("i1").unwrap();
        let bad = RenderResponse {
            image: Some(vec![1, 2, 3]),
            ..response(&key)
        };
        assert!(matches!(state.complete(&key, Ok(bad)), ContentUpdate::Failed(_)));
        assert!(state.image().is_none());
    }
}
