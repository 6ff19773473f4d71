//! Render-service round trips: coalescing, stale completions and failures.

use std::cell::RefCell;
use std::io::Cursor;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use vcanvas_core::{shared, EventFilter};
use vcanvas_designer::{
    Canvas, CanvasEvent, CanvasEventCategory, ContentUpdate, RectangleF, RenderRequest,
    RenderResponse, RenderService, ServiceError, VObject, VObjectKind,
};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Answers every request with a small PNG and remembers what it was asked.
#[derive(Default)]
struct EchoService {
    calls: RefCell<Vec<RenderRequest>>,
}

#[async_trait(?Send)]
impl RenderService for EchoService {
    async fn render(&self, request: RenderRequest) -> Result<RenderResponse, ServiceError> {
        self.calls.borrow_mut().push(request.clone());
        tokio::task::yield_now().await;
        Ok(RenderResponse {
            content_key: request.content_key,
            width: 4.0,
            height: 2.0,
            image: Some(png_bytes(4, 2)),
        })
    }
}

struct FailingService;

#[async_trait(?Send)]
impl RenderService for FailingService {
    async fn render(&self, request: RenderRequest) -> Result<RenderResponse, ServiceError> {
        Err(ServiceError::Rejected {
            object_id: request.object_id,
            message: "font missing".to_string(),
        })
    }
}

fn ok(key: &str) -> Result<RenderResponse, ServiceError> {
    Ok(RenderResponse {
        content_key: key.to_string(),
        width: 10.0,
        height: 10.0,
        image: None,
    })
}

fn set_text(canvas: &mut Canvas, id: &str, text: &str) {
    canvas
        .update_object(id, |obj| {
            if let VObjectKind::Text(data) = obj.kind_mut() {
                data.text = text.to_string();
            }
        })
        .unwrap();
}

#[tokio::test]
async fn update_content_fills_every_content_object() {
    let mut canvas = Canvas::default();
    let text = canvas
        .add_object(VObject::text(RectangleF::new(0.0, 0.0, 40.0, 10.0), "hello", false))
        .unwrap();
    let picture = canvas
        .add_object(VObject::image(RectangleF::new(50.0, 0.0, 40.0, 20.0), "cat.png"))
        .unwrap();
    canvas
        .add_object(VObject::rectangle_shape(RectangleF::new(0.0, 50.0, 10.0, 10.0)))
        .unwrap();

    let service = EchoService::default();
    let applied = canvas.update_content(&service).await;

    assert_eq!(applied, 2);
    assert_eq!(service.calls.borrow().len(), 2);
    for id in [&text, &picture] {
        let state = canvas.object(id).unwrap().content_state();
        assert!(!state.is_loading());
        assert_eq!(state.image().map(|img| img.dimensions()), Some((4, 2)));
    }
    assert!(!canvas.is_busy());
    assert!(canvas.pending_render_requests().is_empty());
}

#[tokio::test]
async fn edits_during_a_request_coalesce_into_one_follow_up() {
    let mut canvas = Canvas::default();
    let id = canvas
        .add_object(VObject::text(RectangleF::new(0.0, 0.0, 40.0, 10.0), "a", false))
        .unwrap();

    let first = canvas.pending_render_requests();
    assert_eq!(first.len(), 1);

    set_text(&mut canvas, &id, "ab");
    set_text(&mut canvas, &id, "abc");
    assert!(canvas.pending_render_requests().is_empty());

    let update = canvas.apply_render_response(&id, &first[0].content_key, ok(&first[0].content_key));
    assert_eq!(update, ContentUpdate::Applied);

    let follow_up = canvas.pending_render_requests();
    assert_eq!(follow_up.len(), 1);
    match &follow_up[0].state.kind {
        VObjectKind::Text(data) => assert_eq!(data.text, "abc"),
        other => panic!("unexpected kind {other:?}"),
    }
}

#[tokio::test]
async fn superseded_completion_arriving_late_is_discarded() {
    let mut canvas = Canvas::default();
    let id = canvas
        .add_object(VObject::image(RectangleF::new(0.0, 0.0, 40.0, 20.0), "a.png"))
        .unwrap();

    let old = canvas.pending_render_requests().remove(0);
    canvas
        .update_object(&id, |obj| {
            if let VObjectKind::Image(data) = obj.kind_mut() {
                data.source = "b.png".to_string();
            }
        })
        .unwrap();
    let new = canvas.pending_render_requests().remove(0);
    assert_ne!(old.content_key, new.content_key);

    assert_eq!(
        canvas.apply_render_response(&id, &new.content_key, ok(&new.content_key)),
        ContentUpdate::Applied
    );
    assert_eq!(
        canvas.apply_render_response(&id, &old.content_key, ok(&old.content_key)),
        ContentUpdate::Stale
    );
    let state = canvas.object(&id).unwrap().content_state();
    assert_eq!(state.rendered_size(), Some((10.0, 10.0)));
}

#[tokio::test]
async fn failures_are_published_and_keep_the_last_good_image() {
    let mut canvas = Canvas::default();
    let id = canvas
        .add_object(VObject::text(RectangleF::new(0.0, 0.0, 40.0, 10.0), "ok", false))
        .unwrap();
    canvas.update_content(&EchoService::default()).await;

    let failures = shared(Vec::new());
    let sink = failures.clone();
    canvas.events().subscribe(
        EventFilter::Categories(vec![CanvasEventCategory::Render]),
        move |event: &CanvasEvent| sink.borrow_mut().push(event.clone()),
    );

    set_text(&mut canvas, &id, "broken");
    let applied = canvas.update_content(&FailingService).await;

    assert_eq!(applied, 0);
    assert_eq!(
        *failures.borrow(),
        vec![CanvasEvent::RenderFailed {
            object_id: id.clone(),
            message: format!("Render service rejected '{id}': font missing"),
        }]
    );
    assert!(canvas.object(&id).unwrap().content_state().image().is_some());
}
