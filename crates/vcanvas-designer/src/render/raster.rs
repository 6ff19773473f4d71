//! `tiny-skia` backed drawing surface.

use image::RgbaImage;
use tiny_skia::{
    FillRule, IntSize, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, StrokeDash, Transform,
};

use super::{DrawingSurface, RenderError};
use crate::geometry::{Matrix, Path, PathSegment, PointF, RotatedRectangleF};
use crate::model::{Color, Stroke};

/// Software raster surface.
pub struct TinySkiaSurface {
    pixmap: Pixmap,
    scale: f64,
    clip: Option<Mask>,
    draw_calls: usize,
}

impl std::fmt::Debug for TinySkiaSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinySkiaSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("scale", &self.scale)
            .field("draw_calls", &self.draw_calls)
            .finish()
    }
}

impl TinySkiaSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Surface(format!("invalid size {width}x{height}")))?;
        Ok(Self {
            pixmap,
            scale: 1.0,
            clip: None,
            draw_calls: 0,
        })
    }

    pub fn clear(&mut self, color: Color) {
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Number of primitives drawn since creation.
    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    /// Color of the pixel at `(x, y)`, un-premultiplied.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let p = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(p.red(), p.green(), p.blue(), p.alpha()))
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Surface(e.to_string()))
    }

    fn transform(&self) -> Transform {
        Transform::from_scale(self.scale as f32, self.scale as f32)
    }

    fn paint(color: Color, opacity: f64) -> Paint<'static> {
        let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, alpha);
        paint.anti_alias = true;
        paint
    }

    fn skia_stroke(stroke: &Stroke, dash: Option<&[f64]>) -> Result<tiny_skia::Stroke, RenderError> {
        let dash = match dash {
            Some(pattern) => Some(
                StrokeDash::new(pattern.iter().map(|d| *d as f32).collect(), 0.0)
                    .ok_or_else(|| RenderError::Surface("invalid dash pattern".to_string()))?,
            ),
            None => None,
        };
        Ok(tiny_skia::Stroke {
            width: stroke.width as f32,
            dash,
            ..Default::default()
        })
    }

    fn to_skia_path(path: &Path) -> Option<tiny_skia::Path> {
        let mut pb = PathBuilder::new();
        for segment in path.segments() {
            match *segment {
                PathSegment::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
                PathSegment::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
                PathSegment::QuadraticTo { control, to } => {
                    pb.quad_to(control.x as f32, control.y as f32, to.x as f32, to.y as f32)
                }
                PathSegment::CubicTo {
                    control1,
                    control2,
                    to,
                } => pb.cubic_to(
                    control1.x as f32,
                    control1.y as f32,
                    control2.x as f32,
                    control2.y as f32,
                    to.x as f32,
                    to.y as f32,
                ),
                PathSegment::Close => pb.close(),
            }
        }
        pb.finish()
    }

    fn rectangle_path(rect: &RotatedRectangleF) -> Path {
        let [tl, tr, br, bl] = rect.corners();
        Path::new()
            .move_to(tl.x, tl.y)
            .line_to(tr.x, tr.y)
            .line_to(br.x, br.y)
            .line_to(bl.x, bl.y)
            .close()
    }

    fn line_path(from: PointF, to: PointF) -> Path {
        Path::new().move_to(from.x, from.y).line_to(to.x, to.y)
    }

    fn stroke(
        &mut self,
        path: &Path,
        stroke: &Stroke,
        dash: Option<&[f64]>,
        opacity: f64,
    ) -> Result<(), RenderError> {
        // Degenerate paths have nothing to draw.
        let Some(skia_path) = Self::to_skia_path(path) else {
            return Ok(());
        };
        let skia_stroke = Self::skia_stroke(stroke, dash)?;
        self.pixmap.stroke_path(
            &skia_path,
            &Self::paint(stroke.color, opacity),
            &skia_stroke,
            self.transform(),
            self.clip.as_ref(),
        );
        self.draw_calls += 1;
        Ok(())
    }

    fn fill(&mut self, path: &Path, color: Color, opacity: f64) -> Result<(), RenderError> {
        let Some(skia_path) = Self::to_skia_path(path) else {
            return Ok(());
        };
        self.pixmap.fill_path(
            &skia_path,
            &Self::paint(color, opacity),
            FillRule::Winding,
            self.transform(),
            self.clip.as_ref(),
        );
        self.draw_calls += 1;
        Ok(())
    }
}

/// Converts an RGBA image into a premultiplied pixmap.
fn pixmap_from_image(image: &RgbaImage) -> Result<Pixmap, RenderError> {
    let size = IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| RenderError::Surface("empty image".to_string()))?;
    let mut data = image.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size)
        .ok_or_else(|| RenderError::Surface("image buffer size mismatch".to_string()))
}

impl DrawingSurface for TinySkiaSurface {
    fn set_scale(&mut self, mul: f64) {
        self.scale = mul;
    }

    fn fill_rectangle(
        &mut self,
        rect: &RotatedRectangleF,
        color: Color,
        opacity: f64,
    ) -> Result<(), RenderError> {
        self.fill(&Self::rectangle_path(rect), color, opacity)
    }

    fn stroke_rectangle(
        &mut self,
        rect: &RotatedRectangleF,
        stroke: &Stroke,
        opacity: f64,
    ) -> Result<(), RenderError> {
        self.stroke(&Self::rectangle_path(rect), stroke, None, opacity)
    }

    fn fill_path(&mut self, path: &Path, color: Color, opacity: f64) -> Result<(), RenderError> {
        self.fill(path, color, opacity)
    }

    fn stroke_path(
        &mut self,
        path: &Path,
        stroke: &Stroke,
        opacity: f64,
    ) -> Result<(), RenderError> {
        self.stroke(path, stroke, None, opacity)
    }

    fn draw_line(
        &mut self,
        from: PointF,
        to: PointF,
        stroke: &Stroke,
        opacity: f64,
    ) -> Result<(), RenderError> {
        self.stroke(&Self::line_path(from, to), stroke, None, opacity)
    }

    fn draw_dashed_line(
        &mut self,
        from: PointF,
        to: PointF,
        stroke: &Stroke,
        dash: &[f64],
        opacity: f64,
    ) -> Result<(), RenderError> {
        self.stroke(&Self::line_path(from, to), stroke, Some(dash), opacity)
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        rect: &RotatedRectangleF,
        opacity: f64,
    ) -> Result<(), RenderError> {
        let source = pixmap_from_image(image)?;
        let placement = Matrix::scaling(
            rect.width / image.width() as f64,
            rect.height / image.height() as f64,
        )
        .then(&Matrix::translation(-rect.width / 2.0, -rect.height / 2.0))
        .then(&Matrix::rotation(rect.angle))
        .then(&Matrix::translation(rect.center_x, rect.center_y))
        .then(&Matrix::scaling(self.scale, self.scale));
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            placement.to_skia(),
            self.clip.as_ref(),
        );
        self.draw_calls += 1;
        Ok(())
    }

    fn clip_to_path(&mut self, path: &Path) -> Result<(), RenderError> {
        let skia_path = Self::to_skia_path(path)
            .ok_or_else(|| RenderError::Surface("empty clip path".to_string()))?;
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())
            .ok_or_else(|| RenderError::Surface("cannot allocate clip mask".to_string()))?;
        mask.fill_path(&skia_path, FillRule::Winding, true, self.transform());
        self.clip = Some(mask);
        Ok(())
    }

    fn reset_clip(&mut self) {
        self.clip = None;
    }
}
