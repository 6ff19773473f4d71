//! Vector paths built from move/line/quadratic/cubic/close segments.
//!
//! The string form is a sequence of space separated commands such as
//! `M 0 0 L 10 0 Q 15 5 10 10 Z`. Coordinates are written with the
//! shortest representation that parses back to the same `f64`, so
//! `to_string` and `from_str` are exact inverses.

use std::fmt;
use std::str::FromStr;

use lyon::algorithms::aabb::bounding_box;
use lyon::algorithms::hit_test::hit_test_path;
use lyon::math::point;
use lyon::path::FillRule;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::{Matrix, PointF, RectangleF};

/// Cubic bezier factor approximating a quarter ellipse.
const KAPPA: f64 = 0.552_284_749_830_793_4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(PointF),
    LineTo(PointF),
    QuadraticTo { control: PointF, to: PointF },
    CubicTo {
        control1: PointF,
        control2: PointF,
        to: PointF,
    },
    Close,
}

impl PathSegment {
    fn command(&self) -> char {
        match self {
            PathSegment::MoveTo(_) => 'M',
            PathSegment::LineTo(_) => 'L',
            PathSegment::QuadraticTo { .. } => 'Q',
            PathSegment::CubicTo { .. } => 'C',
            PathSegment::Close => 'Z',
        }
    }

    fn points(&self) -> Vec<PointF> {
        match *self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => vec![p],
            PathSegment::QuadraticTo { control, to } => vec![control, to],
            PathSegment::CubicTo {
                control1,
                control2,
                to,
            } => vec![control1, control2, to],
            PathSegment::Close => Vec::new(),
        }
    }

    fn map_points(&self, f: impl Fn(PointF) -> PointF) -> PathSegment {
        match *self {
            PathSegment::MoveTo(p) => PathSegment::MoveTo(f(p)),
            PathSegment::LineTo(p) => PathSegment::LineTo(f(p)),
            PathSegment::QuadraticTo { control, to } => PathSegment::QuadraticTo {
                control: f(control),
                to: f(to),
            },
            PathSegment::CubicTo {
                control1,
                control2,
                to,
            } => PathSegment::CubicTo {
                control1: f(control1),
                control2: f(control2),
                to: f(to),
            },
            PathSegment::Close => PathSegment::Close,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathParseError {
    #[error("Unknown path command '{0}'")]
    UnknownCommand(String),

    #[error("Path command '{command}' expects {expected} coordinates")]
    MissingCoordinates { command: char, expected: usize },

    #[error("Invalid coordinate '{0}'")]
    InvalidNumber(String),
}

/// Ordered list of path segments.
#[derive(Debug, Clone, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Closed axis-aligned rectangle path.
    pub fn rectangle(rect: &RectangleF) -> Self {
        Path::new()
            .move_to(rect.left, rect.top)
            .line_to(rect.right(), rect.top)
            .line_to(rect.right(), rect.bottom())
            .line_to(rect.left, rect.bottom())
            .close()
    }

    /// Closed ellipse inscribed in `rect`, as four cubic quarter arcs.
    pub fn ellipse(rect: &RectangleF) -> Self {
        let c = rect.center();
        let rx = rect.width / 2.0;
        let ry = rect.height / 2.0;
        let ox = rx * KAPPA;
        let oy = ry * KAPPA;
        Path::new()
            .move_to(c.x + rx, c.y)
            .cubic_to(c.x + rx, c.y + oy, c.x + ox, c.y + ry, c.x, c.y + ry)
            .cubic_to(c.x - ox, c.y + ry, c.x - rx, c.y + oy, c.x - rx, c.y)
            .cubic_to(c.x - rx, c.y - oy, c.x - ox, c.y - ry, c.x, c.y - ry)
            .cubic_to(c.x + ox, c.y - ry, c.x + rx, c.y - oy, c.x + rx, c.y)
            .close()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(PathSegment::MoveTo(PointF::new(x, y)));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(PathSegment::LineTo(PointF::new(x, y)));
        self
    }

    pub fn quadratic_to(mut self, cx: f64, cy: f64, x: f64, y: f64) -> Self {
        self.segments.push(PathSegment::QuadraticTo {
            control: PointF::new(cx, cy),
            to: PointF::new(x, y),
        });
        self
    }

    pub fn cubic_to(mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> Self {
        self.segments.push(PathSegment::CubicTo {
            control1: PointF::new(c1x, c1y),
            control2: PointF::new(c2x, c2y),
            to: PointF::new(x, y),
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(PathSegment::Close);
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every anchor and control point, in segment order.
    pub fn points(&self) -> Vec<PointF> {
        self.segments.iter().flat_map(|s| s.points()).collect()
    }

    /// Returns a copy with every point mapped through `matrix`.
    pub fn transform(&self, matrix: &Matrix) -> Path {
        Path {
            segments: self
                .segments
                .iter()
                .map(|s| s.map_points(|p| matrix.transform_point(p)))
                .collect(),
        }
    }

    /// Converts into a lyon path for flattening, hit-testing and bounds.
    pub fn to_lyon(&self) -> lyon::path::Path {
        let to_lyon_point = |p: PointF| point(p.x as f32, p.y as f32);
        let mut builder = lyon::path::Path::builder();
        let mut open = false;
        let mut current = PointF::ORIGIN;
        let mut subpath_start = PointF::ORIGIN;

        for segment in &self.segments {
            if let PathSegment::MoveTo(p) = segment {
                if open {
                    builder.end(false);
                }
                builder.begin(to_lyon_point(*p));
                open = true;
                current = *p;
                subpath_start = *p;
                continue;
            }
            if let PathSegment::Close = segment {
                if open {
                    builder.end(true);
                    open = false;
                }
                current = subpath_start;
                continue;
            }
            if !open {
                builder.begin(to_lyon_point(current));
                subpath_start = current;
                open = true;
            }
            match *segment {
                PathSegment::LineTo(to) => {
                    builder.line_to(to_lyon_point(to));
                    current = to;
                }
                PathSegment::QuadraticTo { control, to } => {
                    builder.quadratic_bezier_to(to_lyon_point(control), to_lyon_point(to));
                    current = to;
                }
                PathSegment::CubicTo {
                    control1,
                    control2,
                    to,
                } => {
                    builder.cubic_bezier_to(
                        to_lyon_point(control1),
                        to_lyon_point(control2),
                        to_lyon_point(to),
                    );
                    current = to;
                }
                PathSegment::MoveTo(_) | PathSegment::Close => {}
            }
        }
        if open {
            builder.end(false);
        }
        builder.build()
    }

    /// Tight axis-aligned bounds of the curve, or `None` for an empty path.
    pub fn bounds(&self) -> Option<RectangleF> {
        if self.points().is_empty() {
            return None;
        }
        let bb = bounding_box(self.to_lyon().iter());
        Some(RectangleF::from_ltrb(
            bb.min.x as f64,
            bb.min.y as f64,
            bb.max.x as f64,
            bb.max.y as f64,
        ))
    }

    /// Bounds of the anchor and control points, which contain the curve.
    pub fn control_bounds(&self) -> Option<RectangleF> {
        RectangleF::from_points(self.points())
    }

    /// Fill hit-test with the non-zero rule.
    pub fn contains(&self, p: PointF, tolerance: f64) -> bool {
        hit_test_path(
            &point(p.x as f32, p.y as f32),
            self.to_lyon().iter(),
            FillRule::NonZero,
            tolerance as f32,
        )
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", segment.command())?;
            for p in segment.points() {
                write!(f, " {} {}", p.x, p.y)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace().peekable();
        let mut segments = Vec::new();

        while let Some(token) = tokens.next() {
            let command = match token {
                "M" | "L" | "Q" | "C" | "Z" => token.chars().next().unwrap_or('Z'),
                other => return Err(PathParseError::UnknownCommand(other.to_string())),
            };
            let expected = match command {
                'M' | 'L' => 2,
                'Q' => 4,
                'C' => 6,
                _ => 0,
            };
            let mut values = Vec::with_capacity(expected);
            for _ in 0..expected {
                let raw = tokens
                    .next()
                    .ok_or(PathParseError::MissingCoordinates { command, expected })?;
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| PathParseError::InvalidNumber(raw.to_string()))?;
                values.push(value);
            }
            let pt = |i: usize| PointF::new(values[i], values[i + 1]);
            segments.push(match command {
                'M' => PathSegment::MoveTo(pt(0)),
                'L' => PathSegment::LineTo(pt(0)),
                'Q' => PathSegment::QuadraticTo {
                    control: pt(0),
                    to: pt(2),
                },
                'C' => PathSegment::CubicTo {
                    control1: pt(0),
                    control2: pt(2),
                    to: pt(4),
                },
                _ => PathSegment::Close,
            });
        }

        Ok(Path { segments })
    }
}

/// Paths are equal when their string forms are equal.
impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
