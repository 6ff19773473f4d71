//! Geometry kernel: points, affine matrices, axis-aligned and rotated
//! rectangles, and paths. Everything here is stateless value math.

mod matrix;
mod path;
mod point;
mod rectangle;
mod rotated_rectangle;

pub use matrix::Matrix;
pub use path::{Path, PathParseError, PathSegment};
pub use point::PointF;
pub use rectangle::RectangleF;
pub use rotated_rectangle::RotatedRectangleF;
