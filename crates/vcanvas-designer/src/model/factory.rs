//! String-keyed construction table for v-objects.

use std::collections::HashMap;

use super::VObject;
use crate::geometry::{PointF, RectangleF};

/// Builds a default object of one type covering the given rectangle.
pub type ObjectConstructor = fn(RectangleF) -> VObject;

/// Registry mapping type tags to constructors.
///
/// Pre-populated with every built-in type; hosts may register additional
/// tags that build customised variants.
#[derive(Debug, Clone)]
pub struct ObjectFactory {
    constructors: HashMap<String, ObjectConstructor>,
}

impl Default for ObjectFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectFactory {
    pub fn new() -> Self {
        let mut factory = Self {
            constructors: HashMap::new(),
        };
        factory.register("Rectangle", VObject::rectangle_shape);
        factory.register("Ellipse", VObject::ellipse);
        factory.register("Line", |r| {
            VObject::line(PointF::new(r.left, r.top), PointF::new(r.right(), r.bottom()))
        });
        factory.register("DashedLine", |r| {
            VObject::dashed_line(
                PointF::new(r.left, r.top),
                PointF::new(r.right(), r.bottom()),
                vec![4.0, 2.0],
            )
        });
        factory.register("Polyline", |r| {
            VObject::polyline(
                &[
                    PointF::new(r.left, r.bottom()),
                    r.center(),
                    PointF::new(r.right(), r.top),
                ],
                false,
            )
        });
        factory.register("Grid", |r| VObject::grid(r, 10.0, 10.0));
        factory.register("Image", |r| VObject::image(r, ""));
        factory.register("Svg", |r| VObject::svg(r, ""));
        factory.register("Text", |r| VObject::text(r, "", false));
        factory.register("BoundedText", |r| VObject::text(r, "", true));
        factory.register("Placeholder", VObject::placeholder);
        factory
    }

    /// Registers (or replaces) the constructor for `type_name`.
    pub fn register(&mut self, type_name: &str, constructor: ObjectConstructor) {
        self.constructors.insert(type_name.to_string(), constructor);
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Creates a detached object of the given type, or `None` for an
    /// unknown tag.
    pub fn create_object_by_type(&self, type_name: &str, rect: RectangleF) -> Option<VObject> {
        let constructor = self.constructors.get(type_name)?;
        Some(constructor(rect))
    }
}
