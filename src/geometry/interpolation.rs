use serde::{Deserialize, Serialize};

use super::{Point, Quad};

/// Interpolate between two points, unclamped so grid edges land exactly on corners
pub fn lerp_point(from: &Point, to: &Point, t: f32) -> Point {
    from.lerp(to, t)
}

/// Bilinear patch sample: `u` runs along the top and bottom edges,
/// `v` runs from the top edge toward the bottom edge.
///
/// Works for skewed quads, which is what perspective floor and wall
/// outlines look like.
pub fn bilinear(quad: &Quad, u: f32, v: f32) -> Point {
    let [top_left, top_right, bottom_right, bottom_left] = quad.corners();
    let top = lerp_point(top_left, top_right, u);
    let bottom = lerp_point(bottom_left, bottom_right, u);
    lerp_point(&top, &bottom, v)
}

/// Pan/zoom similarity transform from image-local to screen space.
///
/// `screen = (local - image_center) * scale + image_center + pan + container_offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub image_center: Point,
    pub scale: f32,
    pub pan: Point,
    pub container_offset: Point,
}

impl ViewTransform {
    pub fn identity() -> Self {
        Self {
            image_center: Point::default(),
            scale: 1.0,
            pan: Point::default(),
            container_offset: Point::default(),
        }
    }

    pub fn apply(&self, local: &Point) -> Point {
        Point::new(
            (local.x - self.image_center.x) * self.scale
                + self.image_center.x
                + self.pan.x
                + self.container_offset.x,
            (local.y - self.image_center.y) * self.scale
                + self.image_center.y
                + self.pan.y
                + self.container_offset.y,
        )
    }

    /// Screen back to image-local. Returns `None` for a degenerate zero scale.
    pub fn invert(&self, screen: &Point) -> Option<Point> {
        if self.scale == 0.0 {
            return None;
        }
        Some(Point::new(
            (screen.x - self.container_offset.x - self.pan.x - self.image_center.x) / self.scale
                + self.image_center.x,
            (screen.y - self.container_offset.y - self.pan.y - self.image_center.y) / self.scale
                + self.image_center.y,
        ))
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilinear_hits_corners() {
        let quad = Quad::new(
            Point::new(10.0, 0.0),
            Point::new(50.0, 5.0),
            Point::new(40.0, 30.0),
            Point::new(0.0, 20.0),
        );
        assert_eq!(bilinear(&quad, 0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(bilinear(&quad, 1.0, 0.0), Point::new(50.0, 5.0));
        assert_eq!(bilinear(&quad, 1.0, 1.0), Point::new(40.0, 30.0));
        assert_eq!(bilinear(&quad, 0.0, 1.0), Point::new(0.0, 20.0));
    }

    #[test]
    fn test_view_transform_zoom_about_center() {
        let view = ViewTransform {
            image_center: Point::new(50.0, 50.0),
            scale: 2.0,
            pan: Point::default(),
            container_offset: Point::default(),
        };
        // The center is a fixed point of the zoom
        assert_eq!(view.apply(&Point::new(50.0, 50.0)), Point::new(50.0, 50.0));
        assert_eq!(view.apply(&Point::new(60.0, 40.0)), Point::new(70.0, 30.0));
    }

    #[test]
    fn test_view_transform_round_trip() {
        let view = ViewTransform {
            image_center: Point::new(40.0, 20.0),
            scale: 1.5,
            pan: Point::new(-3.0, 7.0),
            container_offset: Point::new(1.0, 1.0),
        };
        let local = Point::new(12.0, 33.0);
        let back = view.invert(&view.apply(&local)).unwrap();
        assert!((back.x - local.x).abs() < 1e-4);
        assert!((back.y - local.y).abs() < 1e-4);
    }
}
