mod interpolation;

pub use interpolation::{bilinear, lerp_point, ViewTransform};

use serde::{Deserialize, Serialize};

/// A 2D point, either image-local or screen space.
///
/// The two spaces are never mixed: image-local points only become screen
/// points through a [`ViewTransform`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation toward another point
    pub fn lerp(&self, target: &Point, t: f32) -> Point {
        Point {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    /// Distance to another point
    pub fn distance_to(&self, other: &Point) -> f32 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance, for comparisons that don't need the root
    pub fn distance_sq(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Scale image fractions (0..1) into pixels of the given size
    pub fn scale_by(&self, width: f32, height: f32) -> Point {
        Point::new(self.x * width, self.y * height)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Smallest box holding every point. `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Bounds> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Clamp a point into the box
    pub fn clamp(&self, p: &Point) -> Point {
        Point::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// A four-cornered polygon, ordered top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self([top_left, top_right, bottom_right, bottom_left])
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.0
    }

    /// Average of the four corners
    pub fn centroid(&self) -> Point {
        let sum = self
            .0
            .iter()
            .fold(Point::default(), |acc, p| acc.offset(p.x, p.y));
        Point::new(sum.x / 4.0, sum.y / 4.0)
    }

    /// Even-odd ray casting containment test.
    pub fn contains(&self, p: &Point) -> bool {
        let mut inside = false;
        let mut j = 3;
        for i in 0..4 {
            let a = self.0[i];
            let b = self.0[j];
            if (a.y > p.y) != (b.y > p.y) {
                let cross_x = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    pub fn map(&self, f: impl Fn(&Point) -> Point) -> Quad {
        Quad([f(&self.0[0]), f(&self.0[1]), f(&self.0[2]), f(&self.0[3])])
    }

    pub fn bounds(&self) -> Bounds {
        // Four points, never empty
        Bounds::from_points(self.0.iter()).unwrap_or(Bounds {
            min: self.0[0],
            max: self.0[0],
        })
    }
}
