//! Surface grid generation.
//!
//! A surface outline is a skewed quad given as image fractions. It is
//! subdivided as a bilinear patch into `divisions x divisions` cells in
//! image-local pixels, then every vertex goes through one pan/zoom
//! similarity transform so all consumers see a single screen space.

use serde::{Deserialize, Serialize};

use crate::geometry::{bilinear, Point, Quad, ViewTransform};

use super::{CellId, GridCell, Surface, SurfaceCorners};

/// Subdivision count observed in the room screens
pub const DEFAULT_DIVISIONS: u32 = 12;

/// Upper bound on subdivisions, keeping every cell count well inside `u32`
pub const MAX_DIVISIONS: u32 = 256;

/// Measured pixel size of the base room image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

impl ImageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// An image that hasn't been laid out yet reports zero; grids wait for it
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Pan and zoom of the room view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub pan: Point,
    #[serde(default = "default_zoom")]
    pub zoom: f32,
    /// Where the image's top-left sits inside the overlay
    #[serde(default)]
    pub container_offset: Point,
}

fn default_zoom() -> f32 {
    1.0
}

impl ViewState {
    pub fn transform(&self, image: &ImageSize) -> ViewTransform {
        ViewTransform {
            image_center: image.center(),
            scale: self.zoom,
            pan: self.pan,
            container_offset: self.container_offset,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: default_zoom(),
            container_offset: Point::default(),
        }
    }
}

/// A debug line segment of the subdivision, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Every cell of one surface plus its outline, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    pub surface: Surface,
    pub divisions: u32,
    /// Row-major: `floor-1-1`, `floor-1-2`, ... `floor-N-N`
    pub cells: Vec<GridCell>,
    pub lines: Vec<GridLine>,
    /// The surface quad's corners, for containment tests
    pub polygon: Quad,
}

impl SurfaceGrid {
    pub fn cell(&self, row: u32, col: u32) -> Option<&GridCell> {
        if row == 0 || col == 0 || row > self.divisions || col > self.divisions {
            return None;
        }
        let index = (row - 1) as usize * self.divisions as usize + (col - 1) as usize;
        self.cells.get(index)
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.polygon.contains(p)
    }
}

/// Subdivide one surface. Returns `None` until the image has a measured size,
/// or when `divisions` is zero or above [`MAX_DIVISIONS`].
pub fn generate_surface_grid(
    surface: Surface,
    corners: &SurfaceCorners,
    divisions: u32,
    image: &ImageSize,
    view: &ViewState,
) -> Option<SurfaceGrid> {
    if !image.is_measured() || divisions == 0 || divisions > MAX_DIVISIONS {
        return None;
    }

    let local = corners.to_local(image.width, image.height);
    let transform = view.transform(image);
    let n = divisions as f32;

    let mut cells = Vec::with_capacity((divisions * divisions) as usize);
    for j in 0..divisions {
        let v0 = j as f32 / n;
        let v1 = (j + 1) as f32 / n;
        for i in 0..divisions {
            let u0 = i as f32 / n;
            let u1 = (i + 1) as f32 / n;
            let vertices = Quad::new(
                bilinear(&local, u0, v0),
                bilinear(&local, u1, v0),
                bilinear(&local, u1, v1),
                bilinear(&local, u0, v1),
            )
            .map(|p| transform.apply(p));
            cells.push(GridCell::new(CellId::new(surface, j + 1, i + 1), vertices));
        }
    }

    let mut lines = Vec::with_capacity(2 * (divisions as usize + 1));
    for k in 0..=divisions {
        let t = k as f32 / n;
        lines.push(GridLine {
            from: transform.apply(&bilinear(&local, 0.0, t)),
            to: transform.apply(&bilinear(&local, 1.0, t)),
        });
        lines.push(GridLine {
            from: transform.apply(&bilinear(&local, t, 0.0)),
            to: transform.apply(&bilinear(&local, t, 1.0)),
        });
    }

    Some(SurfaceGrid {
        surface,
        divisions,
        cells,
        lines,
        polygon: local.map(|p| transform.apply(p)),
    })
}
