use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CellIdError;
use crate::geometry::{Point, Quad};

/// One of the room's placeable planes. Each owns an independent grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    Floor,
    LeftWall,
    RightWall,
}

impl Surface {
    /// Scan order used wherever surfaces are iterated deterministically
    pub const ALL: [Surface; 3] = [Surface::Floor, Surface::LeftWall, Surface::RightWall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Floor => "floor",
            Surface::LeftWall => "leftWall",
            Surface::RightWall => "rightWall",
        }
    }

    pub fn is_wall(&self) -> bool {
        !matches!(self, Surface::Floor)
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Surface {
    type Err = CellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Surface::ALL
            .into_iter()
            .find(|surface| surface.as_str() == s)
            .ok_or_else(|| CellIdError::UnknownSurface(s.to_string()))
    }
}

/// Corners of a surface as fractions (0..1) of the base image's rendered size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl SurfaceCorners {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn points(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Resolve the fractions against a measured image size, in image-local pixels
    pub fn to_local(&self, width: f32, height: f32) -> Quad {
        let [tl, tr, br, bl] = self.points();
        Quad::new(
            tl.scale_by(width, height),
            tr.scale_by(width, height),
            br.scale_by(width, height),
            bl.scale_by(width, height),
        )
    }

    pub fn in_unit_range(&self) -> bool {
        self.points()
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_round_trip_names() {
        for surface in Surface::ALL {
            assert_eq!(surface.as_str().parse::<Surface>().unwrap(), surface);
        }
        assert!("ceiling".parse::<Surface>().is_err());
    }

    #[test]
    fn test_surface_serde_uses_camel_case() {
        let json = serde_json::to_string(&Surface::LeftWall).unwrap();
        assert_eq!(json, "\"leftWall\"");
    }

    #[test]
    fn test_corners_to_local() {
        let corners = SurfaceCorners::new(
            Point::new(0.0, 0.5),
            Point::new(1.0, 0.5),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        );
        let quad = corners.to_local(200.0, 100.0);
        assert_eq!(quad.corners()[0], Point::new(0.0, 50.0));
        assert_eq!(quad.corners()[2], Point::new(200.0, 100.0));
    }
}
