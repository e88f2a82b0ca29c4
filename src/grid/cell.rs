use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CellIdError;
use crate::geometry::{Point, Quad};

use super::Surface;

/// Address of one grid cell, formatted as `{surface}-{row}-{col}` (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellId {
    pub surface: Surface,
    pub row: u32,
    pub col: u32,
}

impl CellId {
    pub const fn new(surface: Surface, row: u32, col: u32) -> Self {
        Self { surface, row, col }
    }

    /// Shift by a signed row/column delta. `None` if the result leaves the 1-indexed range.
    pub fn translate(&self, d_row: i64, d_col: i64) -> Option<CellId> {
        let row = i64::from(self.row) + d_row;
        let col = i64::from(self.col) + d_col;
        if row < 1 || col < 1 {
            return None;
        }
        Some(CellId::new(
            self.surface,
            u32::try_from(row).ok()?,
            u32::try_from(col).ok()?,
        ))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.surface, self.row, self.col)
    }
}

impl FromStr for CellId {
    type Err = CellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Surface names never contain '-', so split from the right
        let mut parts = s.rsplitn(3, '-');
        let (Some(col), Some(row), Some(surface)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CellIdError::Malformed(s.to_string()));
        };
        let surface: Surface = surface.parse()?;
        let row: u32 = row
            .parse()
            .map_err(|_| CellIdError::Malformed(s.to_string()))?;
        let col: u32 = col
            .parse()
            .map_err(|_| CellIdError::Malformed(s.to_string()))?;
        if row == 0 || col == 0 {
            return Err(CellIdError::ZeroIndex(s.to_string()));
        }
        Ok(CellId::new(surface, row, col))
    }
}

impl TryFrom<String> for CellId {
    type Error = CellIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> Self {
        id.to_string()
    }
}

/// One subdivided cell of a surface, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub id: CellId,
    /// top-left, top-right, bottom-right, bottom-left
    pub vertices: Quad,
    pub center: Point,
}

impl GridCell {
    pub fn new(id: CellId, vertices: Quad) -> Self {
        let center = vertices.centroid();
        Self {
            id,
            vertices,
            center,
        }
    }

    pub fn surface(&self) -> Surface {
        self.id.surface
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.vertices.contains(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cell_id() {
        assert_eq!(CellId::new(Surface::LeftWall, 3, 12).to_string(), "leftWall-3-12");
    }

    #[test]
    fn test_parse_cell_id() {
        let id: CellId = "rightWall-11-2".parse().unwrap();
        assert_eq!(id, CellId::new(Surface::RightWall, 11, 2));
    }

    #[test]
    fn test_parse_rejects_bad_ids() {
        assert!(matches!(
            "floor-0-1".parse::<CellId>(),
            Err(CellIdError::ZeroIndex(_))
        ));
        assert!(matches!(
            "floor-1".parse::<CellId>(),
            Err(CellIdError::Malformed(_))
        ));
        assert!(matches!(
            "roof-1-1".parse::<CellId>(),
            Err(CellIdError::UnknownSurface(_))
        ));
        assert!(matches!(
            "floor-a-1".parse::<CellId>(),
            Err(CellIdError::Malformed(_))
        ));
    }

    #[test]
    fn test_cell_id_serializes_as_string() {
        let id = CellId::new(Surface::Floor, 1, 2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"floor-1-2\"");
        let back: CellId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_translate_stays_one_indexed() {
        let id = CellId::new(Surface::Floor, 2, 2);
        assert_eq!(id.translate(1, -1), Some(CellId::new(Surface::Floor, 3, 1)));
        assert_eq!(id.translate(-2, 0), None);
    }
}
