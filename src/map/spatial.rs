use glam::DVec2;
use std::collections::HashMap;

/// Axis-aligned lon/lat bounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BBox {
    pub const EMPTY: BBox = BBox {
        min: DVec2::splat(f64::INFINITY),
        max: DVec2::splat(f64::NEG_INFINITY),
    };

    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a DVec2>) -> Self {
        points.into_iter().fold(Self::EMPTY, |bbox, p| bbox.expand(*p))
    }

    pub fn expand(self, p: DVec2) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(self, other: BBox) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline(always)]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Even-odd ray cast against one closed ring
pub fn ring_contains(ring: &[DVec2], p: DVec2) -> bool {
    let mut inside = false;
    let mut j = match ring.len() {
        0..=2 => return false,
        n => n - 1,
    };
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Spatial index for features using conservative approximation.
/// Each feature's bounding box is indexed into every cell it overlaps,
/// guaranteeing no false negatives while allowing false positives
/// (eliminated by the caller's exact containment test).
#[derive(Debug)]
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i32, i32) {
        let c = (p / self.cell_size).floor();
        (c.x as i32, c.y as i32)
    }

    /// Index features by bbox; feature ids are their position in the iterator.
    /// Empty boxes are skipped.
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a BBox>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            if bbox.is_empty() {
                continue;
            }
            let (min_x, min_y) = grid.to_cell(bbox.min);
            let (max_x, max_y) = grid.to_cell(bbox.max);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Feature ids whose bbox may contain `p`, in insertion order
    pub fn candidates(&self, p: DVec2) -> &[usize] {
        self.cells
            .get(&self.to_cell(p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x0 + size, y0),
            DVec2::new(x0 + size, y0 + size),
            DVec2::new(x0, y0 + size),
            DVec2::new(x0, y0),
        ]
    }

    #[test]
    fn test_ring_contains() {
        let ring = square(0.0, 0.0, 10.0);
        assert!(ring_contains(&ring, DVec2::new(5.0, 5.0)));
        assert!(!ring_contains(&ring, DVec2::new(15.0, 5.0)));
        assert!(!ring_contains(&ring[..2], DVec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_bbox() {
        let ring = square(-20.0, 10.0, 5.0);
        let bbox = BBox::of_points(&ring);
        assert_eq!(bbox.min, DVec2::new(-20.0, 10.0));
        assert_eq!(bbox.max, DVec2::new(-15.0, 15.0));
        assert!(bbox.contains(DVec2::new(-17.0, 12.0)));
        assert!(BBox::EMPTY.is_empty());
        assert!(!bbox.union(BBox::EMPTY).is_empty());
    }

    #[test]
    fn test_grid_candidates() {
        let boxes = [
            BBox::of_points(&square(0.0, 0.0, 12.0)),
            BBox::of_points(&square(30.0, 30.0, 2.0)),
            BBox::EMPTY,
        ];
        let grid = FeatureGrid::build(boxes.iter(), 5.0);
        assert_eq!(grid.candidates(DVec2::new(11.0, 1.0)), &[0]);
        assert_eq!(grid.candidates(DVec2::new(31.0, 31.0)), &[1]);
        assert!(grid.candidates(DVec2::new(-50.0, -50.0)).is_empty());
    }
}
