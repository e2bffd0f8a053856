use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Axis-aligned square cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Square {
    pub center: Vec2,
    pub half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points.iter().filter(|point| point.x.is_finite() && point.y.is_finite()) {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        if !min.x.is_finite() || !max.x.is_finite() {
            return None;
        }

        let span = (max.x - min.x).max(max.y - min.y).max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub fn contains(self, point: Vec2) -> bool {
        let offset = point - self.center;
        offset.x.abs() <= self.half_extent && offset.y.abs() <= self.half_extent
    }

    pub fn side(self) -> f32 {
        self.half_extent * 2.0
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if quadrant & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if quadrant & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half_extent: quarter,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    /// Squared gap between two squares; zero when they touch or overlap.
    pub fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        dx * dx + dy * dy
    }
}

/// Quadtree cell carrying the aggregate mass used by the Barnes-Hut
/// approximation. Leaves hold node indices, inner cells hold children.
pub struct QuadNode {
    pub bounds: Square,
    pub center_of_mass: Vec2,
    pub mass: f32,
    pub indices: Vec<usize>,
    pub children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    /// `None` when no position is finite.
    pub fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = Square::enclosing(positions)?;
        let indices = (0..positions.len())
            .filter(|&index| positions[index].x.is_finite() && positions[index].y.is_finite())
            .collect::<Vec<_>>();
        Some(Self::subdivide(bounds, indices, positions, 0))
    }

    fn subdivide(bounds: Square, indices: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = indices.len() as f32;
        let center_of_mass = if indices.is_empty() {
            bounds.center
        } else {
            indices
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + positions[index])
                / mass
        };

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_of(positions[index])].push(index);
        }

        // Coincident points never separate; keep them in one leaf.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                node.children[quadrant] = Some(Box::new(Self::subdivide(
                    bounds.quadrant(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        node.indices.clear();
        node
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

/// Flattened cell for drawing the tree as an overlay.
#[derive(Clone, Copy, Debug)]
pub struct QuadtreeCell {
    pub bounds: Square,
    pub depth: usize,
    pub is_leaf: bool,
}

pub fn collect_cells(node: &QuadNode, depth: usize, cells: &mut Vec<QuadtreeCell>) {
    cells.push(QuadtreeCell {
        bounds: node.bounds,
        depth,
        is_leaf: node.is_leaf(),
    });
    for child in node.children() {
        collect_cells(child, depth + 1, cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|index| vec2((index % 10) as f32 * 13.0, (index / 10) as f32 * 17.0))
            .collect()
    }

    fn leaf_indices(node: &QuadNode, out: &mut Vec<usize>) {
        out.extend_from_slice(&node.indices);
        for child in node.children() {
            leaf_indices(child, out);
        }
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = grid(100);
        let tree = QuadNode::build(&positions).unwrap();
        assert!(!tree.is_leaf());
        assert_eq!(tree.mass, 100.0);

        let mut indices = Vec::new();
        leaf_indices(&tree, &mut indices);
        indices.sort_unstable();
        assert_eq!(indices, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn root_center_of_mass_is_the_mean() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(5.0, 30.0)];
        let tree = QuadNode::build(&positions).unwrap();
        assert!((tree.center_of_mass - vec2(5.0, 10.0)).length() < 1e-5);
        assert!(positions.iter().all(|point| tree.bounds.contains(*point)));
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(3.0, 3.0); 40];
        let tree = QuadNode::build(&positions).unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.indices.len(), 40);
    }

    #[test]
    fn non_finite_positions_are_left_out() {
        let positions = vec![vec2(f32::NAN, 0.0), vec2(1.0, 1.0)];
        let tree = QuadNode::build(&positions).unwrap();
        assert_eq!(tree.indices, [1]);
        assert!(QuadNode::build(&[vec2(f32::INFINITY, 0.0)]).is_none());
    }

    #[test]
    fn gap_between_separated_squares() {
        let a = Square {
            center: vec2(0.0, 0.0),
            half_extent: 1.0,
        };
        let b = Square {
            center: vec2(5.0, 0.0),
            half_extent: 1.0,
        };
        assert_eq!(a.gap_sq(b), 9.0);
        assert_eq!(a.gap_sq(a), 0.0);
    }
}
