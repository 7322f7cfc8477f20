//! C2: a bounding volume hierarchy over a mesh's triangles.
//!
//! Stored as an index-addressed arena (`Vec<BvhNode>`) rather than a
//! heap-allocated tree of boxed nodes — the arena sidesteps ownership
//! questions during the branch-and-bound recursion below and keeps nodes
//! contiguous for better cache behavior during a build that can visit
//! hundreds of thousands of voxels.

use crate::geometry::aabb::{Aabb, Bounded};
use crate::geometry::ray::Ray;
use crate::geometry::triangle::Triangle;
use crate::Real;
use crate::{Point3, EPSILON};

const LEAF_SIZE: usize = 4;
const MAX_DEPTH: u32 = 20;

/// The payload of a [`BvhNode`]: either a leaf holding triangle indices,
/// or an internal node pointing at two children elsewhere in the arena.
#[derive(Debug, Clone)]
enum BvhNodeKind {
    Leaf(Vec<usize>),
    Internal { left: usize, right: usize },
}

/// A single node of the hierarchy. Every node's `aabb` encloses every
/// triangle in its subtree, and a parent's `aabb` encloses both children's.
#[derive(Debug, Clone)]
struct BvhNode {
    aabb: Aabb,
    kind: BvhNodeKind,
}

/// A bounding volume hierarchy built once (immutably) over a mesh's
/// triangles, answering closest-point and ray-parity queries in
/// `O(log n)` expected time.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<Triangle>,
}

impl Bvh {
    /// Builds a BVH over `triangles` by top-down median split: the root
    /// covers the AABB of all triangles; at each node, if the index set
    /// has `<= 4` members or recursion depth exceeds `20`, it becomes a
    /// leaf; otherwise the node picks its AABB's longest axis, sorts its
    /// triangles by centroid on that axis, and splits at the median.
    ///
    /// An empty `triangles` slice produces an empty BVH whose queries
    /// answer `+infinity` / `0`, per the spec's degenerate-input contract.
    /// Degenerate (zero-area) triangles are silently dropped — callers
    /// are expected to have filtered them during mesh load.
    pub fn build(triangles: &[Triangle]) -> Bvh {
        let triangles: Vec<Triangle> = triangles.iter().copied().filter(|t| !t.is_degenerate()).collect();
        let mut nodes = Vec::new();
        if !triangles.is_empty() {
            let indices: Vec<usize> = (0..triangles.len()).collect();
            build_recursive(&triangles, indices, 0, &mut nodes);
        }
        Bvh { nodes, triangles }
    }

    fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.nodes.len() - 1)
        }
    }

    /// `true` iff the BVH was built from an empty (or fully degenerate)
    /// triangle set.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of triangles retained in the BVH (after degenerate filtering).
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// The AABB of the BVH's root, i.e. of the whole triangle set.
    pub fn bounds(&self) -> Aabb {
        match self.root() {
            Some(r) => self.nodes[r].aabb,
            None => Aabb::empty(),
        }
    }

    /// Closest Euclidean distance from `p` to any triangle in the mesh,
    /// via branch-and-bound pruning: any node whose AABB distance already
    /// exceeds the current best is skipped without descending. Returns
    /// `+infinity` for an empty BVH.
    pub fn closest_distance(&self, p: Point3) -> Real {
        let mut best = Real::INFINITY;
        if let Some(root) = self.root() {
            self.closest_distance_rec(root, p, &mut best);
        }
        best
    }

    fn closest_distance_rec(&self, node_idx: usize, p: Point3, best: &mut Real) {
        let node = &self.nodes[node_idx];
        if node.aabb.distance_to_point(&p) >= *best {
            return;
        }
        match &node.kind {
            BvhNodeKind::Leaf(indices) => {
                for &i in indices {
                    let tri = &self.triangles[i];
                    // Conservative bounding-sphere quick reject before the
                    // full (more expensive) point-to-triangle test.
                    let radius = 0.6 * tri.max_edge_length();
                    let to_centroid = (p - tri.centroid()).length();
                    if to_centroid - radius >= *best {
                        continue;
                    }
                    let d = tri.distance_to_point(p);
                    if d < *best {
                        *best = d;
                    }
                }
            }
            BvhNodeKind::Internal { left, right } => {
                let (left, right) = (*left, *right);
                let d_left = self.nodes[left].aabb.distance_to_point(&p);
                let d_right = self.nodes[right].aabb.distance_to_point(&p);
                let (near, far, d_far) = if d_left <= d_right {
                    (left, right, d_right)
                } else {
                    (right, left, d_left)
                };
                self.closest_distance_rec(near, p, best);
                if d_far < *best {
                    self.closest_distance_rec(far, p, best);
                }
            }
        }
    }

    /// Total count of ray/triangle intersections (not parity) along `ray`,
    /// using `t > EPSILON` to exclude origin-on-surface hits. Subtrees
    /// whose AABB the ray misses are pruned entirely. Returns `0` for an
    /// empty BVH.
    pub fn count_intersections(&self, ray: &Ray) -> usize {
        let mut count = 0;
        if let Some(root) = self.root() {
            self.count_intersections_rec(root, ray, &mut count);
        }
        count
    }

    fn count_intersections_rec(&self, node_idx: usize, ray: &Ray, count: &mut usize) {
        let node = &self.nodes[node_idx];
        if !ray.intersects_aabb(&node.aabb) {
            return;
        }
        match &node.kind {
            BvhNodeKind::Leaf(indices) => {
                for &i in indices {
                    if ray.intersects_triangle(&self.triangles[i]).is_some() {
                        *count += 1;
                    }
                }
            }
            BvhNodeKind::Internal { left, right } => {
                self.count_intersections_rec(*left, ray, count);
                self.count_intersections_rec(*right, ray, count);
            }
        }
    }

    /// Brute-force closest distance, ignoring the tree entirely. Kept
    /// (`cfg(test)`-free, not just a test helper) because it doubles as
    /// the reference implementation callers can use to sanity-check a
    /// build against in integration tests (P2).
    pub fn brute_force_closest_distance(triangles: &[Triangle], p: Point3) -> Real {
        triangles
            .iter()
            .map(|t| t.distance_to_point(p))
            .fold(Real::INFINITY, Real::min)
    }

    /// Brute-force intersection count, ignoring the tree entirely (P3).
    pub fn brute_force_count_intersections(triangles: &[Triangle], ray: &Ray) -> usize {
        triangles
            .iter()
            .filter(|t| ray.intersects_triangle(t).is_some())
            .count()
    }
}

fn build_recursive(triangles: &[Triangle], indices: Vec<usize>, depth: u32, nodes: &mut Vec<BvhNode>) -> usize {
    let aabb = indices
        .iter()
        .fold(Aabb::empty(), |acc, &i| acc.union(&triangles[i].aabb()));

    if indices.len() <= LEAF_SIZE || depth > MAX_DEPTH {
        nodes.push(BvhNode {
            aabb,
            kind: BvhNodeKind::Leaf(indices),
        });
        return nodes.len() - 1;
    }

    let axis = aabb.largest_axis();
    let mut indices = indices;
    indices.sort_by(|&a, &b| {
        triangles[a].centroid()[axis]
            .partial_cmp(&triangles[b].centroid()[axis])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mid = indices.len() / 2;
    let right_indices = indices.split_off(mid);

    let left = build_recursive(triangles, indices, depth + 1, nodes);
    let right = build_recursive(triangles, right_indices, depth + 1, nodes);

    nodes.push(BvhNode {
        aabb,
        kind: BvhNodeKind::Internal { left, right },
    });
    nodes.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector3;

    /// `true` iff every node's AABB strictly (within `EPSILON`) encloses
    /// every vertex of every triangle in its subtree (P1).
    fn check_aabb_invariant(bvh: &Bvh) -> bool {
        bvh.root().map(|root| check_node(bvh, root)).unwrap_or(true)
    }

    fn check_node(bvh: &Bvh, idx: usize) -> bool {
        let node = &bvh.nodes[idx];
        let pad = Point3::splat(EPSILON * 10.0);
        let contains = |v: Point3| v.cmpge(node.aabb.min - pad).all() && v.cmple(node.aabb.max + pad).all();
        match &node.kind {
            BvhNodeKind::Leaf(indices) => indices.iter().all(|&i| {
                let t = &bvh.triangles[i];
                contains(t.v0) && contains(t.v1) && contains(t.v2)
            }),
            BvhNodeKind::Internal { left, right } => {
                let l = &bvh.nodes[*left].aabb;
                let r = &bvh.nodes[*right].aabb;
                let encloses =
                    |child: &Aabb| child.min.cmpge(node.aabb.min - pad).all() && child.max.cmple(node.aabb.max + pad).all();
                encloses(l) && encloses(r) && check_node(bvh, *left) && check_node(bvh, *right)
            }
        }
    }

    fn cube_triangles() -> Vec<Triangle> {
        // A coarse closed cube of side 2, centered at origin.
        let p = [
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, 1.0),
        ];
        let quads = [
            [0, 1, 2, 3], // -z
            [5, 4, 7, 6], // +z
            [4, 0, 3, 7], // -x
            [1, 5, 6, 2], // +x
            [4, 5, 1, 0], // -y
            [3, 2, 6, 7], // +y
        ];
        let mut tris = Vec::new();
        for q in quads {
            tris.push(Triangle::new(p[q[0]], p[q[1]], p[q[2]]));
            tris.push(Triangle::new(p[q[0]], p[q[2]], p[q[3]]));
        }
        tris
    }

    #[test]
    fn empty_bvh_answers_defaults() {
        let bvh = Bvh::build(&[]);
        assert!(bvh.is_empty());
        assert_eq!(bvh.closest_distance(Point3::ZERO), Real::INFINITY);
        let ray = Ray::new(Point3::ZERO, Vector3::X);
        assert_eq!(bvh.count_intersections(&ray), 0);
    }

    #[test]
    fn aabb_invariant_holds_for_cube() {
        let tris = cube_triangles();
        let bvh = Bvh::build(&tris);
        assert!(check_aabb_invariant(&bvh));
    }

    #[test]
    fn closest_distance_matches_brute_force() {
        use approx::assert_relative_eq;
        let tris = cube_triangles();
        let bvh = Bvh::build(&tris);
        for p in [
            Point3::ZERO,
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.3, -0.7, 1.8),
            Point3::new(5.0, 5.0, 5.0),
        ] {
            let got = bvh.closest_distance(p);
            let want = Bvh::brute_force_closest_distance(&tris, p);
            assert_relative_eq!(got, want, epsilon = 1e-9);
        }
    }

    #[test]
    fn count_intersections_matches_brute_force() {
        let tris = cube_triangles();
        let bvh = Bvh::build(&tris);
        let rays = [
            Ray::new(Point3::new(-5.0, 0.0, 0.0), Vector3::X),
            Ray::new(Point3::new(0.0, -5.0, 0.3), Vector3::Y),
            Ray::new(Point3::new(5.0, 5.0, 5.0), Vector3::new(-1.0, -1.0, -1.0)),
        ];
        for ray in rays {
            let got = bvh.count_intersections(&ray);
            let want = Bvh::brute_force_count_intersections(&tris, &ray);
            assert_eq!(got, want);
        }
    }

    fn coord_strategy() -> impl proptest::strategy::Strategy<Value = f64> {
        use proptest::prelude::*;
        (-20i32..20).prop_map(|x| x as f64 * 0.37)
    }

    fn triangle_strategy() -> impl proptest::strategy::Strategy<Value = Triangle> {
        use proptest::prelude::*;
        (coord_strategy(), coord_strategy(), coord_strategy(), coord_strategy(), coord_strategy(), coord_strategy(), coord_strategy(), coord_strategy(), coord_strategy())
            .prop_map(|(x0, y0, z0, x1, y1, z1, x2, y2, z2)| {
                Triangle::new(
                    Point3::new(x0, y0, z0),
                    Point3::new(x1, y1, z1),
                    Point3::new(x2, y2, z2),
                )
            })
            .prop_filter("degenerate", |t| !t.is_degenerate())
    }

    proptest::proptest! {
        #[test]
        fn prop_aabb_invariant_holds(tris in proptest::collection::vec(triangle_strategy(), 1..40)) {
            let bvh = Bvh::build(&tris);
            proptest::prop_assert!(check_aabb_invariant(&bvh));
        }

        #[test]
        fn prop_closest_distance_matches_brute_force(
            tris in proptest::collection::vec(triangle_strategy(), 1..40),
            px in coord_strategy(), py in coord_strategy(), pz in coord_strategy(),
        ) {
            let bvh = Bvh::build(&tris);
            let p = Point3::new(px, py, pz);
            let got = bvh.closest_distance(p);
            let want = Bvh::brute_force_closest_distance(&tris, p);
            proptest::prop_assert!((got - want).abs() < 1e-6, "got {} want {}", got, want);
        }

        #[test]
        fn prop_count_intersections_matches_brute_force(
            tris in proptest::collection::vec(triangle_strategy(), 1..40),
            ox in coord_strategy(), oy in coord_strategy(), oz in coord_strategy(),
            dx in coord_strategy(), dy in coord_strategy(), dz in coord_strategy(),
        ) {
            proptest::prop_assume!(dx.abs() + dy.abs() + dz.abs() > 1e-6);
            let bvh = Bvh::build(&tris);
            let ray = Ray::new(Point3::new(ox, oy, oz), Vector3::new(dx, dy, dz));
            let got = bvh.count_intersections(&ray);
            let want = Bvh::brute_force_count_intersections(&tris, &ray);
            proptest::prop_assert_eq!(got, want);
        }
    }
}
