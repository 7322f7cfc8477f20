//! C3: a uniform-grid signed distance field built from a mesh's BVH.

use crate::bvh::Bvh;
use crate::error::SdfError;
use crate::geometry::ray::Ray;
use crate::mesh::Mesh;
use crate::{Point3, Real, Vector3};
use rayon::prelude::*;

/// Fraction by which the mesh AABB is padded on each side to form the
/// grid bounds, per face.
const PADDING_FRACTION: Real = 0.1;

/// A dense `R x R x R` grid of signed distances built once from a mesh in
/// its local frame. Sampling is trilinear (continuous, but only C0); the
/// gradient is piecewise-constant central differences.
#[derive(Debug, Clone)]
pub struct Sdf {
    resolution: usize,
    grid_min: Point3,
    grid_max: Point3,
    cell_size: Vector3,
    data: Vec<Real>,
}

impl Sdf {
    /// Builds a signed distance field over `mesh` at `resolution` samples
    /// per axis (`resolution >= 2`).
    ///
    /// The grid bounds pad the mesh's AABB by 10% on each side. Each
    /// voxel's unsigned distance comes from [`Bvh::closest_distance`]; its
    /// sign comes from ray parity, casting a fixed `+X` ray from the
    /// voxel and counting crossings via [`Bvh::count_intersections`] —
    /// odd means inside. The per-slice (Z) voxel fill is independent and
    /// writes to disjoint grid cells, so it is parallelized with `rayon`;
    /// the call as a whole remains a single blocking operation.
    pub fn build(mesh: &Mesh, resolution: usize) -> Result<Sdf, SdfError> {
        if resolution < 2 {
            return Err(SdfError::ResolutionTooSmall(resolution));
        }
        if mesh.triangles().is_empty() {
            return Err(SdfError::EmptyMesh);
        }

        let bounds = mesh.aabb().padded(PADDING_FRACTION);
        let r_minus_1 = (resolution - 1) as Real;
        let cell_size = bounds.size() / r_minus_1;

        let bvh = Bvh::build(mesh.triangles());

        let mut data = vec![0.0; resolution * resolution * resolution];
        data.par_chunks_mut(resolution * resolution)
            .enumerate()
            .for_each(|(z, slice)| {
                for y in 0..resolution {
                    for x in 0..resolution {
                        let w = bounds.min
                            + Vector3::new(x as Real, y as Real, z as Real) * cell_size;
                        let unsigned = bvh.closest_distance(w);
                        let ray = Ray::new(w, Vector3::X);
                        let hits = bvh.count_intersections(&ray);
                        let sign = if hits % 2 == 1 { -1.0 } else { 1.0 };
                        slice[y * resolution + x] = sign * unsigned;
                    }
                }
            });

        Ok(Sdf {
            resolution,
            grid_min: bounds.min,
            grid_max: bounds.max,
            cell_size,
            data,
        })
    }

    /// Grid resolution (`R`) per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// World-space minimum corner of the grid.
    pub fn grid_min(&self) -> Point3 {
        self.grid_min
    }

    /// World-space maximum corner of the grid.
    pub fn grid_max(&self) -> Point3 {
        self.grid_max
    }

    fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.resolution * self.resolution + y * self.resolution + x
    }

    fn raw(&self, x: usize, y: usize, z: usize) -> Real {
        self.data[self.linear_index(x, y, z)]
    }

    /// Converts a world point into continuous grid coordinates, clamped
    /// componentwise to `[0, R-1]`.
    fn world_to_grid(&self, w: Point3) -> Point3 {
        let g = (w - self.grid_min) / self.cell_size;
        let max = (self.resolution - 1) as Real;
        g.clamp(Point3::ZERO, Point3::splat(max))
    }

    /// Trilinear interpolation of the signed distance at world point `w`.
    pub fn sample(&self, w: Point3) -> Real {
        let g = self.world_to_grid(w);
        let max_index = self.resolution - 1;

        let x0 = g.x.floor() as usize;
        let y0 = g.y.floor() as usize;
        let z0 = g.z.floor() as usize;
        let x1 = (x0 + 1).min(max_index);
        let y1 = (y0 + 1).min(max_index);
        let z1 = (z0 + 1).min(max_index);

        let tx = g.x - x0 as Real;
        let ty = g.y - y0 as Real;
        let tz = g.z - z0 as Real;

        let c000 = self.raw(x0, y0, z0);
        let c100 = self.raw(x1, y0, z0);
        let c010 = self.raw(x0, y1, z0);
        let c110 = self.raw(x1, y1, z0);
        let c001 = self.raw(x0, y0, z1);
        let c101 = self.raw(x1, y0, z1);
        let c011 = self.raw(x0, y1, z1);
        let c111 = self.raw(x1, y1, z1);

        let c00 = c000 * (1.0 - tx) + c100 * tx;
        let c10 = c010 * (1.0 - tx) + c110 * tx;
        let c01 = c001 * (1.0 - tx) + c101 * tx;
        let c11 = c011 * (1.0 - tx) + c111 * tx;

        let c0 = c00 * (1.0 - ty) + c10 * ty;
        let c1 = c01 * (1.0 - ty) + c11 * ty;

        c0 * (1.0 - tz) + c1 * tz
    }

    /// Unnormalized gradient at `w`, via central differences with step
    /// `cellSize.x * 0.1`. Callers normalize when they need a direction;
    /// the gradient is piecewise-constant within a voxel and discontinuous
    /// across voxel boundaries since `sample` is only C0.
    pub fn gradient(&self, w: Point3) -> Vector3 {
        let h = self.cell_size.x * 0.1;
        let dx = self.sample(w + Vector3::new(h, 0.0, 0.0)) - self.sample(w - Vector3::new(h, 0.0, 0.0));
        let dy = self.sample(w + Vector3::new(0.0, h, 0.0)) - self.sample(w - Vector3::new(0.0, h, 0.0));
        let dz = self.sample(w + Vector3::new(0.0, 0.0, h)) - self.sample(w - Vector3::new(0.0, 0.0, h));
        Vector3::new(dx, dy, dz) / (2.0 * h)
    }
}
