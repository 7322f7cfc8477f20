//! C4: an indexed triangle mesh, and its OBJ loader.

use crate::error::LoadError;
use crate::geometry::aabb::Aabb;
use crate::geometry::triangle::Triangle;
use crate::Point3;
use std::path::Path;

/// An ordered sequence of triangles plus their enclosing AABB.
///
/// Bounds of an empty mesh are undefined (`Aabb::empty()`, i.e. `min` at
/// `+infinity`); callers must not build an [`crate::sdf::Sdf`] from one —
/// [`crate::sdf::Sdf::build`] rejects it explicitly.
#[derive(Debug, Clone)]
pub struct Mesh {
    triangles: Vec<Triangle>,
    aabb: Aabb,
}

impl Mesh {
    /// Builds a mesh from an already-triangulated list. Degenerate
    /// triangles are kept here (filtering happens in the BVH builder) so
    /// that `triangles().len()` faithfully reflects what was loaded.
    pub fn new(triangles: Vec<Triangle>) -> Mesh {
        let aabb = triangles
            .iter()
            .fold(Aabb::empty(), |acc, t| acc.grow(&t.v0).grow(&t.v1).grow(&t.v2));
        Mesh { triangles, aabb }
    }

    /// The mesh's triangles, in load order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// The componentwise extremum of every vertex. Undefined (inverted)
    /// for an empty mesh.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// `true` iff the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Loads a mesh from an ASCII Wavefront OBJ file.
    ///
    /// Recognised prefixes: `v x y z` (a vertex, 1-indexed by subsequent
    /// faces) and `f v0[/...] v1[/...] v2[/...] ...` (a face; only the
    /// pre-slash integer of each reference is consumed). All other
    /// prefixes are ignored. A polygon face with `n >= 3` vertices is
    /// triangulated as a fan: `(0, i, i+1)` for `i` in `[1, n-2]`.
    ///
    /// Malformed vertex lines are logged and skipped. A face referencing
    /// an out-of-range vertex index aborts the load with
    /// [`LoadError::IndexOutOfRange`]. Triangles that come out degenerate
    /// (zero area) are dropped with a `warn`-level log, per the contract
    /// that BVH builders receive only well-formed triangles.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_obj(&text)
    }

    /// Parses OBJ source text directly; split out from [`Mesh::load_obj`]
    /// so the fan-triangulation and error-handling logic is testable
    /// without a fixture file on disk.
    pub fn parse_obj(text: &str) -> Result<Mesh, LoadError> {
        let mut vertices: Vec<Point3> = Vec::new();
        let mut triangles: Vec<Triangle> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line_number = line_no + 1;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => match parse_vertex(&mut tokens) {
                    Some(v) => vertices.push(v),
                    None => log::warn!("obj: malformed vertex on line {line_number}, skipping"),
                },
                Some("f") => {
                    let indices: Vec<&str> = tokens.collect();
                    if indices.len() < 3 {
                        continue;
                    }
                    let mut resolved = Vec::with_capacity(indices.len());
                    for tok in &indices {
                        let idx = parse_face_index(tok, line_number)?;
                        let zero_based = if idx > 0 {
                            idx - 1
                        } else {
                            // OBJ also allows negative (relative) indices;
                            // not produced by the external writer this
                            // loader targets, but resolved here for
                            // completeness rather than silently mis-parsed.
                            vertices.len() as i64 + idx
                        };
                        if zero_based < 0 || zero_based as usize >= vertices.len() {
                            return Err(LoadError::IndexOutOfRange {
                                line: line_number,
                                index: idx,
                            });
                        }
                        resolved.push(zero_based as usize);
                    }
                    for i in 1..resolved.len() - 1 {
                        let (a, b, c) = (resolved[0], resolved[i], resolved[i + 1]);
                        let tri = Triangle::new(vertices[a], vertices[b], vertices[c]);
                        if tri.is_degenerate() {
                            log::warn!("obj: degenerate triangle near line {line_number}, dropping");
                            continue;
                        }
                        triangles.push(tri);
                    }
                }
                _ => {}
            }
        }

        Ok(Mesh::new(triangles))
    }
}

fn parse_vertex<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<Point3> {
    let x: f64 = tokens.next()?.parse().ok()?;
    let y: f64 = tokens.next()?.parse().ok()?;
    let z: f64 = tokens.next()?.parse().ok()?;
    Some(Point3::new(x, y, z))
}

fn parse_face_index(token: &str, line: usize) -> Result<i64, LoadError> {
    let pre_slash = token.split('/').next().unwrap_or(token);
    pre_slash
        .parse::<i64>()
        .map_err(|_| LoadError::IndexOutOfRange { line, index: 0 })
}
