//! Geometry building
//!
//! Turns a sequence of 2D points plus a topology into a shape with baked
//! positions and generated texture coordinates. Positions are transformed by
//! the current matrix at build time (z = 0, w = 1) and never re-transformed
//! later.

use quill_core::{Mat4, Point, WrapMode};

use crate::error::{CanvasError, Result};

/// Primitive interpretation of a point sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    /// Convex polygon, triangulated as a fan from the first vertex.
    /// Non-convex input produces an undefined shape, not an error.
    Polygon,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
}

impl Topology {
    /// Minimum number of input points for a well-formed shape
    pub fn min_points(&self) -> usize {
        match self {
            Topology::Points => 1,
            Topology::Lines | Topology::LineStrip | Topology::LineLoop => 2,
            Topology::Polygon
            | Topology::Triangles
            | Topology::TriangleStrip
            | Topology::TriangleFan => 3,
            Topology::Quads | Topology::QuadStrip => 4,
        }
    }

    fn is_line_family(&self) -> bool {
        matches!(
            self,
            Topology::Points | Topology::Lines | Topology::LineStrip | Topology::LineLoop
        )
    }

    fn is_quad_family(&self) -> bool {
        matches!(self, Topology::Quads | Topology::QuadStrip)
    }
}

/// A built shape: transformed positions, optional texture coordinates, topology
#[derive(Clone, Debug)]
pub struct Geometry {
    topology: Topology,
    positions: Vec<Point>,
    tex_coords: Option<Vec<Point>>,
}

impl Geometry {
    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn tex_coords(&self) -> Option<&[Point]> {
        self.tex_coords.as_deref()
    }
}

/// Build a shape from raw points.
///
/// `texture` carries the wrap mode of the active image, or `None` when no
/// image is active (texture coordinates are then omitted).
pub fn build_geometry(
    points: &[Point],
    topology: Topology,
    matrix: &Mat4,
    texture: Option<WrapMode>,
) -> Result<Geometry> {
    let min = topology.min_points();
    if points.len() < min {
        return Err(CanvasError::InvalidGeometry {
            topology,
            min,
            got: points.len(),
        });
    }

    // A polygon becomes a fan-ordered triangle list; its bounding box is
    // unchanged, so texture generation sees the same extents.
    let (expanded, out_topology) = match topology {
        Topology::Polygon => (fan_triangulate(points), Topology::Triangles),
        _ => (points.to_vec(), topology),
    };

    let tex_coords = texture.map(|wrap| {
        if topology.is_quad_family() {
            quad_tex_coords(expanded.len(), topology)
        } else if topology.is_line_family() {
            linear_tex_coords(expanded.len(), wrap)
        } else {
            planar_tex_coords(&expanded)
        }
    });

    let positions = expanded.iter().map(|p| matrix.transform_point(*p)).collect();

    Ok(Geometry {
        topology: out_topology,
        positions,
        tex_coords,
    })
}

fn fan_triangulate(points: &[Point]) -> Vec<Point> {
    let mut out = Vec::with_capacity((points.len() - 2) * 3);
    for i in 1..points.len() - 1 {
        out.push(points[0]);
        out.push(points[i]);
        out.push(points[i + 1]);
    }
    out
}

/// Quad-local mapping: each quad tiles the full image independently
fn quad_tex_coords(count: usize, topology: Topology) -> Vec<Point> {
    match topology {
        Topology::Quads => (0..count)
            .map(|i| match i % 4 {
                0 => Point::new(0.0, 0.0),
                1 => Point::new(1.0, 0.0),
                2 => Point::new(1.0, 1.0),
                _ => Point::new(0.0, 1.0),
            })
            .collect(),
        // strip vertices come in bottom/top pairs; u alternates per pair so
        // every quad spans the full image (mirrored on odd quads)
        _ => (0..count)
            .map(|i| Point::new(((i / 2) % 2) as f32, (i % 2) as f32))
            .collect(),
    }
}

/// Planar mapping: project each point onto the bounding box of the whole
/// point set, normalized to [0, 1]
fn planar_tex_coords(points: &[Point]) -> Vec<Point> {
    let mut min = points[0];
    let mut max = points[0];
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let extent_x = max.x - min.x;
    let extent_y = max.y - min.y;
    points
        .iter()
        .map(|p| {
            Point::new(
                if extent_x > 0.0 {
                    (p.x - min.x) / extent_x
                } else {
                    0.0
                },
                if extent_y > 0.0 {
                    (p.y - min.y) / extent_y
                } else {
                    0.0
                },
            )
        })
        .collect()
}

/// Linear mapping along the sequence index: unit step per point under
/// Repeat (patterns repeat along the stroke), stretched once over [0, 1]
/// under Clamp
fn linear_tex_coords(count: usize, wrap: WrapMode) -> Vec<Point> {
    match wrap {
        WrapMode::Repeat => (0..count).map(|i| Point::new(i as f32, 0.0)).collect(),
        WrapMode::Clamp => {
            let span = (count - 1).max(1) as f32;
            (0..count)
                .map(|i| Point::new(i as f32 / span, 0.0))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_points_fails() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        let err = build_geometry(&pts, Topology::Polygon, &Mat4::IDENTITY, None).unwrap_err();
        assert!(matches!(
            err,
            CanvasError::InvalidGeometry {
                topology: Topology::Polygon,
                min: 3,
                got: 2,
            }
        ));
    }

    #[test]
    fn test_triangle_polygon_is_one_triangle() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ];
        let geom = build_geometry(&pts, Topology::Polygon, &Mat4::IDENTITY, None).unwrap();
        assert_eq!(geom.topology(), Topology::Triangles);
        assert_eq!(geom.positions().len(), 3);
        assert!(geom.tex_coords().is_none());
    }

    #[test]
    fn test_polygon_fan_triangulation() {
        let quad = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let geom = build_geometry(&quad, Topology::Polygon, &Mat4::IDENTITY, None).unwrap();
        // two triangles, both anchored at the first vertex
        assert_eq!(geom.positions().len(), 6);
        assert_eq!(geom.positions()[0], quad[0]);
        assert_eq!(geom.positions()[3], quad[0]);
    }

    #[test]
    fn test_positions_are_baked_through_matrix() {
        let pts = [Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        let m = Mat4::translation(10.0, 0.0, 0.0);
        let geom = build_geometry(&pts, Topology::Lines, &m, None).unwrap();
        assert_eq!(geom.positions()[0], Point::new(11.0, 0.0));
        assert_eq!(geom.positions()[1], Point::new(12.0, 0.0));
    }

    #[test]
    fn test_quad_local_tex_coords() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(4.0, 0.0),
            Point::new(8.0, 0.0),
            Point::new(8.0, 4.0),
            Point::new(4.0, 4.0),
        ];
        let geom =
            build_geometry(&pts, Topology::Quads, &Mat4::IDENTITY, Some(WrapMode::Clamp)).unwrap();
        let uv = geom.tex_coords().unwrap();
        // each quad repeats the same corner cycle
        assert_eq!(uv[0], Point::new(0.0, 0.0));
        assert_eq!(uv[2], Point::new(1.0, 1.0));
        assert_eq!(uv[4], Point::new(0.0, 0.0));
        assert_eq!(uv[6], Point::new(1.0, 1.0));
    }

    #[test]
    fn test_planar_tex_coords_span_bounding_box() {
        let pts = [
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(30.0, 50.0),
        ];
        let geom = build_geometry(
            &pts,
            Topology::TriangleFan,
            &Mat4::IDENTITY,
            Some(WrapMode::Clamp),
        )
        .unwrap();
        let uv = geom.tex_coords().unwrap();
        assert_eq!(uv[0], Point::new(0.0, 0.0));
        assert_eq!(uv[1], Point::new(1.0, 0.0));
        assert_eq!(uv[2], Point::new(1.0, 1.0));
    }

    #[test]
    fn test_linear_tex_coords_repeat_vs_clamp() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        let repeat = build_geometry(
            &pts,
            Topology::LineStrip,
            &Mat4::IDENTITY,
            Some(WrapMode::Repeat),
        )
        .unwrap();
        assert_eq!(
            repeat.tex_coords().unwrap(),
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
            ]
        );
        let clamp = build_geometry(
            &pts,
            Topology::LineStrip,
            &Mat4::IDENTITY,
            Some(WrapMode::Clamp),
        )
        .unwrap();
        assert_eq!(
            clamp.tex_coords().unwrap(),
            &[
                Point::new(0.0, 0.0),
                Point::new(0.5, 0.0),
                Point::new(1.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_no_image_no_tex_coords() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let geom = build_geometry(&pts, Topology::Lines, &Mat4::IDENTITY, None).unwrap();
        assert!(geom.tex_coords().is_none());
    }
}
