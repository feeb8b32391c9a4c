//! Pure point-set generators for each sacred geometry construction.
//!
//! Every generator is a function of its arguments only. Invalid sizes
//! (non-positive or non-finite radius/scale, zero point count) produce an
//! empty result rather than an error, which the render loop draws as nothing.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::{primes::is_prime, settings::RenderMode, ShapeKind};

/// Golden ratio.
pub const PHI: f32 = 1.618_034;

/// Two flower-of-life centers closer than this are treated as the same circle.
pub const DEDUP_EPSILON: f32 = 1e-3;

const METATRON_OUTER_VERTICES: usize = 12;
const METATRON_MAX_RING_DISTANCE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
}

impl Point {
    pub const ORIGIN: Point = Point::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    pub const fn with_z(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn z_or_zero(&self) -> f32 {
        self.z.unwrap_or(0.0)
    }

    /// Distance from the origin in the XY plane.
    pub fn planar_radius(&self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dz = self.z_or_zero() - other.z_or_zero();
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + dz * dz).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z_or_zero().is_finite()
    }
}

/// A point on the prime spiral tagged with its index's primality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimePoint {
    pub index: u64,
    pub is_prime: bool,
    pub coordinate: Point,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimeSpiral {
    /// Every point along the spiral, in index order.
    pub path: Vec<PrimePoint>,
    /// The subset of `path` whose index is prime.
    pub primes: Vec<PrimePoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetatronsCube {
    /// Index 0 is the center, 1..=12 the outer ring, then the poles in 3D.
    pub vertices: Vec<Point>,
    pub edges: Vec<(usize, usize)>,
}

pub fn flower_of_life(center: Point, radius: f32, rings: u32) -> Vec<Point> {
    if !(radius.is_finite() && radius > 0.0) || !center.is_finite() {
        return Vec::new();
    }

    let mut centers = vec![center];
    for _ in 0..rings {
        let existing = centers.clone();
        for circle in &existing {
            for j in 0..6 {
                let theta = j as f32 * PI / 3.0;
                let candidate = Point {
                    x: circle.x + radius * theta.cos(),
                    y: circle.y + radius * theta.sin(),
                    z: circle.z,
                };
                let duplicate = centers
                    .iter()
                    .any(|c| c.distance(&candidate) < DEDUP_EPSILON);
                if !duplicate {
                    centers.push(candidate);
                }
            }
        }
    }
    centers
}

pub fn metatrons_cube(center: Point, radius: f32, mode: RenderMode) -> MetatronsCube {
    if !(radius.is_finite() && radius > 0.0) || !center.is_finite() {
        return MetatronsCube::default();
    }

    let mut vertices = Vec::with_capacity(METATRON_OUTER_VERTICES + 3);
    vertices.push(center);
    for k in 0..METATRON_OUTER_VERTICES {
        let theta = (k as f32 * 30.0).to_radians();
        vertices.push(Point {
            x: center.x + radius * theta.cos(),
            y: center.y + radius * theta.sin(),
            z: center.z,
        });
    }

    let mut edges = Vec::new();
    for outer in 1..=METATRON_OUTER_VERTICES {
        edges.push((0, outer));
    }
    for a in 0..METATRON_OUTER_VERTICES {
        for b in (a + 1)..METATRON_OUTER_VERTICES {
            let gap = b - a;
            let ring_distance = gap.min(METATRON_OUTER_VERTICES - gap);
            if ring_distance <= METATRON_MAX_RING_DISTANCE {
                edges.push((a + 1, b + 1));
            }
        }
    }

    if mode == RenderMode::ThreeD {
        let base = vertices.len();
        let depth = center.z_or_zero();
        vertices.push(Point::with_z(center.x, center.y, depth + radius));
        vertices.push(Point::with_z(center.x, center.y, depth - radius));
        for vertex in 0..base {
            edges.push((vertex, base));
            edges.push((vertex, base + 1));
        }
    }

    MetatronsCube { vertices, edges }
}

pub fn fibonacci_spiral(scale: f32, point_count: usize, mode: RenderMode) -> Vec<Point> {
    if !(scale.is_finite() && scale > 0.0) {
        return Vec::new();
    }

    (0..point_count)
        .map(|i| {
            let theta = i as f32 * 0.1;
            let r = scale * PHI.powf(theta / PI);
            let (x, y) = (r * theta.cos(), r * theta.sin());
            match mode {
                RenderMode::TwoD => Point::new(x, y),
                RenderMode::ThreeD => Point::with_z(x, y, r * 0.1),
            }
        })
        .collect()
}

/// Ulam-style spiral: index `i` sits at radius `scale * sqrt(i)`.
///
/// Indices start at 1 so the first point is not a degenerate origin.
pub fn prime_spiral(scale: f32, point_count: usize, mode: RenderMode) -> PrimeSpiral {
    if !(scale.is_finite() && scale > 0.0) {
        return PrimeSpiral::default();
    }

    let path: Vec<PrimePoint> = (1..=point_count as u64)
        .map(|index| {
            let root = (index as f32).sqrt();
            let r = scale * root;
            let coordinate = match mode {
                RenderMode::TwoD => {
                    let theta = root * TAU;
                    Point::new(r * theta.cos(), r * theta.sin())
                }
                RenderMode::ThreeD => {
                    let theta = root * 0.8;
                    Point::with_z(r * theta.cos(), r * theta.sin(), r * 0.1)
                }
            };
            PrimePoint {
                index,
                is_prime: is_prime(index),
                coordinate,
            }
        })
        .collect();
    let primes = path.iter().copied().filter(|p| p.is_prime).collect();

    PrimeSpiral { path, primes }
}

/// Sizes used when the render loop instantiates a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryParams {
    pub flower_radius: f32,
    pub flower_rings: u32,
    pub metatron_radius: f32,
    pub fibonacci_scale: f32,
    pub fibonacci_points: usize,
    pub prime_scale: f32,
    pub prime_points: usize,
}

impl Default for GeometryParams {
    fn default() -> Self {
        Self {
            flower_radius: 1.0,
            flower_rings: 2,
            metatron_radius: 1.0,
            fibonacci_scale: 0.05,
            fibonacci_points: 200,
            prime_scale: 0.08,
            prime_points: 300,
        }
    }
}

/// Uniform view over any shape's generated geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeGeometry {
    pub points: Vec<Point>,
    /// Index pairs into `points`. Empty for shapes drawn as a path.
    pub edges: Vec<(usize, usize)>,
    /// Set for the flower of life, whose points are circle centers.
    pub circle_radius: Option<f32>,
    /// Prime-tagged subset highlighted on top of the path.
    pub highlights: Vec<PrimePoint>,
}

impl ShapeGeometry {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn generate(shape: ShapeKind, mode: RenderMode, params: &GeometryParams) -> ShapeGeometry {
    let center = match mode {
        RenderMode::TwoD => Point::ORIGIN,
        RenderMode::ThreeD => Point::with_z(0.0, 0.0, 0.0),
    };

    match shape {
        ShapeKind::FlowerOfLife => {
            let points = flower_of_life(center, params.flower_radius, params.flower_rings);
            let circle_radius = (!points.is_empty()).then_some(params.flower_radius);
            ShapeGeometry {
                points,
                circle_radius,
                ..Default::default()
            }
        }
        ShapeKind::MetatronsCube => {
            let cube = metatrons_cube(center, params.metatron_radius, mode);
            ShapeGeometry {
                points: cube.vertices,
                edges: cube.edges,
                ..Default::default()
            }
        }
        ShapeKind::FibonacciSpiral => ShapeGeometry {
            points: fibonacci_spiral(params.fibonacci_scale, params.fibonacci_points, mode),
            ..Default::default()
        },
        ShapeKind::PrimeSpiral => {
            let spiral = prime_spiral(params.prime_scale, params.prime_points, mode);
            ShapeGeometry {
                points: spiral.path.iter().map(|p| p.coordinate).collect(),
                highlights: spiral.primes,
                ..Default::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flower_ring_counts_follow_hexagonal_numbers() {
        let counts: Vec<usize> = (0..4)
            .map(|rings| flower_of_life(Point::ORIGIN, 1.0, rings).len())
            .collect();
        assert_eq!(counts, vec![1, 7, 19, 37]);
    }

    #[test]
    fn flower_rejects_invalid_radius() {
        assert!(flower_of_life(Point::ORIGIN, 0.0, 3).is_empty());
        assert!(flower_of_life(Point::ORIGIN, -1.0, 3).is_empty());
        assert!(flower_of_life(Point::ORIGIN, f32::NAN, 3).is_empty());
    }

    #[test]
    fn metatron_has_thirteen_vertices_in_2d() {
        let cube = metatrons_cube(Point::ORIGIN, 1.0, RenderMode::TwoD);
        assert_eq!(cube.vertices.len(), 13);
        // 12 spokes plus every pair on the outer ring.
        assert_eq!(cube.edges.len(), 12 + 66);
        assert!(cube.vertices.iter().all(|v| v.z.is_none()));
    }

    #[test]
    fn metatron_poles_in_3d() {
        let cube = metatrons_cube(Point::ORIGIN, 2.0, RenderMode::ThreeD);
        assert_eq!(cube.vertices.len(), 15);
        assert_eq!(cube.vertices[13].z, Some(2.0));
        assert_eq!(cube.vertices[14].z, Some(-2.0));
        assert_eq!(cube.edges.len(), 12 + 66 + 26);
        assert!(cube
            .edges
            .iter()
            .all(|&(a, b)| a < cube.vertices.len() && b < cube.vertices.len()));
    }

    #[test]
    fn metatron_outer_ring_spacing() {
        let cube = metatrons_cube(Point::ORIGIN, 1.0, RenderMode::TwoD);
        let first = cube.vertices[1];
        let fourth = cube.vertices[4];
        assert!((first.x - 1.0).abs() < 1e-6 && first.y.abs() < 1e-6);
        assert!(fourth.x.abs() < 1e-6 && (fourth.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fibonacci_starts_at_scale() {
        let points = fibonacci_spiral(2.0, 3, RenderMode::TwoD);
        assert_eq!(points[0], Point::new(2.0, 0.0));
        assert!(fibonacci_spiral(0.0, 10, RenderMode::TwoD).is_empty());
        assert!(fibonacci_spiral(1.0, 0, RenderMode::TwoD).is_empty());
    }

    #[test]
    fn fibonacci_3d_depth_tracks_radius() {
        for point in fibonacci_spiral(1.0, 50, RenderMode::ThreeD) {
            let z = point.z.unwrap();
            assert!((z - point.planar_radius() * 0.1).abs() < 1e-4);
        }
    }

    #[test]
    fn prime_spiral_tags_primes() {
        let spiral = prime_spiral(1.0, 20, RenderMode::TwoD);
        assert_eq!(spiral.path.len(), 20);
        let indices: Vec<u64> = spiral.primes.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![2, 3, 5, 7, 11, 13, 17, 19]);
        assert!((spiral.path[3].coordinate.planar_radius() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn prime_spiral_rejects_invalid_scale() {
        assert_eq!(prime_spiral(-1.0, 20, RenderMode::TwoD), PrimeSpiral::default());
        assert!(prime_spiral(1.0, 0, RenderMode::ThreeD).path.is_empty());
    }

    #[test]
    fn generate_is_deterministic() {
        let params = GeometryParams::default();
        for shape in ShapeKind::ALL {
            for mode in [RenderMode::TwoD, RenderMode::ThreeD] {
                assert_eq!(generate(shape, mode, &params), generate(shape, mode, &params));
            }
        }
    }

    #[test]
    fn generate_degrades_to_empty() {
        let params = GeometryParams {
            flower_radius: 0.0,
            ..Default::default()
        };
        let geometry = generate(ShapeKind::FlowerOfLife, RenderMode::TwoD, &params);
        assert!(geometry.is_empty());
        assert_eq!(geometry.circle_radius, None);
    }
}
