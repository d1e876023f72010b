//! Spawn shapes and their sampling policies

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use crate::providers::{FORWARD, RIGHT, RandomSource, UP};

/// Tag for the flat `kind + size + angle` schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ShapeKind {
    #[default]
    Point,
    Line,
    Square,
    Box,
    Sphere,
    Circle,
    Cone,
}

/// Shape block as written in definition files
///
/// `size.x` is the length of a line and the radius of round shapes; a square
/// takes its extents from `size.x` and `size.z`. `angle` only applies to
/// cones.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ShapeParts {
    pub kind: ShapeKind,
    pub size: Vec3,
    pub angle: f32,
}

/// Volume new particles are spawned from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "ShapeParts", into = "ShapeParts")
)]
pub enum Shape {
    /// Single point at the emitter origin
    #[default]
    Point,
    /// Segment along X, centred on the origin
    Line { length: f32 },
    /// Rectangle in the XZ plane (`size.x` along X, `size.y` along Z)
    Square { size: Vec2 },
    /// Axis-aligned box
    Box { size: Vec3 },
    /// Solid ball
    Sphere { radius: f32 },
    /// Disc in the XZ plane
    Circle { radius: f32 },
    /// Disc base emitting upward within a half-angle
    Cone { radius: f32, angle: f32 },
}

impl Shape {
    /// Build a shape from the flat schema used by definition files
    pub fn from_parts(kind: ShapeKind, size: Vec3, angle: f32) -> Self {
        match kind {
            ShapeKind::Point => Self::Point,
            ShapeKind::Line => Self::Line { length: size.x },
            ShapeKind::Square => Self::Square {
                size: Vec2::new(size.x, size.z),
            },
            ShapeKind::Box => Self::Box { size },
            ShapeKind::Sphere => Self::Sphere { radius: size.x },
            ShapeKind::Circle => Self::Circle { radius: size.x },
            ShapeKind::Cone => Self::Cone {
                radius: size.x,
                angle,
            },
        }
    }

    /// Flat form of this shape
    pub fn to_parts(&self) -> ShapeParts {
        let (size, angle) = match *self {
            Self::Point => (Vec3::ZERO, 0.0),
            Self::Line { length } => (Vec3::new(length, 0.0, 0.0), 0.0),
            Self::Square { size } => (Vec3::new(size.x, 0.0, size.y), 0.0),
            Self::Box { size } => (size, 0.0),
            Self::Sphere { radius } | Self::Circle { radius } => (Vec3::splat(radius), 0.0),
            Self::Cone { radius, angle } => (Vec3::splat(radius), angle),
        };
        ShapeParts {
            kind: self.kind(),
            size,
            angle,
        }
    }

    /// Tag of this shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Point => ShapeKind::Point,
            Self::Line { .. } => ShapeKind::Line,
            Self::Square { .. } => ShapeKind::Square,
            Self::Box { .. } => ShapeKind::Box,
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Cone { .. } => ShapeKind::Cone,
        }
    }

    /// Whether every parameter is finite and non-negative
    pub(crate) fn parameters_valid(&self) -> bool {
        let ok = |v: f32| v.is_finite() && v >= 0.0;
        match *self {
            Self::Point => true,
            Self::Line { length } => ok(length),
            Self::Square { size } => ok(size.x) && ok(size.y),
            Self::Box { size } => ok(size.x) && ok(size.y) && ok(size.z),
            Self::Sphere { radius } | Self::Circle { radius } => ok(radius),
            Self::Cone { radius, angle } => ok(radius) && ok(angle),
        }
    }
}

impl From<ShapeParts> for Shape {
    fn from(parts: ShapeParts) -> Self {
        Self::from_parts(parts.kind, parts.size, parts.angle)
    }
}

impl From<Shape> for ShapeParts {
    fn from(shape: Shape) -> Self {
        shape.to_parts()
    }
}

/// Sample a spawn position in the shape's local space
pub fn sample_position(shape: &Shape, rng: &mut dyn RandomSource) -> Vec3 {
    match *shape {
        Shape::Point => Vec3::ZERO,
        Shape::Line { length } => Vec3::new(rng.uniform(-length, length), 0.0, 0.0) * 0.5,
        Shape::Square { size } => {
            Vec3::new(
                rng.uniform(-size.x, size.x),
                0.0,
                rng.uniform(-size.y, size.y),
            ) * 0.5
        }
        Shape::Box { size } => {
            Vec3::new(
                rng.uniform(-size.x, size.x),
                rng.uniform(-size.y, size.y),
                rng.uniform(-size.z, size.z),
            ) * 0.5
        }
        Shape::Sphere { radius } => unit_sphere(rng) * rng.uniform(0.0, radius),
        Shape::Circle { radius } | Shape::Cone { radius, .. } => {
            unit_disc(rng) * rng.uniform(0.0, radius)
        }
    }
}

/// Sample a unit spawn direction in the shape's local space
pub fn sample_direction(shape: &Shape, rng: &mut dyn RandomSource) -> Vec3 {
    match *shape {
        Shape::Point | Shape::Line { .. } | Shape::Square { .. } => UP,
        Shape::Box { .. } => FORWARD,
        Shape::Sphere { .. } => unit_sphere(rng),
        Shape::Circle { .. } => unit_disc(rng),
        Shape::Cone { angle, .. } => {
            let spread = angle / FRAC_PI_2;
            Vec3::new(
                rng.uniform(-spread, spread),
                1.0,
                rng.uniform(-spread, spread),
            )
            .normalize()
        }
    }
}

// Rejection sampling keeps the distribution free of axis bias.
const MAX_REJECTIONS: usize = 64;

fn unit_sphere(rng: &mut dyn RandomSource) -> Vec3 {
    for _ in 0..MAX_REJECTIONS {
        let v = Vec3::new(
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
    UP
}

fn unit_disc(rng: &mut dyn RandomSource) -> Vec3 {
    for _ in 0..MAX_REJECTIONS {
        let v = Vec3::new(rng.uniform(-1.0, 1.0), 0.0, rng.uniform(-1.0, 1.0));
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
    RIGHT
}
