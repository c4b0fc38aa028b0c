//! Playfield geometry.
//!
//! World coordinates have `x` growing to the right and `y` growing upwards. The hit line sits
//! near the bottom of the playfield and notes fall toward it, so their `y` decreases over time.
use core::ops::{Add, Mul, Sub};

/// A point or a vector in world coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec2 {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

/// A disc, the shape of both notes and strike hit windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    /// Center of the disc.
    pub center: Vec2,
    /// Radius of the disc.
    pub radius: f32,
}

impl Vec2 {
    /// Creates a new `Vec2`.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the zero vector.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0., 0.)
    }

    /// Returns the squared length of the vector.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Returns the squared distance between two points.
    #[inline]
    pub fn distance_squared(self, other: Vec2) -> f32 {
        (self - other).length_squared()
    }

    /// Returns the dot product of two vectors.
    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, other: Vec2) -> Self::Output {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, other: Vec2) -> Self::Output {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: f32) -> Self::Output {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Disc {
    /// Creates a new `Disc`.
    #[inline]
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Returns `true` if the two discs overlap.
    ///
    /// Discs that touch exactly are considered overlapping.
    #[inline]
    pub fn overlaps(&self, other: &Disc) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Returns `true` if `point` lies inside the disc or on its boundary.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }
}

/// Returns the point of the segment from `a` to `b` closest to `point`.
pub fn closest_on_segment(a: Vec2, b: Vec2, point: Vec2) -> Vec2 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared == 0. {
        return a;
    }

    let t = ((point - a).dot(ab) / length_squared).clamp(0., 1.);
    a + ab * t
}

/// Linear interpolation between `a` and `b`.
///
/// `t` is not clamped.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep of `t` clamped to `[0, 1]`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0., 1.);
    t * t * (3. - 2. * t)
}
