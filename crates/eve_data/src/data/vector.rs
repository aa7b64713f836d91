use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point on the three-dimensional integer lattice.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[archive_attr(derive(Debug, PartialEq, Eq))]
pub struct Vector {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Vector {
    pub const ONE: Vector = Vector { x: 1, y: 1, z: 1 };

    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn splat(v: i64) -> Self {
        Self::new(v, v, v)
    }

    /// Builds a vector from up to three leading values; missing axes are zero.
    pub fn from_values(values: &[i64]) -> Self {
        let at = |i: usize| values.get(i).copied().unwrap_or(0);
        Self::new(at(0), at(1), at(2))
    }

    pub fn values(&self) -> [i64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn product(&self) -> i64 {
        self.x * self.y * self.z
    }

    /// Componentwise maximum.
    #[must_use]
    pub fn greater(&self, other: Vector) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Componentwise minimum.
    #[must_use]
    pub fn lesser(&self, other: Vector) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Per-axis step (+1 or -1) that walks from `self` towards `target`.
    #[must_use]
    pub fn magnitude(&self, target: Vector) -> Self {
        let step = |from: i64, to: i64| if from > to { -1 } else { 1 };
        Self::new(
            step(self.x, target.x),
            step(self.y, target.y),
            step(self.z, target.z),
        )
    }

    /// The adjacent diagonal point one unit further out (`upper`) or in.
    #[must_use]
    pub fn corner(&self, upper: bool) -> Self {
        if upper {
            *self + Self::ONE
        } else {
            *self - Self::ONE
        }
    }

    /// The corner `layers + 1` diagonal steps away.
    #[must_use]
    pub fn corner_at_layer(&self, upper: bool, layers: usize) -> Self {
        let step = (layers as i64).saturating_add(1);
        if upper {
            *self + Self::splat(step)
        } else {
            *self - Self::splat(step)
        }
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}, {}, {}}}", self.x, self.y, self.z)
    }
}
