//! Axis-aligned lattice cuboids and fork-join iteration over them.

use eve_data::Vector;
use rayon::prelude::*;

/// Inclusive cuboid of lattice points. Corners are normalised on
/// construction, so the argument order never matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    lower: Vector,
    upper: Vector,
}

impl Region {
    pub fn new(a: Vector, b: Vector) -> Self {
        Self {
            lower: a.lesser(b),
            upper: a.greater(b),
        }
    }

    /// Cuboid extending `layers` points from `center` along every axis.
    pub fn around(center: Vector, layers: i64) -> Self {
        let step = Vector::splat(layers.max(0));
        Self::new(center - step, center + step)
    }

    /// Neighbourhood of a particle with `inputs` alive roots: just enough
    /// layers for `coverage` points per layer to serve every input.
    pub fn neighborhood(center: Vector, inputs: usize, coverage: usize) -> Self {
        let layers = inputs.div_ceil(coverage.max(1));
        Self::around(center, i64::try_from(layers).unwrap_or(i64::MAX))
    }

    pub fn lower(&self) -> Vector {
        self.lower
    }

    pub fn upper(&self) -> Vector {
        self.upper
    }

    /// Points per axis.
    pub fn extent(&self) -> Vector {
        (self.upper - self.lower).abs() + Vector::ONE
    }

    pub fn len(&self) -> usize {
        usize::try_from(self.extent().product()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, v: Vector) -> bool {
        (self.lower.x..=self.upper.x).contains(&v.x)
            && (self.lower.y..=self.upper.y).contains(&v.y)
            && (self.lower.z..=self.upper.z).contains(&v.z)
    }

    /// Every point, z outermost and x innermost, ascending.
    pub fn points(&self) -> impl Iterator<Item = Vector> {
        let (lower, upper) = (self.lower, self.upper);
        (lower.z..=upper.z).flat_map(move |z| {
            (lower.y..=upper.y)
                .flat_map(move |y| (lower.x..=upper.x).map(move |x| Vector::new(x, y, z)))
        })
    }

    /// Runs `f` on every point in parallel and returns once all calls have
    /// finished.
    pub fn par_for_each<F>(&self, f: F)
    where
        F: Fn(Vector) + Sync + Send,
    {
        let lower = self.lower;
        let extent = self.extent();
        let (ex, ey) = (extent.x, extent.y);
        (0..extent.product()).into_par_iter().for_each(|i| {
            let v = Vector::new(
                lower.x + i % ex,
                lower.y + (i / ex) % ey,
                lower.z + i / (ex * ey),
            );
            f(v);
        });
    }
}

/// All points between `a` and `b` inclusive, in any corner order.
pub fn vectors_between(a: Vector, b: Vector) -> Vec<Vector> {
    Region::new(a, b).points().collect()
}

/// Runs `f` concurrently for every point between `a` and `b` inclusive and
/// joins before returning.
pub fn do_for_vectors_between<F>(a: Vector, b: Vector, f: F)
where
    F: Fn(Vector) + Sync + Send,
{
    Region::new(a, b).par_for_each(f);
}
