/// Asserts that the head cuboid of `$macrocosm` has side `$side` on every axis.
#[macro_export]
macro_rules! assert_head_side {
    ($macrocosm:expr, $side:expr) => {
        let head = $macrocosm.head();
        let extent = (head[0] - head[1]).abs();
        assert_eq!(
            extent,
            eve_lib::data::Vector::splat($side - 1),
            "head {:?} does not have side {}",
            head,
            $side
        );
    };
}

/// Asserts that every point in `$points` still holds a particle.
#[macro_export]
macro_rules! assert_all_present {
    ($macrocosm:expr, $points:expr) => {
        for point in $points.iter() {
            assert!(
                $macrocosm.has_particle(*point),
                "particle at {} disappeared",
                point
            );
        }
    };
}
