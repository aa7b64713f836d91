use super::particle::Particle;
use super::vector::Vector;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Per-tick snapshot of a macrocosm's frontier and the tuning values in force.
///
/// Difficulty and entropy are owned by the driver and passed through.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[archive_attr(derive(Debug))]
#[serde(rename_all = "camelCase")]
pub struct SystemFrame {
    /// Corners of the most recently completed shell, upper first.
    pub head: [Vector; 2],
    /// Corners of the next shell to be created, upper first.
    pub shell: [Vector; 2],
    pub global_difficulty: i64,
    pub global_entropy: i64,
}

impl SystemFrame {
    /// Side length of the head cuboid along x.
    pub fn head_side(&self) -> i64 {
        (self.head[0].x - self.head[1].x).abs() + 1
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Failed to deserialize system frame: {}", e))
    }
}

/// Full particle state, one entry per created lattice point.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ParticleFrame {
    pub particles: Vec<(Vector, Particle)>,
}

impl ParticleFrame {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Failed to deserialize particle frame: {}", e))
    }
}

/// Dense read-only copy of a macrocosm bounded by its head.
///
/// `particles[z][y][x]` is indexed from the lower head corner; points without
/// a particle hold `Particle::default()`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FlattenedMacrocosm {
    pub particles: Vec<Vec<Vec<Particle>>>,
    pub head: [Vector; 2],
    pub shell: [Vector; 2],
    pub identifier: usize,
}
