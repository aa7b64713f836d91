use crate::error::{IoError, Result};
use eve_data::SystemFrame;
use rkyv::de::deserializers::SharedDeserializeMap;
use rkyv::ser::serializers::AllocSerializer;
use rkyv::ser::Serializer;
use rkyv::{Archive, Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn save_rkyv<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize<AllocSerializer<4096>>,
    T: Archive,
    P: AsRef<Path>,
{
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(data)
        .map_err(|e| IoError::archive(format!("serialization failed: {:?}", e)))?;
    let bytes = serializer.into_serializer().into_inner();
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

pub fn load_rkyv<T, P>(path: P) -> Result<T>
where
    T: Archive,
    T::Archived: Deserialize<T, SharedDeserializeMap>
        + for<'a> rkyv::CheckBytes<rkyv::validation::validators::DefaultValidator<'a>>,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path)?;
    let archived = rkyv::check_archived_root::<T>(&bytes)
        .map_err(|e| IoError::archive(format!("validation failed: {:?}", e)))?;
    let mut deserializer = SharedDeserializeMap::default();
    let deserialized: T = archived
        .deserialize(&mut deserializer)
        .map_err(|e| IoError::archive(format!("deserialization failed: {:?}", e)))?;
    Ok(deserialized)
}

/// Every frame recorded for one macrocosm, in sequence order, tagged with the
/// fingerprint of the config that produced them.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[archive(check_bytes)]
pub struct FrameArchive {
    pub macrocosm: u64,
    pub fingerprint: String,
    pub frames: Vec<SystemFrame>,
}

impl FrameArchive {
    pub fn new(macrocosm: usize, fingerprint: impl Into<String>, frames: Vec<SystemFrame>) -> Self {
        Self {
            macrocosm: macrocosm as u64,
            fingerprint: fingerprint.into(),
            frames,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        save_rkyv(self, path)
            .map_err(|e| e.with_context(format!("saving archive {}", path.display())))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        load_rkyv(path).map_err(|e| e.with_context(format!("loading archive {}", path.display())))
    }

    /// Head side length of the first and the last frame.
    pub fn head_sides(&self) -> Option<(i64, i64)> {
        Some((self.frames.first()?.head_side(), self.frames.last()?.head_side()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eve_data::Vector;

    fn frames(n: i64) -> Vec<SystemFrame> {
        (0..n)
            .map(|i| SystemFrame {
                head: [Vector::splat(i), Vector::splat(-i)],
                shell: [Vector::splat(i + 1), Vector::splat(-i - 1)],
                global_difficulty: 2,
                global_entropy: 5 + i,
            })
            .collect()
    }

    #[test]
    fn test_archive_file_round_trip() {
        let path = std::env::temp_dir().join(format!("eve_archive_{}.rkyv", std::process::id()));
        let archive = FrameArchive::new(2, "abc123", frames(4));
        archive.save(&path).unwrap();
        let restored = FrameArchive::load(&path).unwrap();
        assert_eq!(restored, archive);
        assert_eq!(restored.head_sides(), Some((1, 7)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_archive_is_rejected() {
        let path = std::env::temp_dir().join(format!("eve_corrupt_{}.rkyv", std::process::id()));
        std::fs::write(&path, b"not an archive").unwrap();
        assert!(FrameArchive::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_archive_has_no_sides() {
        assert_eq!(FrameArchive::new(0, "", Vec::new()).head_sides(), None);
    }
}
