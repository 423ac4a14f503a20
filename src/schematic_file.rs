//! Block and mod inventory of an uploaded schematic (structure template NBT)

use crate::error::SchematicFileError;
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// What a schematic is built from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchematicContents {
    /// Block entity id (e.g. `create:cogwheel`) to number of placements
    pub blocks: HashMap<String, u32>,
    /// Namespaces of those ids, i.e. the mods needed to place the schematic
    pub mods: BTreeSet<String>,
}

impl SchematicContents {
    /// Mod list in the form `SchematicDetails::mods` carries it
    pub fn mod_list(&self) -> Vec<String> {
        self.mods.iter().cloned().collect()
    }
}

#[derive(Deserialize)]
struct StructureFile {
    #[serde(default)]
    blocks: Vec<StructureBlock>,
}

#[derive(Deserialize)]
struct StructureBlock {
    nbt: Option<BlockEntity>,
}

#[derive(Deserialize)]
struct BlockEntity {
    id: Option<String>,
}

/// Count the block entities of a structure file, gzipped or raw
///
/// Blocks without block-entity data, or whose data has no `id`, are skipped.
pub fn schematic_contents(bytes: &[u8]) -> Result<SchematicContents, SchematicFileError> {
    let raw: Cow<[u8]> = if bytes.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut inflated)?;
        Cow::Owned(inflated)
    } else {
        Cow::Borrowed(bytes)
    };

    let file: StructureFile = fastnbt::from_bytes(&raw)?;

    let mut contents = SchematicContents::default();
    let ids = file
        .blocks
        .into_iter()
        .filter_map(|block| block.nbt?.id)
        .filter(|id| !id.is_empty());

    for id in ids {
        let namespace = id.split(':').next().unwrap_or(&id);
        contents.mods.insert(namespace.to_string());
        *contents.blocks.entry(id).or_insert(0) += 1;
    }

    log::debug!(
        "schematic holds {} block entities from {} mods",
        contents.blocks.values().sum::<u32>(),
        contents.mods.len()
    );
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde::Serialize;
    use std::io::Write;

    #[derive(Serialize)]
    struct TestFile {
        size: Vec<i32>,
        blocks: Vec<TestBlock>,
    }

    #[derive(Serialize)]
    struct TestBlock {
        pos: Vec<i32>,
        state: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        nbt: Option<TestEntity>,
    }

    #[derive(Serialize)]
    struct TestEntity {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        speed: f32,
    }

    fn block(nbt: Option<TestEntity>) -> TestBlock {
        TestBlock {
            pos: vec![0, 0, 0],
            state: 0,
            nbt,
        }
    }

    fn entity(id: &str) -> Option<TestEntity> {
        Some(TestEntity {
            id: Some(id.to_string()),
            speed: 0.0,
        })
    }

    fn structure(blocks: Vec<TestBlock>) -> Vec<u8> {
        fastnbt::to_bytes(&TestFile {
            size: vec![3, 3, 3],
            blocks,
        })
        .unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn sample() -> Vec<u8> {
        structure(vec![
            block(entity("create:cogwheel")),
            block(entity("create:cogwheel")),
            block(entity("create:shaft")),
            block(entity("minecraft:chest")),
        ])
    }

    #[test]
    fn test_counts_blocks_and_mods() {
        let contents = schematic_contents(&sample()).unwrap();
        assert_eq!(contents.blocks.get("create:cogwheel"), Some(&2));
        assert_eq!(contents.blocks.get("create:shaft"), Some(&1));
        assert_eq!(contents.blocks.get("minecraft:chest"), Some(&1));
        assert_eq!(contents.mod_list(), vec!["create".to_string(), "minecraft".to_string()]);
    }

    #[test]
    fn test_blocks_without_entity_id_are_skipped() {
        let bytes = structure(vec![
            block(None),
            block(Some(TestEntity { id: None, speed: 1.0 })),
            block(entity("")),
            block(entity("create:belt")),
        ]);
        let contents = schematic_contents(&bytes).unwrap();
        assert_eq!(contents.blocks.len(), 1);
        assert_eq!(contents.blocks.get("create:belt"), Some(&1));
        assert_eq!(contents.mod_list(), vec!["create".to_string()]);
    }

    #[test]
    fn test_mod_is_text_before_first_colon() {
        let bytes = structure(vec![block(entity("sign")), block(entity("a:b:c"))]);
        let contents = schematic_contents(&bytes).unwrap();
        assert_eq!(contents.mod_list(), vec!["a".to_string(), "sign".to_string()]);
        assert_eq!(contents.blocks.get("a:b:c"), Some(&1));
    }

    #[test]
    fn test_gzipped_file_matches_raw() {
        let raw = schematic_contents(&sample()).unwrap();
        let zipped = schematic_contents(&gzip(&sample())).unwrap();
        assert_eq!(raw, zipped);
    }

    #[test]
    fn test_file_without_blocks_is_empty() {
        let contents = schematic_contents(&structure(Vec::new())).unwrap();
        assert_eq!(contents, SchematicContents::default());
    }

    #[test]
    fn test_corrupt_input_is_rejected() {
        assert!(matches!(
            schematic_contents(b"definitely not nbt"),
            Err(SchematicFileError::Nbt(_))
        ));

        let mut truncated = gzip(&sample());
        truncated.truncate(12);
        assert!(matches!(
            schematic_contents(&truncated),
            Err(SchematicFileError::Decompress(_))
        ));
    }
}
