//! Persisted records for simulation objects and their meters.
//!
//! The records here are plain data: the owning crate converts them to and
//! from live objects. Every save starts with its `schema_version` so a
//! loader can pick the matching record shape before decoding the rest.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Schema version written by every save.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// First schema version that stores meters as packed `"<cur> <init>"` text.
pub const PACKED_METER_SCHEMA_VERSION: u32 = 2;

/// Meter stored as the packed integer text `"<current> <initial>"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackedMeter {
    pub m: String,
}

/// Meter stored as two raw floats (schema versions before 2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LegacyMeter {
    pub c: f32,
    pub i: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeterEntry<M> {
    pub kind: String,
    pub value: M,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecialRecord {
    pub name: String,
    pub added_on_turn: i32,
    pub capacity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectRecord<M> {
    pub id: i32,
    pub kind: String,
    pub owner: Option<i32>,
    pub system: Option<i32>,
    pub x: f64,
    pub y: f64,
    pub created_on_turn: i32,
    pub name: String,
    pub meters: Vec<MeterEntry<M>>,
    pub specials: Vec<SpecialRecord>,
}

/// Top-level save. A `checksum` of zero marks an unsealed save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveEnvelope<M> {
    pub schema_version: u32,
    pub checksum: u64,
    pub objects: Vec<ObjectRecord<M>>,
}

pub type CurrentSave = SaveEnvelope<PackedMeter>;
pub type LegacySave = SaveEnvelope<LegacyMeter>;

/// Reads only the version tag of a save.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SchemaProbe {
    pub schema_version: u32,
}

impl<M: Serialize> SaveEnvelope<M> {
    pub fn new(schema_version: u32, objects: Vec<ObjectRecord<M>>) -> Self {
        Self {
            schema_version,
            checksum: 0,
            objects,
        }
    }

    /// Stamp the envelope with its checksum.
    pub fn seal(mut self) -> bincode::Result<Self> {
        self.checksum = checksum(&self)?;
        Ok(self)
    }

    pub fn is_sealed(&self) -> bool {
        self.checksum != 0
    }
}

/// Checksum over the version tag and object records: the first eight bytes
/// of their SHA-256, read little-endian. Stable across builds and platforms.
pub fn checksum<M: Serialize>(save: &SaveEnvelope<M>) -> bincode::Result<u64> {
    let encoded = bincode::serialize(&(save.schema_version, &save.objects))?;
    let digest = Sha256::digest(&encoded);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    Ok(u64::from_le_bytes(prefix))
}

pub fn encode_save<M: Serialize>(save: &SaveEnvelope<M>) -> bincode::Result<Vec<u8>> {
    bincode::serialize(save)
}

pub fn decode_save<M: DeserializeOwned>(data: &[u8]) -> bincode::Result<SaveEnvelope<M>> {
    bincode::deserialize(data)
}

/// Version tag of a bincode save; the tag is always the leading field.
pub fn probe_schema(data: &[u8]) -> bincode::Result<u32> {
    bincode::deserialize::<SchemaProbe>(data).map(|probe| probe.schema_version)
}

pub fn encode_save_json<M: Serialize>(save: &SaveEnvelope<M>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(save)
}

pub fn decode_save_json<M: DeserializeOwned>(data: &str) -> serde_json::Result<SaveEnvelope<M>> {
    serde_json::from_str(data)
}

pub fn probe_schema_json(data: &str) -> serde_json::Result<u32> {
    serde_json::from_str::<SchemaProbe>(data).map(|probe| probe.schema_version)
}
