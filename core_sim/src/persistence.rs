//! Save and load objects through the versioned records in `sim_proto`.
//!
//! Loading reads the envelope's version tag first and then decodes the whole
//! save with the matching meter schema. Saving always writes the current
//! schema.

use serde::Serialize;
use sim_proto::{
    LegacyMeter, MeterEntry, ObjectRecord, PackedMeter, SaveEnvelope, SpecialRecord,
    CURRENT_SCHEMA_VERSION, PACKED_METER_SCHEMA_VERSION,
};
use thiserror::Error;

use crate::meter::{from_float, Meter, MeterDecodeError};
use crate::meter_config::PersistenceConfig;
use crate::meter_store::MeterStore;
use crate::meter_type::MeterType;
use crate::object::{EmpireId, ObjectId, ObjectKind, SimulationObject, Special, Specials};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("save checksum mismatch: stored {stored:#018x}, computed {computed:#018x}")]
    ChecksumMismatch { stored: u64, computed: u64 },
    #[error("object {object}: unknown object kind {kind:?}")]
    UnknownObjectKind { object: ObjectId, kind: String },
    #[error("object {object}: unknown meter type {kind:?}")]
    UnknownMeterType { object: ObjectId, kind: String },
    #[error("object {object}: {source}")]
    MeterText {
        object: ObjectId,
        #[source]
        source: MeterDecodeError,
    },
}

/// How meters are laid out in a save, selected by its schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterSchema {
    /// Raw `c`/`i` floats.
    Legacy,
    /// Packed `"<cur> <init>"` integer text.
    Packed,
}

impl MeterSchema {
    pub fn for_version(schema_version: u32) -> Self {
        if schema_version < PACKED_METER_SCHEMA_VERSION {
            MeterSchema::Legacy
        } else {
            MeterSchema::Packed
        }
    }
}

pub fn decode_legacy_meter(meter: &LegacyMeter) -> Meter {
    Meter::from_raw(from_float(meter.c), from_float(meter.i))
}

pub fn decode_packed_meter(meter: &PackedMeter) -> Result<Meter, MeterDecodeError> {
    Meter::from_text(&meter.m)
}

pub fn encode_meter(meter: &Meter) -> PackedMeter {
    PackedMeter {
        m: meter.encode_text(),
    }
}

/// Build a sealed current-schema save from `objects`.
pub fn save_envelope<'a, I>(objects: I) -> Result<SaveEnvelope<PackedMeter>, PersistError>
where
    I: IntoIterator<Item = &'a SimulationObject>,
{
    let records = objects.into_iter().map(object_record).collect();
    Ok(SaveEnvelope::new(CURRENT_SCHEMA_VERSION, records).seal()?)
}

pub fn save_json<'a, I>(objects: I) -> Result<String, PersistError>
where
    I: IntoIterator<Item = &'a SimulationObject>,
{
    Ok(sim_proto::encode_save_json(&save_envelope(objects)?)?)
}

pub fn save_bincode<'a, I>(objects: I) -> Result<Vec<u8>, PersistError>
where
    I: IntoIterator<Item = &'a SimulationObject>,
{
    Ok(sim_proto::encode_save(&save_envelope(objects)?)?)
}

pub fn load_json(
    data: &str,
    config: &PersistenceConfig,
) -> Result<Vec<SimulationObject>, PersistError> {
    let version = sim_proto::probe_schema_json(data)?;
    match MeterSchema::for_version(version) {
        MeterSchema::Legacy => {
            let save = sim_proto::decode_save_json::<LegacyMeter>(data)?;
            restore_objects(save, config, |meter| Ok(decode_legacy_meter(meter)))
        }
        MeterSchema::Packed => {
            let save = sim_proto::decode_save_json::<PackedMeter>(data)?;
            restore_objects(save, config, decode_packed_meter)
        }
    }
}

pub fn load_bincode(
    data: &[u8],
    config: &PersistenceConfig,
) -> Result<Vec<SimulationObject>, PersistError> {
    let version = sim_proto::probe_schema(data)?;
    match MeterSchema::for_version(version) {
        MeterSchema::Legacy => {
            let save = sim_proto::decode_save::<LegacyMeter>(data)?;
            restore_objects(save, config, |meter| Ok(decode_legacy_meter(meter)))
        }
        MeterSchema::Packed => {
            let save = sim_proto::decode_save::<PackedMeter>(data)?;
            restore_objects(save, config, decode_packed_meter)
        }
    }
}

fn object_record(object: &SimulationObject) -> ObjectRecord<PackedMeter> {
    ObjectRecord {
        id: object.id.0,
        kind: object.kind.name().to_string(),
        owner: object.owner.map(|owner| owner.0),
        system: object.system.map(|system| system.0),
        x: object.x,
        y: object.y,
        created_on_turn: object.created_on_turn,
        name: object.name.clone(),
        meters: object
            .meters
            .iter()
            .map(|(kind, meter)| MeterEntry {
                kind: kind.name().to_string(),
                value: encode_meter(meter),
            })
            .collect(),
        specials: object
            .specials
            .iter()
            .map(|(name, special)| SpecialRecord {
                name: name.clone(),
                added_on_turn: special.added_on_turn,
                capacity: special.capacity,
            })
            .collect(),
    }
}

fn restore_objects<M, F>(
    save: SaveEnvelope<M>,
    config: &PersistenceConfig,
    decode_meter: F,
) -> Result<Vec<SimulationObject>, PersistError>
where
    M: Serialize,
    F: Fn(&M) -> Result<Meter, MeterDecodeError>,
{
    if config.verify_checksum && save.is_sealed() {
        let computed = sim_proto::checksum(&save)?;
        if computed != save.checksum {
            return Err(PersistError::ChecksumMismatch {
                stored: save.checksum,
                computed,
            });
        }
    }

    let schema_version = save.schema_version;
    let objects = save
        .objects
        .into_iter()
        .map(|record| restore_object(record, &decode_meter))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(
        target: "meters::persist",
        schema_version,
        objects = objects.len(),
        "save.loaded"
    );
    Ok(objects)
}

fn restore_object<M, F>(
    record: ObjectRecord<M>,
    decode_meter: &F,
) -> Result<SimulationObject, PersistError>
where
    F: Fn(&M) -> Result<Meter, MeterDecodeError>,
{
    let object = ObjectId(record.id);
    let kind =
        ObjectKind::from_name(&record.kind).ok_or_else(|| PersistError::UnknownObjectKind {
            object,
            kind: record.kind.clone(),
        })?;

    let mut meters = MeterStore::new();
    for entry in &record.meters {
        let meter_kind =
            MeterType::from_name(&entry.kind).ok_or_else(|| PersistError::UnknownMeterType {
                object,
                kind: entry.kind.clone(),
            })?;
        let meter = decode_meter(&entry.value)
            .map_err(|source| PersistError::MeterText { object, source })?;
        meters.insert(meter_kind, meter);
    }

    let specials: Specials = record
        .specials
        .into_iter()
        .map(|special| {
            (
                special.name,
                Special {
                    added_on_turn: special.added_on_turn,
                    capacity: special.capacity,
                },
            )
        })
        .collect();

    let mut restored = SimulationObject::new(object, kind, record.name)
        .with_owner(record.owner.map(EmpireId))
        .with_system(record.system.map(ObjectId))
        .with_position(record.x, record.y)
        .with_creation_turn(record.created_on_turn);
    restored.meters = meters;
    restored.specials = specials;
    Ok(restored)
}
