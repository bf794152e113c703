#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::Once;

use core_sim::{persistence, ObjectRegistry, PersistenceConfig, SimulationObject};

static INIT: Once = Once::new();

pub const SYSTEM: core_sim::ObjectId = core_sim::ObjectId(1);
pub const PLANET: core_sim::ObjectId = core_sim::ObjectId(2);
pub const SHIP: core_sim::ObjectId = core_sim::ObjectId(3);

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("reading fixture {}: {err}", path.display()))
}

/// Point `METER_CONFIG_PATH` at the test configuration (unpaired clamp max 30).
pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = fixture_path("test_meter_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test meter config at {}",
            config_path.display()
        );

        std::env::set_var("METER_CONFIG_PATH", &config_path);
    });
}

pub fn load_fixture_objects(name: &str) -> Vec<SimulationObject> {
    persistence::load_json(&read_fixture(name), &PersistenceConfig::default())
        .unwrap_or_else(|err| panic!("loading fixture {name}: {err}"))
}

pub fn fixture_registry(name: &str) -> ObjectRegistry {
    let mut registry = ObjectRegistry::new();
    registry.restore(load_fixture_objects(name), true);
    registry
}
