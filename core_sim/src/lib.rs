//! Core object and meter model for the simulation.
//!
//! Objects carry fixed-point [`Meter`]s keyed by [`MeterType`]. Observers see
//! censored copies according to their [`Visibility`] and merge them into
//! their own persistent knowledge with [`SimulationObject::copy_from`]. Each
//! turn, [`advance_meter_turn`] runs the back-propagate, reset, effects and
//! clamp phases over a registry of objects.

pub mod context;
mod merge;
pub mod meter;
pub mod meter_config;
mod meter_store;
mod meter_type;
mod object;
pub mod persistence;
pub mod signals;
mod turn;
pub mod visibility;

pub use context::{
    DumpContext, EmpireDirectory, EmpireNames, ObjectLookup, ObjectRegistry, SystemLocator,
};
pub use merge::MergedFields;
pub use meter::{from_float, to_float, Meter, MeterDecodeError, FLOAT_INT_SCALE};
pub use meter_config::{
    load_meter_config_from_env, LifecycleConfig, MeterConfig, MeterConfigError,
    MeterConfigHandle, PersistenceConfig, BUILTIN_METER_CONFIG,
};
pub use meter_store::MeterStore;
pub use meter_type::MeterType;
pub use object::{
    EmpireId, ObjectAge, ObjectId, ObjectKind, SimulationObject, Special, Specials, Turn,
    BEFORE_FIRST_TURN, INVALID_GAME_TURN,
};
pub use persistence::{MeterSchema, PersistError};
pub use signals::{ChangeNotifier, ObjectChange, SignalGate, SignalInhibitGuard, StateChange};
pub use turn::advance_meter_turn;
pub use visibility::{CensoredView, EmpireObjectVisibility, Visibility};
