use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::context::DumpContext;
use crate::meter::Meter;
use crate::meter_config::LifecycleConfig;
use crate::meter_store::MeterStore;
use crate::meter_type::MeterType;
use crate::signals::{ChangeNotifier, ObjectChange};
use crate::visibility::{self, EmpireObjectVisibility, Visibility};

pub type Turn = i32;

/// Creation turn of objects that exist before the game starts.
pub const BEFORE_FIRST_TURN: Turn = -(2 << 15);
pub const INVALID_GAME_TURN: Turn = -(2 << 15) + 1;

/// Identifier for an object in the simulation's registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub i32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an empire that can own objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmpireId(pub i32);

impl fmt::Display for EmpireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Building,
    Ship,
    Fleet,
    Planet,
    System,
    Field,
    Fighter,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 7] = [
        ObjectKind::Building,
        ObjectKind::Ship,
        ObjectKind::Fleet,
        ObjectKind::Planet,
        ObjectKind::System,
        ObjectKind::Field,
        ObjectKind::Fighter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Building => "OBJ_BUILDING",
            ObjectKind::Ship => "OBJ_SHIP",
            ObjectKind::Fleet => "OBJ_FLEET",
            ObjectKind::Planet => "OBJ_PLANET",
            ObjectKind::System => "OBJ_SYSTEM",
            ObjectKind::Field => "OBJ_FIELD",
            ObjectKind::Fighter => "OBJ_FIGHTER",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named tag on an object: when it first appeared and how strong it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Special {
    pub added_on_turn: Turn,
    pub capacity: f32,
}

pub type Specials = BTreeMap<String, Special>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAge {
    Turns(i32),
    /// Created before the first turn.
    SinceBeforeTime,
    /// Creation turn or current turn is not a valid game turn.
    Unknown,
}

/// Generic game object: identity, placement, ownership, meters and specials.
#[derive(Debug, Clone)]
pub struct SimulationObject {
    pub(crate) id: ObjectId,
    pub(crate) kind: ObjectKind,
    pub(crate) owner: Option<EmpireId>,
    pub(crate) system: Option<ObjectId>,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) created_on_turn: Turn,
    pub(crate) name: String,
    pub(crate) meters: MeterStore,
    pub(crate) specials: Specials,
    notifier: ChangeNotifier,
}

impl SimulationObject {
    /// Unowned object at the origin, created before the first turn, with no meters.
    pub fn new(id: ObjectId, kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            owner: None,
            system: None,
            x: 0.0,
            y: 0.0,
            created_on_turn: BEFORE_FIRST_TURN,
            name: name.into(),
            meters: MeterStore::new(),
            specials: Specials::new(),
            notifier: ChangeNotifier::detached(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_owner(mut self, owner: Option<EmpireId>) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_system(mut self, system: Option<ObjectId>) -> Self {
        self.system = system;
        self
    }

    pub fn with_creation_turn(mut self, turn: Turn) -> Self {
        self.created_on_turn = turn;
        self
    }

    /// Register the meters every object carries.
    pub fn init(&mut self) {
        self.add_meter(MeterType::Stealth);
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn owner(&self) -> Option<EmpireId> {
        self.owner
    }

    pub fn system_id(&self) -> Option<ObjectId> {
        self.system
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn created_on_turn(&self) -> Turn {
        self.created_on_turn
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meters(&self) -> &MeterStore {
        &self.meters
    }

    pub fn meters_mut(&mut self) -> &mut MeterStore {
        &mut self.meters
    }

    pub fn specials(&self) -> &Specials {
        &self.specials
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn attach_notifier(&mut self, notifier: ChangeNotifier) {
        self.notifier = notifier;
    }

    pub fn unowned(&self) -> bool {
        self.owner.is_none()
    }

    pub fn owned_by(&self, empire: EmpireId) -> bool {
        self.owner == Some(empire)
    }

    pub fn age_in_turns(&self, current_turn: Turn) -> ObjectAge {
        if self.created_on_turn == BEFORE_FIRST_TURN {
            return ObjectAge::SinceBeforeTime;
        }
        if self.created_on_turn == INVALID_GAME_TURN || current_turn == INVALID_GAME_TURN {
            return ObjectAge::Unknown;
        }
        ObjectAge::Turns(current_turn - self.created_on_turn)
    }

    pub fn visibility(&self, empire: EmpireId, map: &EmpireObjectVisibility) -> Visibility {
        visibility::visibility_of(map, empire, self.id)
    }

    /// Objects held inside this one. Generic objects hold none.
    pub fn contained_object_ids(&self) -> BTreeSet<ObjectId> {
        BTreeSet::new()
    }

    pub fn visible_contained_object_ids(
        &self,
        empire: EmpireId,
        map: &EmpireObjectVisibility,
    ) -> BTreeSet<ObjectId> {
        visibility::visible_object_ids(self.contained_object_ids(), empire, map)
    }

    pub fn set_id(&mut self, id: ObjectId) {
        self.id = id;
        self.notifier.notify(self.id, ObjectChange::ID);
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.notifier.notify(self.id, ObjectChange::NAME);
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.move_to(self.x + dx, self.y + dy);
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        if self.x == x && self.y == y {
            return;
        }
        self.x = x;
        self.y = y;
        self.notifier.notify(self.id, ObjectChange::POSITION);
    }

    /// Move onto another object's position; a missing target is logged and ignored.
    pub fn move_to_object(&mut self, target: Option<&SimulationObject>) {
        let Some(target) = target else {
            tracing::error!(
                target: "meters::object",
                object = %self.id,
                "move.rejected=missing_target"
            );
            return;
        };
        self.move_to(target.x, target.y);
    }

    pub fn set_owner(&mut self, owner: Option<EmpireId>) {
        if self.owner != owner {
            self.owner = owner;
            self.notifier.notify(self.id, ObjectChange::OWNER);
        }
    }

    pub fn set_system(&mut self, system: Option<ObjectId>) {
        if self.system != system {
            self.system = system;
            self.notifier.notify(self.id, ObjectChange::SYSTEM);
        }
    }

    pub fn meter(&self, kind: MeterType) -> Option<&Meter> {
        self.meters.get(kind)
    }

    pub fn meter_mut(&mut self, kind: MeterType) -> Option<&mut Meter> {
        self.meters.get_mut(kind)
    }

    pub fn add_meter(&mut self, kind: MeterType) {
        self.meters.register(kind);
    }

    /// Register a meter by its persisted name; unknown names are logged and ignored.
    pub fn add_meter_named(&mut self, name: &str) {
        match MeterType::from_name(name) {
            Some(kind) => self.add_meter(kind),
            None => tracing::error!(
                target: "meters::object",
                object = %self.id,
                meter = name,
                "meter.rejected=invalid_type"
            ),
        }
    }

    pub fn censored_meters(&self, vis: Visibility) -> MeterStore {
        visibility::censored_meters(&self.meters, vis)
    }

    pub fn back_propagate_meters(&mut self) {
        self.meters.back_propagate();
    }

    pub fn reset_target_max_unpaired_meters(&mut self, config: &LifecycleConfig) {
        self.meters.reset_target_max_unpaired_meters(config);
    }

    pub fn reset_paired_active_meters(&mut self) {
        self.meters.reset_paired_active_meters();
    }

    pub fn clamp_meters(&mut self, config: &LifecycleConfig) {
        self.meters.clamp_unpaired_meters(config);
    }

    pub fn has_special(&self, name: &str) -> bool {
        self.specials.contains_key(name)
    }

    pub fn special_added_on_turn(&self, name: &str) -> Option<Turn> {
        self.specials.get(name).map(|special| special.added_on_turn)
    }

    /// Capacity of the named special, or 0 when absent.
    pub fn special_capacity(&self, name: &str) -> f32 {
        self.specials
            .get(name)
            .map(|special| special.capacity)
            .unwrap_or(0.0)
    }

    /// Add or replace a special, stamping it with `current_turn`.
    pub fn add_special(&mut self, name: impl Into<String>, capacity: f32, current_turn: Turn) {
        self.specials.insert(
            name.into(),
            Special {
                added_on_turn: current_turn,
                capacity,
            },
        );
    }

    /// Update capacity, keeping the turn it was added on; absent specials are added.
    pub fn set_special_capacity(&mut self, name: &str, capacity: f32, current_turn: Turn) {
        match self.specials.get_mut(name) {
            Some(special) => special.capacity = capacity,
            None => self.add_special(name, capacity, current_turn),
        }
    }

    pub fn remove_special(&mut self, name: &str) -> Option<Special> {
        self.specials.remove(name)
    }

    /// Replace identity, placement and stored state with `loaded`, going
    /// through the notifying setters.
    pub(crate) fn overwrite_from(&mut self, loaded: SimulationObject) {
        if self.id != loaded.id {
            self.set_id(loaded.id);
        }
        self.kind = loaded.kind;
        if self.name != loaded.name {
            self.rename(loaded.name);
        }
        self.move_to(loaded.x, loaded.y);
        self.set_owner(loaded.owner);
        self.set_system(loaded.system);
        self.created_on_turn = loaded.created_on_turn;
        self.meters = loaded.meters;
        self.specials = loaded.specials;
    }

    /// One-line diagnostic description of the object.
    pub fn dump(&self, ctx: &DumpContext<'_>) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(&format!("{} {}: {}", self.kind, self.id, self.name));

        let system = self
            .system
            .and_then(|id| ctx.objects.object(id))
            .filter(|object| object.kind == ObjectKind::System);
        match system {
            Some(system) => {
                if system.name.is_empty() {
                    out.push_str(&format!("  at: (System {})", system.id));
                } else {
                    out.push_str(&format!("  at: {}", system.name));
                }
            }
            None => {
                out.push_str(&format!("  at: ({:.6}, {:.6})", self.x, self.y));
                let nearest = ctx
                    .systems
                    .nearest_system_to(self.x, self.y)
                    .and_then(|id| ctx.objects.object(id))
                    .filter(|object| object.kind == ObjectKind::System);
                if let Some(nearest) = nearest {
                    if nearest.name.is_empty() {
                        out.push_str(&format!(" nearest (System {})", nearest.id));
                    } else {
                        out.push_str(&format!(" nearest {}", nearest.name));
                    }
                }
            }
        }

        match self.owner {
            None => out.push_str(" owner: (Unowned) "),
            Some(owner) => {
                let name = ctx.empires.empire_name(owner).unwrap_or("(Unknown Empire)");
                out.push_str(&format!(" owner: {name}"));
            }
        }

        out.push_str(&format!(
            " created on turn: {} specials: ",
            self.created_on_turn
        ));
        for (name, special) in &self.specials {
            out.push_str(&format!(
                "({}, {}, {:.6}) ",
                name, special.added_on_turn, special.capacity
            ));
        }

        out.push_str("  Meters: ");
        for (kind, meter) in self.meters.iter() {
            out.push_str(&format!("{kind}: {meter}  "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EmpireDirectory, ObjectRegistry};
    use crate::signals::{SignalGate, StateChange};

    fn observed(object: &mut SimulationObject) -> crossbeam_channel::Receiver<StateChange> {
        let (notifier, receiver) = ChangeNotifier::channel(SignalGate::new());
        object.attach_notifier(notifier);
        receiver
    }

    fn drain(receiver: &crossbeam_channel::Receiver<StateChange>) -> Vec<ObjectChange> {
        receiver.try_iter().map(|event| event.change).collect()
    }

    #[test]
    fn init_registers_stealth() {
        let mut object = SimulationObject::new(ObjectId(1), ObjectKind::Ship, "Scout");
        assert!(object.meters().is_empty());
        object.init();
        assert_eq!(object.meter(MeterType::Stealth), Some(&Meter::default()));
    }

    #[test]
    fn add_meter_named_rejects_unknown_names() {
        let mut object = SimulationObject::new(ObjectId(1), ObjectKind::Ship, "Scout");
        object.add_meter_named("METER_FUEL");
        object.add_meter_named("METER_WARP_CORE");
        let kinds: Vec<_> = object.meters().kinds().collect();
        assert_eq!(kinds, vec![MeterType::Fuel]);
    }

    #[test]
    fn setters_notify_only_on_change() {
        let mut object = SimulationObject::new(ObjectId(3), ObjectKind::Fleet, "Home Fleet");
        let receiver = observed(&mut object);

        object.move_to(0.0, 0.0);
        object.set_owner(None);
        object.set_system(None);
        assert!(drain(&receiver).is_empty());

        object.move_by(2.0, 3.0);
        object.set_owner(Some(EmpireId(1)));
        object.set_system(Some(ObjectId(40)));
        object.rename("Home Fleet");
        object.set_id(ObjectId(3));
        assert_eq!(
            drain(&receiver),
            vec![
                ObjectChange::POSITION,
                ObjectChange::OWNER,
                ObjectChange::SYSTEM,
                ObjectChange::NAME,
                ObjectChange::ID,
            ]
        );
        assert_eq!((object.x(), object.y()), (2.0, 3.0));
    }

    #[test]
    fn move_to_missing_object_is_a_no_op() {
        let mut object = SimulationObject::new(ObjectId(3), ObjectKind::Fleet, "Fleet")
            .with_position(5.0, 6.0);
        let receiver = observed(&mut object);
        object.move_to_object(None);
        assert_eq!((object.x(), object.y()), (5.0, 6.0));
        assert!(drain(&receiver).is_empty());

        let target = SimulationObject::new(ObjectId(4), ObjectKind::Planet, "Target")
            .with_position(-1.0, 9.5);
        object.move_to_object(Some(&target));
        assert_eq!((object.x(), object.y()), (-1.0, 9.5));
        assert_eq!(drain(&receiver), vec![ObjectChange::POSITION]);
    }

    #[test]
    fn inhibited_gate_keeps_mutation_semantics() {
        let gate = SignalGate::new();
        let (notifier, receiver) = ChangeNotifier::channel(gate.clone());
        let mut object = SimulationObject::new(ObjectId(8), ObjectKind::Planet, "Old");
        object.attach_notifier(notifier);
        {
            let _quiet = gate.inhibit();
            object.rename("New");
            object.set_owner(Some(EmpireId(2)));
        }
        assert_eq!(object.name(), "New");
        assert!(object.owned_by(EmpireId(2)));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn ownership_queries() {
        let object = SimulationObject::new(ObjectId(1), ObjectKind::Planet, "P");
        assert!(object.unowned());
        assert!(!object.owned_by(EmpireId(1)));

        let owned = object.with_owner(Some(EmpireId(1)));
        assert!(!owned.unowned());
        assert!(owned.owned_by(EmpireId(1)));
        assert!(!owned.owned_by(EmpireId(2)));
    }

    #[test]
    fn age_handles_sentinel_turns() {
        let object = SimulationObject::new(ObjectId(1), ObjectKind::Planet, "P");
        assert_eq!(object.age_in_turns(10), ObjectAge::SinceBeforeTime);

        let recent = object.clone().with_creation_turn(4);
        assert_eq!(recent.age_in_turns(10), ObjectAge::Turns(6));
        assert_eq!(recent.age_in_turns(INVALID_GAME_TURN), ObjectAge::Unknown);

        let invalid = object.with_creation_turn(INVALID_GAME_TURN);
        assert_eq!(invalid.age_in_turns(10), ObjectAge::Unknown);
    }

    #[test]
    fn special_capacity_updates_keep_turn() {
        let mut object = SimulationObject::new(ObjectId(1), ObjectKind::Planet, "P");
        object.add_special("GAIA_SPECIAL", 2.0, 5);
        object.set_special_capacity("GAIA_SPECIAL", 7.5, 9);
        assert_eq!(object.special_added_on_turn("GAIA_SPECIAL"), Some(5));
        assert_eq!(object.special_capacity("GAIA_SPECIAL"), 7.5);

        object.set_special_capacity("MINERALS_SPECIAL", 1.0, 9);
        assert_eq!(object.special_added_on_turn("MINERALS_SPECIAL"), Some(9));

        assert!(object.remove_special("GAIA_SPECIAL").is_some());
        assert!(!object.has_special("GAIA_SPECIAL"));
        assert_eq!(object.special_capacity("GAIA_SPECIAL"), 0.0);
        assert_eq!(object.special_added_on_turn("GAIA_SPECIAL"), None);
    }

    #[test]
    fn generic_objects_contain_nothing() {
        let object = SimulationObject::new(ObjectId(1), ObjectKind::Building, "Shipyard");
        assert!(object.contained_object_ids().is_empty());
        assert!(object
            .visible_contained_object_ids(EmpireId(1), &EmpireObjectVisibility::new())
            .is_empty());
    }

    #[test]
    fn dump_in_system_with_owner_and_meters() {
        let mut registry = ObjectRegistry::new();
        registry.insert(SimulationObject::new(ObjectId(1), ObjectKind::System, "Sol"));
        let mut empires = EmpireDirectory::new();
        empires.insert(EmpireId(2), "Terran Union");

        let mut planet = SimulationObject::new(ObjectId(5), ObjectKind::Planet, "Earth")
            .with_system(Some(ObjectId(1)))
            .with_owner(Some(EmpireId(2)))
            .with_creation_turn(3);
        planet.add_special("GAIA_SPECIAL", 1.5, 2);
        planet.meters_mut().insert(MeterType::Population, Meter::new(45.5, 4.0));

        let ctx = DumpContext::new(&registry, &empires);
        assert_eq!(
            planet.dump(&ctx),
            "OBJ_PLANET 5: Earth  at: Sol owner: Terran Union created on turn: 3 \
             specials: (GAIA_SPECIAL, 2, 1.500000)   Meters: \
             METER_POPULATION: Cur: 45.5 Init: 4.00  "
        );
    }

    #[test]
    fn dump_in_deep_space_names_nearest_system() {
        let mut registry = ObjectRegistry::new();
        registry.insert(
            SimulationObject::new(ObjectId(1), ObjectKind::System, "")
                .with_position(10.0, 0.0),
        );
        let empires = EmpireDirectory::new();

        let mut ship = SimulationObject::new(ObjectId(7), ObjectKind::Ship, "Drifter")
            .with_position(8.0, 1.0)
            .with_owner(Some(EmpireId(9)))
            .with_creation_turn(1);
        ship.init();

        let ctx = DumpContext::new(&registry, &empires);
        assert_eq!(
            ship.dump(&ctx),
            "OBJ_SHIP 7: Drifter  at: (8.000000, 1.000000) nearest (System 1) \
             owner: (Unknown Empire) created on turn: 1 specials:   Meters: \
             METER_STEALTH: Cur: 0.00 Init: 0.00  "
        );
    }
}
