//! Read-only collaborators passed into object operations, plus simple
//! in-memory implementations of them.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::merge::MergedFields;
use crate::object::{EmpireId, ObjectId, ObjectKind, SimulationObject};
use crate::signals::ChangeNotifier;
use crate::visibility::Visibility;

pub trait ObjectLookup {
    fn object(&self, id: ObjectId) -> Option<&SimulationObject>;
}

pub trait EmpireNames {
    fn empire_name(&self, empire: EmpireId) -> Option<&str>;
}

pub trait SystemLocator {
    fn nearest_system_to(&self, x: f64, y: f64) -> Option<ObjectId>;
}

/// Collaborators needed to render [`SimulationObject::dump`].
#[derive(Clone, Copy)]
pub struct DumpContext<'a> {
    pub objects: &'a dyn ObjectLookup,
    pub empires: &'a dyn EmpireNames,
    pub systems: &'a dyn SystemLocator,
}

impl<'a> DumpContext<'a> {
    pub fn new(registry: &'a ObjectRegistry, empires: &'a dyn EmpireNames) -> Self {
        Self {
            objects: registry,
            empires,
            systems: registry,
        }
    }
}

/// Objects keyed by id. Inserted objects share the registry's notifier.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    objects: BTreeMap<ObjectId, SimulationObject>,
    notifier: ChangeNotifier,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(notifier: ChangeNotifier) -> Self {
        Self {
            objects: BTreeMap::new(),
            notifier,
        }
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn insert(&mut self, mut object: SimulationObject) -> Option<SimulationObject> {
        object.attach_notifier(self.notifier.clone());
        self.objects.insert(object.id(), object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SimulationObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SimulationObject> {
        self.objects.get_mut(&id)
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SimulationObject> {
        self.objects.remove(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    pub fn iter(&self) -> btree_map::Values<'_, ObjectId, SimulationObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, ObjectId, SimulationObject> {
        self.objects.values_mut()
    }

    /// Merge an observed object into the local copy with the same id,
    /// creating a blank local copy first if none exists yet.
    ///
    /// Below `Basic` no local copy is created, since even the object's id
    /// and kind are withheld; an existing copy still gets the meter merge.
    pub fn merge_observed(
        &mut self,
        source: &SimulationObject,
        vis: Visibility,
        visible_specials: &BTreeSet<String>,
    ) -> MergedFields {
        if vis < Visibility::Basic {
            return match self.objects.get_mut(&source.id()) {
                Some(local) => local.copy_from(Some(source), vis, visible_specials),
                None => MergedFields::empty(),
            };
        }
        let notifier = self.notifier.clone();
        let local = self.objects.entry(source.id()).or_insert_with(|| {
            let mut blank = SimulationObject::new(source.id(), source.kind(), String::new());
            blank.attach_notifier(notifier);
            blank
        });
        local.copy_from(Some(source), vis, visible_specials)
    }

    /// Apply loaded objects onto the registry.
    ///
    /// Objects already present are updated in place through their notifying
    /// setters; with `inhibit_signals` set, no notifications escape while
    /// the batch is applied.
    pub fn restore(&mut self, loaded: Vec<SimulationObject>, inhibit_signals: bool) {
        let _quiet = inhibit_signals.then(|| self.notifier.gate().inhibit());
        let count = loaded.len();
        for object in loaded {
            match self.objects.get_mut(&object.id()) {
                Some(existing) => existing.overwrite_from(object),
                None => {
                    self.insert(object);
                }
            }
        }
        tracing::debug!(
            target: "meters::persist",
            objects = count,
            inhibited = inhibit_signals,
            "registry.restored"
        );
    }
}

impl ObjectLookup for ObjectRegistry {
    fn object(&self, id: ObjectId) -> Option<&SimulationObject> {
        self.get(id)
    }
}

impl SystemLocator for ObjectRegistry {
    /// Closest system by straight-line distance; ties go to the lowest id.
    fn nearest_system_to(&self, x: f64, y: f64) -> Option<ObjectId> {
        let mut best: Option<(f64, ObjectId)> = None;
        for object in self.iter().filter(|object| object.kind() == ObjectKind::System) {
            let dx = object.x() - x;
            let dy = object.y() - y;
            let distance = dx * dx + dy * dy;
            if best.map_or(true, |(closest, _)| distance < closest) {
                best = Some((distance, object.id()));
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Empire display names keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EmpireDirectory {
    names: BTreeMap<EmpireId, String>,
}

impl EmpireDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, empire: EmpireId, name: impl Into<String>) {
        self.names.insert(empire, name.into());
    }
}

impl EmpireNames for EmpireDirectory {
    fn empire_name(&self, empire: EmpireId) -> Option<&str> {
        self.names.get(&empire).map(String::as_str)
    }
}
