//! Merging an observed object into an observer's persistent copy.
//!
//! Meters are merged for every kind the source carries, before and
//! independently of the tier gating that decides which plain fields are
//! copied. A censored `(LARGE_VALUE, LARGE_VALUE)` meter only seeds kinds the
//! destination has never seen; it never overwrites a known value.

use std::collections::BTreeSet;

use bitflags::bitflags;

use crate::object::SimulationObject;
use crate::visibility::{self, Visibility};

bitflags! {
    /// Field groups copied by [`SimulationObject::copy_from`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MergedFields: u16 {
        const KIND = 1 << 0;
        const ID = 1 << 1;
        const SYSTEM = 1 << 2;
        const POSITION = 1 << 3;
        const SPECIALS = 1 << 4;
        const OWNER = 1 << 5;
        const CREATION_TURN = 1 << 6;
        const NAME = 1 << 7;
    }
}

impl MergedFields {
    /// Field groups an observer at `vis` is entitled to.
    pub fn for_visibility(vis: Visibility) -> Self {
        let mut fields = MergedFields::empty();
        if vis >= Visibility::Basic {
            fields |= MergedFields::KIND
                | MergedFields::ID
                | MergedFields::SYSTEM
                | MergedFields::POSITION
                | MergedFields::SPECIALS;
        }
        if vis >= Visibility::Partial {
            fields |= MergedFields::OWNER | MergedFields::CREATION_TURN;
        }
        if vis >= Visibility::Full {
            fields |= MergedFields::NAME;
        }
        fields
    }
}

impl SimulationObject {
    /// Merge what an observer at `vis` may learn about `source` into `self`.
    ///
    /// A missing source is logged and leaves `self` untouched. Returns the
    /// field groups that were copied.
    pub fn copy_from(
        &mut self,
        source: Option<&SimulationObject>,
        vis: Visibility,
        visible_specials: &BTreeSet<String>,
    ) -> MergedFields {
        let Some(source) = source else {
            tracing::error!(
                target: "meters::object",
                object = %self.id,
                "merge.rejected=null_source"
            );
            return MergedFields::empty();
        };

        let censored = visibility::censored_meters(&source.meters, vis);
        for kind in source.meters.kinds() {
            let already_known = self.meters.contains(kind);
            let local = self.meters.register(kind);
            if let Some(disclosed) = censored.get(kind) {
                if !already_known || !disclosed.is_undisclosed() {
                    *local = *disclosed;
                }
            }
        }

        let fields = MergedFields::for_visibility(vis);
        if fields.contains(MergedFields::KIND) {
            self.kind = source.kind;
        }
        if fields.contains(MergedFields::ID) {
            self.id = source.id;
        }
        if fields.contains(MergedFields::SYSTEM) {
            self.system = source.system;
        }
        if fields.contains(MergedFields::POSITION) {
            self.x = source.x;
            self.y = source.y;
        }
        if fields.contains(MergedFields::SPECIALS) {
            self.specials = visibility::censored_specials(&source.specials, visible_specials);
        }
        if fields.contains(MergedFields::OWNER) {
            self.owner = source.owner;
        }
        if fields.contains(MergedFields::CREATION_TURN) {
            self.created_on_turn = source.created_on_turn;
        }
        if fields.contains(MergedFields::NAME) {
            self.name.clone_from(&source.name);
        }

        tracing::trace!(
            target: "meters::object",
            object = %self.id,
            visibility = %vis,
            fields = ?fields,
            "merge.applied"
        );
        fields
    }
}
