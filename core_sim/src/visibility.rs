//! Visibility tiers and the censoring of object state for observers.
//!
//! Tiers are strictly ordered: a rule gated at one tier applies at every
//! higher tier as well.
//! - None: nothing is known about the object
//! - Basic: existence, position, and an undisclosed stealth meter
//! - Partial: every meter plus ownership
//! - Full: everything, including the name

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::meter::Meter;
use crate::meter_store::MeterStore;
use crate::meter_type::MeterType;
use crate::object::{EmpireId, ObjectId, SimulationObject, Specials};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Visibility {
    #[default]
    None = 0,
    Basic = 1,
    Partial = 2,
    Full = 3,
}

impl Visibility {
    pub const ALL: [Visibility; 4] = [
        Visibility::None,
        Visibility::Basic,
        Visibility::Partial,
        Visibility::Full,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Convert from u8, defaulting to None for invalid values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Basic,
            2 => Self::Partial,
            3 => Self::Full,
            _ => Self::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Visibility::None => "none",
            Visibility::Basic => "basic",
            Visibility::Partial => "partial",
            Visibility::Full => "full",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tier| tier.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-empire visibility of every object the empire knows about.
pub type EmpireObjectVisibility = BTreeMap<EmpireId, BTreeMap<ObjectId, Visibility>>;

/// Visibility `empire` has of `object`; unknown pairs are `None`.
pub fn visibility_of(
    map: &EmpireObjectVisibility,
    empire: EmpireId,
    object: ObjectId,
) -> Visibility {
    map.get(&empire)
        .and_then(|objects| objects.get(&object))
        .copied()
        .unwrap_or_default()
}

/// Keep the ids `empire` sees at `Basic` or better.
pub fn visible_object_ids<I>(
    ids: I,
    empire: EmpireId,
    map: &EmpireObjectVisibility,
) -> BTreeSet<ObjectId>
where
    I: IntoIterator<Item = ObjectId>,
{
    ids.into_iter()
        .filter(|id| visibility_of(map, empire, *id) >= Visibility::Basic)
        .collect()
}

/// Meters an observer at `vis` may learn.
pub fn censored_meters(meters: &MeterStore, vis: Visibility) -> MeterStore {
    if vis >= Visibility::Partial {
        meters.clone()
    } else if vis == Visibility::Basic && meters.contains(MeterType::Stealth) {
        std::iter::once((MeterType::Stealth, Meter::undisclosed())).collect()
    } else {
        MeterStore::new()
    }
}

/// Specials whose names the observer has been granted.
///
/// No tier gating happens here; callers only censor at `Basic` or better.
pub fn censored_specials(specials: &Specials, visible_names: &BTreeSet<String>) -> Specials {
    specials
        .iter()
        .filter(|(name, _)| visible_names.contains(name.as_str()))
        .map(|(name, special)| (name.clone(), *special))
        .collect()
}

/// The disclosable part of one object's meters and specials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CensoredView {
    pub meters: MeterStore,
    pub specials: Specials,
}

pub fn censor(
    object: &SimulationObject,
    vis: Visibility,
    visible_specials: &BTreeSet<String>,
) -> CensoredView {
    CensoredView {
        meters: censored_meters(object.meters(), vis),
        specials: censored_specials(object.specials(), visible_specials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectKind, Special};

    fn stocked_meters() -> MeterStore {
        [
            (MeterType::Population, Meter::new(12.0, 11.5)),
            (MeterType::Stealth, Meter::new(25.0, 20.0)),
            (MeterType::Detection, Meter::new(50.0, 50.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn visibility_ordering_and_names() {
        assert!(Visibility::None < Visibility::Basic);
        assert!(Visibility::Basic < Visibility::Partial);
        assert!(Visibility::Partial < Visibility::Full);
        for tier in Visibility::ALL {
            assert_eq!(Visibility::from_u8(tier.as_u8()), tier);
            assert_eq!(Visibility::from_name(tier.name()), Some(tier));
        }
        assert_eq!(Visibility::from_u8(200), Visibility::None);
        assert_eq!(Visibility::from_name("PARTIAL"), Some(Visibility::Partial));
    }

    #[test]
    fn partial_and_full_disclose_every_meter() {
        let meters = stocked_meters();
        assert_eq!(censored_meters(&meters, Visibility::Partial), meters);
        assert_eq!(censored_meters(&meters, Visibility::Full), meters);
    }

    #[test]
    fn basic_discloses_only_masked_stealth() {
        let censored = censored_meters(&stocked_meters(), Visibility::Basic);
        assert_eq!(censored.len(), 1);
        assert_eq!(censored.get(MeterType::Stealth), Some(&Meter::undisclosed()));
    }

    #[test]
    fn basic_without_stealth_discloses_nothing() {
        let mut meters = stocked_meters();
        meters.remove(MeterType::Stealth);
        assert!(censored_meters(&meters, Visibility::Basic).is_empty());
    }

    #[test]
    fn none_discloses_nothing() {
        assert!(censored_meters(&stocked_meters(), Visibility::None).is_empty());
    }

    #[test]
    fn specials_filtered_by_visible_names() {
        let mut object = SimulationObject::new(ObjectId(1), ObjectKind::Planet, "Vega I");
        object.add_special("GAIA_SPECIAL", 1.0, 3);
        object.add_special("VOLCANIC_ASH_SPECIAL", 4.0, 5);

        let visible: BTreeSet<String> = ["VOLCANIC_ASH_SPECIAL".to_string()].into();
        let view = censor(&object, Visibility::Basic, &visible);
        assert_eq!(view.specials.len(), 1);
        assert_eq!(
            view.specials.get("VOLCANIC_ASH_SPECIAL"),
            Some(&Special {
                added_on_turn: 5,
                capacity: 4.0
            })
        );
    }

    #[test]
    fn visibility_lookup_defaults_to_none() {
        let mut map = EmpireObjectVisibility::new();
        map.entry(EmpireId(1))
            .or_default()
            .insert(ObjectId(10), Visibility::Partial);
        map.entry(EmpireId(1))
            .or_default()
            .insert(ObjectId(11), Visibility::None);

        assert_eq!(visibility_of(&map, EmpireId(1), ObjectId(10)), Visibility::Partial);
        assert_eq!(visibility_of(&map, EmpireId(1), ObjectId(12)), Visibility::None);
        assert_eq!(visibility_of(&map, EmpireId(2), ObjectId(10)), Visibility::None);

        let ids = [ObjectId(10), ObjectId(11), ObjectId(12)];
        let seen = visible_object_ids(ids, EmpireId(1), &map);
        assert_eq!(seen, BTreeSet::from([ObjectId(10)]));
    }
}
