//! Ordered per-object meter storage and the per-turn meter lifecycle.
//!
//! A turn driven by the external engine runs, in order:
//! [`MeterStore::back_propagate`], then
//! [`MeterStore::reset_target_max_unpaired_meters`] and
//! [`MeterStore::reset_paired_active_meters`], then effects, then
//! [`MeterStore::clamp_unpaired_meters`].

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::meter::Meter;
use crate::meter_config::LifecycleConfig;
use crate::meter_type::MeterType;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeterStore {
    meters: BTreeMap<MeterType, Meter>,
}

impl MeterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }

    pub fn contains(&self, kind: MeterType) -> bool {
        self.meters.contains_key(&kind)
    }

    pub fn get(&self, kind: MeterType) -> Option<&Meter> {
        self.meters.get(&kind)
    }

    pub fn get_mut(&mut self, kind: MeterType) -> Option<&mut Meter> {
        self.meters.get_mut(&kind)
    }

    /// Return the meter for `kind`, registering a default `(0, 0)` entry first if needed.
    pub fn register(&mut self, kind: MeterType) -> &mut Meter {
        self.meters.entry(kind).or_default()
    }

    pub fn insert(&mut self, kind: MeterType, meter: Meter) -> Option<Meter> {
        self.meters.insert(kind, meter)
    }

    pub fn remove(&mut self, kind: MeterType) -> Option<Meter> {
        self.meters.remove(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = MeterType> + '_ {
        self.meters.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeterType, &Meter)> {
        self.meters.iter().map(|(kind, meter)| (*kind, meter))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MeterType, &mut Meter)> {
        self.meters.iter_mut().map(|(kind, meter)| (*kind, meter))
    }

    /// Set `initial := current` on every meter.
    pub fn back_propagate(&mut self) {
        for meter in self.meters.values_mut() {
            meter.back_propagate();
        }
    }

    /// Reset `current` of unpaired meters to the configured value; `initial` is kept.
    pub fn reset_target_max_unpaired_meters(&mut self, config: &LifecycleConfig) {
        for (_, meter) in self.unpaired_mut() {
            meter.set_current(config.unpaired_reset_value);
        }
    }

    /// Restart every paired active meter from last turn's settled baseline.
    pub fn reset_paired_active_meters(&mut self) {
        for (kind, meter) in self.meters.range_mut(MeterType::PAIRED_ACTIVE) {
            debug_assert!(kind.is_paired_active());
            let baseline = meter.raw_initial();
            *meter = Meter::from_raw(baseline, baseline);
        }
    }

    /// Clamp `current` of unpaired meters to the configured range.
    pub fn clamp_unpaired_meters(&mut self, config: &LifecycleConfig) {
        for (_, meter) in self.unpaired_mut() {
            meter.clamp_current_to_range(config.unpaired_clamp_min, config.unpaired_clamp_max);
        }
    }

    fn unpaired_mut(&mut self) -> impl Iterator<Item = (&MeterType, &mut Meter)> {
        self.meters.iter_mut().filter(|(kind, _)| kind.is_unpaired())
    }
}

impl FromIterator<(MeterType, Meter)> for MeterStore {
    fn from_iter<I: IntoIterator<Item = (MeterType, Meter)>>(iter: I) -> Self {
        Self {
            meters: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MeterStore {
    type Item = (&'a MeterType, &'a Meter);
    type IntoIter = btree_map::Iter<'a, MeterType, Meter>;

    fn into_iter(self) -> Self::IntoIter {
        self.meters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_every_kind() -> MeterStore {
        MeterType::ALL
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let index = index as i32;
                (*kind, Meter::from_raw(1_000 + index, 100 + index))
            })
            .collect()
    }

    #[test]
    fn register_creates_default_entry_once() {
        let mut store = MeterStore::new();
        store.register(MeterType::Stealth).set_current(5.0);
        store.register(MeterType::Stealth);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(MeterType::Stealth), Some(&Meter::new(5.0, 0.0)));
    }

    #[test]
    fn turn_sequence_settles_baseline() {
        let mut store = MeterStore::new();
        store.insert(MeterType::Industry, Meter::new(10.0, 10.0));

        // effects drive the meter upward
        store
            .get_mut(MeterType::Industry)
            .expect("registered")
            .set_current(18.0);

        store.back_propagate();
        assert_eq!(store.get(MeterType::Industry), Some(&Meter::new(18.0, 18.0)));

        store.reset_paired_active_meters();
        assert_eq!(store.get(MeterType::Industry), Some(&Meter::new(18.0, 18.0)));
    }

    #[test]
    fn paired_reset_only_touches_paired_range() {
        let before = store_with_every_kind();
        let mut after = before.clone();
        after.reset_paired_active_meters();

        for (kind, meter) in after.iter() {
            let previous = before.get(kind).expect("same kinds");
            if kind.is_paired_active() {
                assert_eq!(meter.raw_current(), meter.raw_initial(), "{kind} not reset");
                assert_eq!(meter.raw_initial(), previous.raw_initial());
            } else {
                assert_eq!(meter, previous, "{kind} should be untouched");
                assert_ne!(meter.raw_current(), meter.raw_initial());
            }
        }
    }

    #[test]
    fn unpaired_reset_only_changes_stealth_current() {
        let before = store_with_every_kind();
        let mut after = before.clone();
        after.reset_target_max_unpaired_meters(&LifecycleConfig::default());

        for (kind, meter) in after.iter() {
            let previous = before.get(kind).expect("same kinds");
            if kind == MeterType::Stealth {
                assert_eq!(meter.current(), Meter::DEFAULT_VALUE);
                assert_eq!(meter.raw_initial(), previous.raw_initial());
            } else {
                assert_eq!(meter, previous);
            }
        }
    }

    #[test]
    fn unpaired_reset_honours_configured_value() {
        let mut store = MeterStore::new();
        store.insert(MeterType::Stealth, Meter::new(40.0, 35.0));
        let config = LifecycleConfig {
            unpaired_reset_value: 5.0,
            ..LifecycleConfig::default()
        };
        store.reset_target_max_unpaired_meters(&config);
        assert_eq!(store.get(MeterType::Stealth), Some(&Meter::new(5.0, 35.0)));
    }

    #[test]
    fn clamp_only_affects_unpaired_meters() {
        let mut store = MeterStore::new();
        store.insert(MeterType::Stealth, Meter::new(-4.0, -4.0));
        store.insert(MeterType::Population, Meter::new(-4.0, -4.0));
        store.insert(MeterType::Detection, Meter::new(70_000.0, 0.0));

        store.clamp_unpaired_meters(&LifecycleConfig::default());

        assert_eq!(store.get(MeterType::Stealth), Some(&Meter::new(0.0, -4.0)));
        assert_eq!(store.get(MeterType::Population), Some(&Meter::new(-4.0, -4.0)));
        assert_eq!(store.get(MeterType::Detection), Some(&Meter::new(70_000.0, 0.0)));
    }

    #[test]
    fn back_propagate_commits_every_meter() {
        let mut store = store_with_every_kind();
        store.back_propagate();
        assert!(store
            .iter()
            .all(|(_, meter)| meter.raw_current() == meter.raw_initial()));
    }

    #[test]
    fn iteration_follows_kind_order() {
        let store: MeterStore = [
            (MeterType::Stealth, Meter::default()),
            (MeterType::Population, Meter::default()),
            (MeterType::TargetPopulation, Meter::default()),
        ]
        .into_iter()
        .collect();
        let kinds: Vec<_> = store.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                MeterType::TargetPopulation,
                MeterType::Population,
                MeterType::Stealth
            ]
        );
    }
}
