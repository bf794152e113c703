use crate::context::ObjectRegistry;
use crate::meter_config::LifecycleConfig;
use crate::object::SimulationObject;

/// Advance every object's meters through one turn.
///
/// Each phase runs over all objects before the next begins: last turn's
/// settled values are back-propagated, unpaired and paired meters are reset,
/// `apply_effects` drives the new values, and unpaired meters are clamped.
pub fn advance_meter_turn<F>(
    registry: &mut ObjectRegistry,
    config: &LifecycleConfig,
    mut apply_effects: F,
) where
    F: FnMut(&mut SimulationObject),
{
    for object in registry.iter_mut() {
        object.back_propagate_meters();
        object.reset_target_max_unpaired_meters(config);
        object.reset_paired_active_meters();
    }
    for object in registry.iter_mut() {
        apply_effects(object);
    }
    for object in registry.iter_mut() {
        object.clamp_meters(config);
    }
    tracing::debug!(
        target: "meters::turn",
        objects = registry.len(),
        "meter_turn.advanced"
    );
}
