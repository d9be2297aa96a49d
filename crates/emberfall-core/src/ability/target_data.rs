//! Ability task sampling the cursor's world impact point.

use glam::Vec3;
use tracing::trace;

use super::AbilityContext;
use crate::observer::ObserverList;
use crate::world::World;

/// Samples the hit under the player controller's cursor.
///
/// On a blocking hit the impact point is delivered to `valid_data` observers
/// and returned. On a miss, or when the ability has no player controller,
/// nothing is delivered.
#[derive(Debug, Default)]
pub struct TargetDataUnderMouse {
    /// Receives the impact point of each successful sample.
    pub valid_data: ObserverList<Vec3>,
}

impl TargetDataUnderMouse {
    /// Creates the task with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the cursor once.
    pub fn activate(&mut self, ctx: &AbilityContext, world: &World) -> Option<Vec3> {
        let controller = ctx.player_controller()?;
        let hit = world.hit_result_under_cursor(controller)?;
        trace!(controller = %controller, point = ?hit.impact_point, "target data under mouse");
        self.valid_data.notify(&hit.impact_point);
        Some(hit.impact_point)
    }
}
