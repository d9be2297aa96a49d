//! Projectile flight and impact.
//!
//! Every tick each live projectile moves by its velocity and loses lifetime.
//! Expired projectiles are removed. On the side with authority, a projectile
//! overlapping a character other than its instigator applies its attached
//! effect (if any) to that character's ability system and is removed.
//! Without authority projectiles only fly; impacts arrive from the owner.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::entity::{Entity, EntityId};
use crate::world::World;

/// Something that happened to a projectile during [`update_projectiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectileEvent {
    /// The projectile overlapped `target` and was removed.
    Impact {
        /// The projectile.
        projectile: EntityId,
        /// The character it hit.
        target: EntityId,
    },
    /// The projectile's lifetime ran out.
    Expired {
        /// The projectile.
        projectile: EntityId,
    },
}

/// Advances every projectile by `dt` seconds.
///
/// Projectiles are processed in ID order; overlap candidates are checked in
/// ID order and the first one wins.
pub fn update_projectiles(world: &mut World, dt: f32) -> Vec<ProjectileEvent> {
    let ids: Vec<EntityId> = world
        .entities_sorted()
        .filter(|e| e.as_projectile().is_some())
        .map(Entity::id)
        .collect();

    let mut events = Vec::new();
    for id in ids {
        let Some(projectile) = world.get_mut(id).and_then(Entity::as_projectile_mut) else {
            continue;
        };
        projectile.transform.location += projectile.velocity * dt;
        projectile.remaining_life -= dt;

        if projectile.remaining_life <= 0.0 {
            world.despawn(id);
            trace!(projectile = %id, "projectile expired");
            events.push(ProjectileEvent::Expired { projectile: id });
            continue;
        }

        if !world.has_authority(id) {
            continue;
        }
        if let Some(target) = find_overlap(world, id) {
            impact(world, id, target);
            events.push(ProjectileEvent::Impact {
                projectile: id,
                target,
            });
        }
    }
    events
}

fn find_overlap(world: &World, id: EntityId) -> Option<EntityId> {
    let projectile = world.get(id)?.as_projectile()?;
    let location = projectile.transform.location;

    world.entities_sorted().find_map(|entity| {
        let character = entity.as_character()?;
        if Some(entity.id()) == projectile.instigator {
            return None;
        }
        let reach = character.collision_radius + projectile.collision_radius;
        (character.transform.location.distance_squared(location) <= reach * reach)
            .then(|| entity.id())
    })
}

fn impact(world: &mut World, id: EntityId, target: EntityId) {
    let Some(removed) = world.despawn(id) else {
        return;
    };
    let effect = removed
        .as_projectile()
        .and_then(|projectile| projectile.damage_effect.clone());
    debug!(projectile = %id, target = %target, payload = effect.is_some(), "projectile impact");

    let (Some(effect), Some(system)) = (effect, world.ability_system_of(target)) else {
        return;
    };
    if let Err(err) = world.apply_effect_spec_to_target(&effect, system) {
        warn!(%err, projectile = %id, "projectile payload not applied");
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::ability::AbilitySystemId;
    use crate::attribute::{AttributeId, AttributeSet};
    use crate::config::{AttributeDefaults, ClampPolicy};
    use crate::effect::{EffectContext, EffectSpec, ModifierOp};
    use crate::entity::components::{CharacterComponents, EnemyComponents, ProjectileComponents};
    use crate::entity::{EntityInner, EntityTag, NetRole, TransformState};

    fn launch(
        world: &mut World,
        from: Vec3,
        velocity: Vec3,
        instigator: Option<EntityId>,
    ) -> EntityId {
        let mut projectile = ProjectileComponents::default();
        projectile.transform = TransformState::at(from);
        projectile.velocity = velocity;
        projectile.instigator = instigator;
        projectile.damage_effect = Some(
            EffectSpec::new(EffectContext::empty())
                .with_modifier(AttributeId::Health, ModifierOp::Add, -4.0),
        );
        world.spawn(EntityTag::Projectile, EntityInner::Projectile(projectile))
    }

    fn enemy_with_health(world: &mut World, at: Vec3) -> (EntityId, AbilitySystemId) {
        let enemy = world.spawn(
            EntityTag::Enemy,
            EntityInner::Enemy(EnemyComponents::at_location(at)),
        );
        let asc = world.add_ability_system(
            enemy,
            AttributeSet::new(&AttributeDefaults::default(), ClampPolicy::Passthrough),
        );
        world.init_ability_actor_info(asc, enemy).unwrap();
        (enemy, asc)
    }

    #[test]
    fn projectile_moves_by_velocity() {
        let mut world = World::default();
        let id = launch(&mut world, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), None);
        let events = update_projectiles(&mut world, 0.5);
        assert!(events.is_empty());
        let location = world.get(id).unwrap().transform().unwrap().location;
        assert_eq!(location, Vec3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn projectile_expires() {
        let mut world = World::default();
        let id = launch(&mut world, Vec3::new(0.0, 0.0, 5000.0), Vec3::ZERO, None);
        let events = update_projectiles(&mut world, 20.0);
        assert_eq!(events, vec![ProjectileEvent::Expired { projectile: id }]);
        assert!(world.get(id).is_none());
    }

    #[test]
    fn impact_applies_payload() {
        let mut world = World::default();
        let (enemy, asc) = enemy_with_health(&mut world, Vec3::new(100.0, 0.0, 0.0));
        let id = launch(&mut world, Vec3::new(40.0, 0.0, 0.0), Vec3::ZERO, None);

        let events = update_projectiles(&mut world, 0.1);
        assert_eq!(
            events,
            vec![ProjectileEvent::Impact {
                projectile: id,
                target: enemy
            }]
        );
        assert!(world.get(id).is_none());
        assert_eq!(
            world.ability_system(asc).unwrap().attributes().get(AttributeId::Health),
            6.0
        );
    }

    #[test]
    fn instigator_is_never_hit() {
        let mut world = World::default();
        let hero = world.spawn(EntityTag::Hero, EntityInner::Hero(CharacterComponents::default()));
        let id = launch(&mut world, Vec3::ZERO, Vec3::ZERO, Some(hero));
        assert!(update_projectiles(&mut world, 0.1).is_empty());
        assert!(world.get(id).is_some());
    }

    #[test]
    fn proxies_do_not_resolve_impacts() {
        let mut world = World::new(NetRole::SimulatedProxy);
        let (_, asc) = enemy_with_health(&mut world, Vec3::new(100.0, 0.0, 0.0));
        let id = launch(&mut world, Vec3::new(80.0, 0.0, 0.0), Vec3::ZERO, None);

        assert!(update_projectiles(&mut world, 0.1).is_empty());
        assert!(world.get(id).is_some());
        assert_eq!(
            world.ability_system(asc).unwrap().attributes().get(AttributeId::Health),
            10.0
        );
    }
}
