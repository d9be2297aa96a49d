//! Projectile spell: the authority-gated projectile factory.

use gameplay_tags::Tag;
use glam::Vec3;
use tracing::{debug, warn};

use super::{AbilityContext, ActivationResult, GameplayAbility, TargetDataUnderMouse};
use crate::config::ProjectileConfig;
use crate::effect::{EffectContext, EffectSpec};
use crate::entity::{
    CombatSocketProvider, Entity, EntityId, EntityInner, EntityTag, ProjectileComponents,
    TransformState,
};
use crate::math::Rotator;
use crate::world::World;

/// Launches a projectile from the avatar's combat socket toward a point.
///
/// On activation the spell samples the point under the cursor and fires at
/// it. Spawning only happens on the side with authority over the avatar.
///
/// # Example
///
/// ```
/// use emberfall_core::ability::{AbilityContext, ActorInfo, ProjectileSpell};
/// use emberfall_core::config::ProjectileConfig;
/// use emberfall_core::entity::{CharacterComponents, EntityInner, EntityTag, NetRole};
/// use emberfall_core::world::World;
/// use glam::Vec3;
/// # use emberfall_core::attribute::AttributeSet;
/// # use emberfall_core::config::{AttributeDefaults, ClampPolicy};
///
/// let mut world = World::new(NetRole::Authority);
/// let hero = world.spawn(EntityTag::Hero, EntityInner::Hero(CharacterComponents::default()));
/// # let asc = world.add_ability_system(hero, AttributeSet::new(&AttributeDefaults::default(), ClampPolicy::Passthrough));
/// # world.init_ability_actor_info(asc, hero).unwrap();
/// # let handle = world.grant_ability(asc, std::sync::Arc::new(ProjectileSpell::default()), 1).unwrap();
/// # let ctx = AbilityContext { ability_system: asc, handle, level: 1,
/// #     actor_info: world.ability_system(asc).unwrap().actor_info().copied() };
///
/// let spell = ProjectileSpell::new(ProjectileConfig::default());
/// let projectile = spell.spawn_projectile(&mut world, &ctx, Vec3::new(500.0, 0.0, 40.0));
/// assert!(projectile.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProjectileSpell {
    config: ProjectileConfig,
    input_tag: Option<Tag>,
    damage_effect: Option<EffectSpec>,
}

impl ProjectileSpell {
    /// A spell firing projectiles with the given tuning and no payload.
    #[must_use]
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            config,
            input_tag: None,
            damage_effect: None,
        }
    }

    /// Binds the spell to an input tag when granted at startup.
    #[must_use]
    pub fn with_input_tag(mut self, tag: Tag) -> Self {
        self.input_tag = Some(tag);
        self
    }

    /// Attaches an effect applied to whatever the projectile hits.
    ///
    /// The effect's context is replaced with the caster's at spawn time.
    #[must_use]
    pub fn with_damage_effect(mut self, spec: EffectSpec) -> Self {
        self.damage_effect = Some(spec);
        self
    }

    /// Spawns a projectile aimed at `target`.
    ///
    /// A silent no-op returning `None` unless this machine has authority over
    /// the avatar and the avatar exposes a combat socket. The projectile
    /// starts at the socket, faces `target` horizontally (pitch forced to
    /// zero), is owned by the ability system's owner, and is instigated by
    /// the avatar.
    pub fn spawn_projectile(
        &self,
        world: &mut World,
        ctx: &AbilityContext,
        target: Vec3,
    ) -> Option<EntityId> {
        let avatar = ctx.avatar()?;
        if !world.has_authority(avatar) {
            debug!(avatar = %avatar, "spawn_projectile ignored without authority");
            return None;
        }

        let socket = world
            .get(avatar)
            .and_then(Entity::as_combat_socket_provider)
            .map(CombatSocketProvider::combat_socket_location)?;

        let transform = TransformState::new(socket, launch_rotation(socket, target).to_quat());

        let mut projectile = ProjectileComponents::from_config(&self.config);
        projectile.owner = ctx.actor_info.map(|info| info.owner);
        projectile.instigator = Some(avatar);
        projectile.damage_effect = self.damage_effect.clone().map(|spec| {
            spec.with_context(EffectContext::new(Some(ctx.ability_system), Some(avatar)))
        });

        let deferred = world.spawn_deferred(EntityTag::Projectile, EntityInner::Projectile(projectile));
        match world.finish_spawning(deferred, transform) {
            Ok(id) => {
                debug!(projectile = %id, avatar = %avatar, ?target, "spawned projectile");
                Some(id)
            }
            Err(err) => {
                warn!(%err, "failed to finish projectile spawn");
                None
            }
        }
    }
}

/// Horizontal facing from `socket` toward `target`.
#[must_use]
pub(crate) fn launch_rotation(socket: Vec3, target: Vec3) -> Rotator {
    let mut rotation = Rotator::from_direction(target - socket);
    rotation.pitch = 0.0;
    rotation
}

impl GameplayAbility for ProjectileSpell {
    fn name(&self) -> &str {
        "ProjectileSpell"
    }

    fn startup_input_tag(&self) -> Option<Tag> {
        self.input_tag
    }

    fn activate(&self, ctx: &AbilityContext, world: &mut World) -> ActivationResult {
        let mut target_data = TargetDataUnderMouse::new();
        if let Some(target) = target_data.activate(ctx, world) {
            self.spawn_projectile(world, ctx, target);
        }
        ActivationResult::Ended
    }
}
