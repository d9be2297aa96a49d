//! Scene setup shared by the scenario tests.

use std::sync::Arc;

use glam::Vec3;

use crate::ability::{AbilitySpecHandle, AbilitySystemId, GameplayAbility};
use crate::attribute::AttributeSet;
use crate::config::GameplayConfig;
use crate::controller::PlayerController;
use crate::entity::{
    CharacterComponents, ControllerComponents, EnemyComponents, EntityId, EntityInner, EntityTag,
    NetRole,
};
use crate::math::CursorRay;
use crate::simulation::Simulation;
use crate::tags::GameplayTags;
use crate::world::World;

/// Camera position used for every cursor ray.
pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 1000.0);

/// Fixed step used by scenario tests.
pub const DT: f32 = 1.0 / 60.0;

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// The native tag set, registering it on first use.
pub fn tags() -> &'static GameplayTags {
    GameplayTags::initialize().expect("native tags register")
}

// =============================================================================
// Scene
// =============================================================================

/// A hero possessed by a player controller, with an initialized ability system.
pub struct HeroScene {
    /// The simulation.
    pub sim: Simulation,
    /// Hero entity at the origin.
    pub hero: EntityId,
    /// Controller entity possessing the hero.
    pub controller_entity: EntityId,
    /// Index of the controller inside the simulation.
    pub controller: usize,
    /// Hero's ability system.
    pub asc: AbilitySystemId,
}

impl HeroScene {
    /// Builds the scene with the given config and local role.
    pub fn new(config: GameplayConfig, role: NetRole) -> Self {
        init_tracing();
        let tags = tags();
        let mut sim = Simulation::new(config, role);
        let attributes = sim.new_attribute_set();

        let world = sim.world_mut();
        let hero = world.spawn(EntityTag::Hero, EntityInner::Hero(CharacterComponents::default()));
        let controller_entity = world.spawn(
            EntityTag::Controller,
            EntityInner::Controller(ControllerComponents::player()),
        );
        world.possess(controller_entity, hero).unwrap();
        let asc = world.add_ability_system(hero, attributes);
        world.init_ability_actor_info(asc, hero).unwrap();

        let controller_config = sim.config().controller.clone();
        let controller = sim.add_controller(PlayerController::new(
            controller_entity,
            controller_config,
            tags,
        ));

        Self {
            sim,
            hero,
            controller_entity,
            controller,
            asc,
        }
    }

    /// Default config, authority role.
    pub fn authority() -> Self {
        Self::new(GameplayConfig::default(), NetRole::Authority)
    }

    /// Points the cursor from [`EYE`] at `target`.
    pub fn aim(&mut self, target: Vec3) {
        let controller = self.controller_entity;
        aim(self.sim.world_mut(), controller, target);
    }

    /// Points the cursor straight up, so traces miss.
    pub fn aim_at_sky(&mut self) {
        let controller = self.controller_entity;
        self.sim
            .world_mut()
            .set_cursor(controller, Some(CursorRay::new(EYE, Vec3::Z)))
            .unwrap();
    }

    /// Spawns an enemy with its own ability system.
    pub fn spawn_enemy(&mut self, at: Vec3) -> (EntityId, AbilitySystemId) {
        let attributes = self.sim.new_attribute_set();
        spawn_enemy_with(self.sim.world_mut(), at, attributes)
    }

    /// Grants `ability` to the hero.
    pub fn grant(&mut self, ability: Arc<dyn GameplayAbility>) -> AbilitySpecHandle {
        let asc = self.asc;
        self.sim.world_mut().grant_ability(asc, ability, 1).unwrap()
    }

    /// Hero location.
    pub fn hero_location(&self) -> Vec3 {
        self.sim
            .world()
            .get(self.hero)
            .and_then(|e| e.transform())
            .map(|t| t.location)
            .unwrap()
    }

    /// Runs `steps` fixed steps.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.sim.step(DT);
        }
    }
}

/// Points `controller`'s cursor from [`EYE`] at `target`.
pub fn aim(world: &mut World, controller: EntityId, target: Vec3) {
    world
        .set_cursor(controller, Some(CursorRay::toward(EYE, target)))
        .unwrap();
}

/// Spawns an enemy at `at` with an initialized ability system.
pub fn spawn_enemy_with(
    world: &mut World,
    at: Vec3,
    attributes: AttributeSet,
) -> (EntityId, AbilitySystemId) {
    let enemy = world.spawn(EntityTag::Enemy, EntityInner::Enemy(EnemyComponents::at_location(at)));
    let asc = world.add_ability_system(enemy, attributes);
    world.init_ability_actor_info(asc, enemy).unwrap();
    (enemy, asc)
}
