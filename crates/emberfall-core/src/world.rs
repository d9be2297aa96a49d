//! World module: the container for every entity and ability system.
//!
//! The World provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Entity lifecycle management (spawn, deferred spawn, despawn)
//! - The local network role used for authority checks
//! - Ability-system storage (see [`crate::ability`])
//! - Cursor traces against characters and the ground plane
//!
//! # Identifiers
//!
//! Entity and ability-system IDs are monotonically increasing and never
//! reused. Holding an [`EntityId`] is a non-owning reference: once the entity
//! is despawned every lookup through the old ID returns `None`.
//!
//! # Example
//!
//! ```
//! use emberfall_core::world::World;
//! use emberfall_core::entity::{EntityInner, EntityTag, EnemyComponents, NetRole};
//! use glam::Vec3;
//!
//! let mut world = World::new(NetRole::Authority);
//! let enemy = world.spawn(
//!     EntityTag::Enemy,
//!     EntityInner::Enemy(EnemyComponents::at_location(Vec3::new(100.0, 0.0, 0.0))),
//! );
//!
//! assert!(world.get(enemy).is_some());
//! assert!(world.has_authority(enemy));
//!
//! world.despawn(enemy);
//! assert!(world.get(enemy).is_none());
//! ```

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ability::{AbilitySystem, AbilitySystemId};
use crate::attribute::AttributeSet;
use crate::entity::{Entity, EntityId, EntityInner, EntityTag, NetRole, TransformState};
use crate::error::WorldError;
use crate::math::{CursorRay, Rotator};

// =============================================================================
// Trace results
// =============================================================================

/// Result of a blocking trace into the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    /// Entity that blocked the trace. `None` when the ground plane was hit.
    pub entity: Option<EntityId>,
    /// World-space point where the trace was blocked.
    pub impact_point: Vec3,
    /// Distance from the trace origin to the impact point.
    pub distance: f32,
}

/// Reservation for an entity whose construction has started but not finished.
///
/// Returned by [`World::spawn_deferred`] and consumed by
/// [`World::finish_spawning`]. The entity is not visible to lookups or traces
/// in between.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a deferred spawn does nothing until finished"]
pub struct DeferredSpawn {
    id: EntityId,
}

impl DeferredSpawn {
    /// The ID the entity will have once finished.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }
}

// =============================================================================
// World
// =============================================================================

/// Container for all gameplay entities and ability systems.
///
/// # Determinism
///
/// Entities and ability systems live in `BTreeMap`s keyed by monotonically
/// assigned IDs, so iteration (traces, projectile updates, replica draining)
/// always visits them in creation order.
#[derive(Debug)]
pub struct World {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
    deferred: BTreeMap<EntityId, Entity>,
    next_ability_system_id: u64,
    ability_systems: BTreeMap<AbilitySystemId, AbilitySystem>,
    local_role: NetRole,
    ground_height: Option<f32>,
    tick: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(NetRole::Authority)
    }
}

impl World {
    /// Creates an empty world.
    ///
    /// Entities spawned into it take `local_role` as their network role. The
    /// ground plane sits at height 0.
    #[must_use]
    pub fn new(local_role: NetRole) -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            deferred: BTreeMap::new(),
            next_ability_system_id: 0,
            ability_systems: BTreeMap::new(),
            local_role,
            ground_height: Some(0.0),
            tick: 0,
        }
    }

    /// The role newly spawned entities receive.
    #[must_use]
    pub const fn local_role(&self) -> NetRole {
        self.local_role
    }

    /// Sets the ground plane height, or removes the ground with `None`.
    pub fn set_ground_height(&mut self, height: Option<f32>) {
        self.ground_height = height;
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // -------------------------------------------------------------------------
    // Entity lifecycle
    // -------------------------------------------------------------------------

    /// Spawns a fully constructed entity and returns its ID.
    pub fn spawn(&mut self, tag: EntityTag, inner: EntityInner) -> EntityId {
        let id = self.allocate_id();
        self.entities
            .insert(id, Entity::new(id, tag, inner, self.local_role));
        trace!(entity = %id, %tag, "spawned entity");
        id
    }

    /// Starts constructing an entity without making it visible.
    ///
    /// The ID is reserved immediately. Call [`finish_spawning`](Self::finish_spawning)
    /// with the final transform to place the entity in the world.
    pub fn spawn_deferred(&mut self, tag: EntityTag, inner: EntityInner) -> DeferredSpawn {
        let id = self.allocate_id();
        self.deferred
            .insert(id, Entity::new(id, tag, inner, self.local_role));
        DeferredSpawn { id }
    }

    /// Finishes a deferred spawn at `transform`.
    ///
    /// Projectiles are launched along the transform's forward axis at their
    /// configured speed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownDeferredSpawn`] if the reservation is not
    /// pending in this world.
    pub fn finish_spawning(
        &mut self,
        deferred: DeferredSpawn,
        transform: TransformState,
    ) -> Result<EntityId, WorldError> {
        let id = deferred.id;
        let mut entity = self
            .deferred
            .remove(&id)
            .ok_or(WorldError::UnknownDeferredSpawn(id))?;

        if let Some(placement) = entity.transform_mut() {
            *placement = transform;
        }
        if let Some(projectile) = entity.as_projectile_mut() {
            projectile.velocity = transform.forward() * projectile.speed;
        }

        debug!(
            entity = %id,
            tag = %entity.tag(),
            location = ?transform.location,
            "finished deferred spawn"
        );
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Removes an entity. Returns it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(&id);
        if removed.is_some() {
            trace!(entity = %id, "despawned entity");
        }
        removed
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns `true` if the entity is live (spawned and not despawned).
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns an iterator over live entities in ID order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over live entity IDs in ID order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of live entities with the given tag.
    #[must_use]
    pub fn count_tagged(&self, tag: EntityTag) -> usize {
        self.entities.values().filter(|e| e.tag() == tag).count()
    }

    /// Number of deferred spawns not yet finished.
    #[must_use]
    pub fn pending_spawn_count(&self) -> usize {
        self.deferred.len()
    }

    // -------------------------------------------------------------------------
    // Network role
    // -------------------------------------------------------------------------

    /// Overrides the network role of one entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if the entity is not live.
    pub fn set_role(&mut self, id: EntityId, role: NetRole) -> Result<(), WorldError> {
        let entity = self.get_mut(id).ok_or(WorldError::UnknownEntity(id))?;
        entity.set_role(role);
        Ok(())
    }

    /// Returns `true` if this machine has authority over a live entity.
    #[must_use]
    pub fn has_authority(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::has_authority)
    }

    // -------------------------------------------------------------------------
    // Possession and input
    // -------------------------------------------------------------------------

    /// Makes `controller` possess `pawn`, linking both sides.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if either side is not a live
    /// entity of the right kind.
    pub fn possess(&mut self, controller: EntityId, pawn: EntityId) -> Result<(), WorldError> {
        if self.get(pawn).and_then(Entity::as_character).is_none() {
            return Err(WorldError::UnknownEntity(pawn));
        }
        let components = self
            .get_mut(controller)
            .and_then(Entity::as_controller_mut)
            .ok_or(WorldError::UnknownEntity(controller))?;
        components.pawn = Some(pawn);
        if let Some(character) = self.get_mut(pawn).and_then(Entity::as_character_mut) {
            character.controller = Some(controller);
        }
        debug!(controller = %controller, pawn = %pawn, "possessed pawn");
        Ok(())
    }

    /// Points a controller's cursor ray, or clears it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if `controller` is not a live
    /// controller.
    pub fn set_cursor(
        &mut self,
        controller: EntityId,
        cursor: Option<CursorRay>,
    ) -> Result<(), WorldError> {
        let components = self
            .get_mut(controller)
            .and_then(Entity::as_controller_mut)
            .ok_or(WorldError::UnknownEntity(controller))?;
        components.cursor = cursor;
        Ok(())
    }

    /// Sets a controller's control rotation.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if `controller` is not a live
    /// controller.
    pub fn set_control_rotation(
        &mut self,
        controller: EntityId,
        rotation: Rotator,
    ) -> Result<(), WorldError> {
        let components = self
            .get_mut(controller)
            .and_then(Entity::as_controller_mut)
            .ok_or(WorldError::UnknownEntity(controller))?;
        components.control_rotation = rotation;
        Ok(())
    }

    /// Adds movement input to a character for this tick.
    ///
    /// Ignored for entities that are not characters.
    pub fn add_movement_input(&mut self, pawn: EntityId, direction: Vec3, scale: f32) {
        if let Some(character) = self.get_mut(pawn).and_then(Entity::as_character_mut) {
            character.add_movement_input(direction, scale);
        }
    }

    /// Moves every character by its accumulated input and turns it to face
    /// the direction of travel.
    pub fn integrate_movement(&mut self, dt: f32) {
        for entity in self.entities.values_mut() {
            let Some(character) = entity.as_character_mut() else {
                continue;
            };
            let input = character.consume_movement_input();
            if input == Vec3::ZERO {
                continue;
            }
            character.transform.location += input * character.max_walk_speed * dt;
            let heading = Vec3::new(input.x, input.y, 0.0);
            if heading != Vec3::ZERO {
                character.transform.rotation = Rotator::from_direction(heading).to_quat();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Traces
    // -------------------------------------------------------------------------

    /// Traces a ray against every character and the ground plane.
    ///
    /// Characters are treated as spheres of their collision radius. The
    /// nearest blocking hit wins; ties go to the lowest entity ID. Projectiles
    /// and controllers never block.
    #[must_use]
    pub fn trace_ray(&self, ray: &CursorRay) -> Option<HitResult> {
        let mut best: Option<HitResult> = None;

        for entity in self.entities.values() {
            let Some(character) = entity.as_character() else {
                continue;
            };
            let Some(distance) =
                ray.intersect_sphere(character.transform.location, character.collision_radius)
            else {
                continue;
            };
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(HitResult {
                    entity: Some(entity.id()),
                    impact_point: ray.at(distance),
                    distance,
                });
            }
        }

        if let Some(distance) = self.ground_height.and_then(|z| ray.intersect_ground(z)) {
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(HitResult {
                    entity: None,
                    impact_point: ray.at(distance),
                    distance,
                });
            }
        }

        best
    }

    /// Traces the controller's cursor ray into the world.
    ///
    /// Returns `None` when the controller is unknown, has no cursor, or the
    /// ray hits nothing.
    #[must_use]
    pub fn hit_result_under_cursor(&self, controller: EntityId) -> Option<HitResult> {
        let ray = self.get(controller)?.as_controller()?.cursor?;
        self.trace_ray(&ray)
    }

    // -------------------------------------------------------------------------
    // Ability systems
    // -------------------------------------------------------------------------

    /// Creates an ability system owned by `owner` with the given attributes.
    ///
    /// The system has no actor info until
    /// [`init_ability_actor_info`](Self::init_ability_actor_info) is called.
    pub fn add_ability_system(&mut self, owner: EntityId, attributes: AttributeSet) -> AbilitySystemId {
        let id = AbilitySystemId::new(self.next_ability_system_id);
        self.next_ability_system_id += 1;
        self.ability_systems
            .insert(id, AbilitySystem::new(id, owner, attributes));
        debug!(ability_system = %id, owner = %owner, "added ability system");
        id
    }

    /// Returns an ability system by ID.
    #[must_use]
    pub fn ability_system(&self, id: AbilitySystemId) -> Option<&AbilitySystem> {
        self.ability_systems.get(&id)
    }

    /// Returns a mutable ability system by ID.
    #[must_use]
    pub fn ability_system_mut(&mut self, id: AbilitySystemId) -> Option<&mut AbilitySystem> {
        self.ability_systems.get_mut(&id)
    }

    /// Returns an iterator over mutable ability systems in ID order.
    pub fn ability_systems_sorted_mut(&mut self) -> impl Iterator<Item = &mut AbilitySystem> + '_ {
        self.ability_systems.values_mut()
    }

    /// The ability system acting for `entity`, through its capability.
    #[must_use]
    pub fn ability_system_of(&self, entity: EntityId) -> Option<AbilitySystemId> {
        self.get(entity)?.ability_system()
    }

    // -------------------------------------------------------------------------
    // Ticks
    // -------------------------------------------------------------------------

    /// Returns the current tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}
