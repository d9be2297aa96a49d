//! Player controller: hover targeting, input routing, and click-to-move.
//!
//! The [`PlayerController`] drives one controller entity in the [`World`].
//! Each tick it:
//!
//! 1. traces the cursor and updates the hovered interactable
//! 2. reports held inputs
//! 3. steers the pawn if click-to-move is running
//!
//! # Hover transitions
//!
//! The controller keeps the previously and currently hovered interactable as
//! [`EntityId`]s, which never keep an entity alive. A trace that hits nothing
//! leaves both untouched. Otherwise current shifts to previous and the hit
//! entity becomes current if it is interactable:
//!
//! | previous | current | action |
//! |---|---|---|
//! | none | none | none |
//! | none | X | enter(X) |
//! | X | none | exit(X) |
//! | X | X | none |
//! | X | Y | exit(X), then enter(Y) |
//!
//! # Reserved input
//!
//! The primary button tag is reserved. Pressing it starts targeting when an
//! interactable is hovered; otherwise holding it moves the pawn toward the
//! cursor, and a short press starts click-to-move.

mod input;

pub use input::{AbilityInputAction, InputConfig, InputEdge};

use std::collections::BTreeSet;

use bitflags::bitflags;
use gameplay_tags::Tag;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ability::AbilitySystemId;
use crate::config::ControllerConfig;
use crate::entity::{Entity, EntityId, UnitController};
use crate::observer::ObserverList;
use crate::tags::GameplayTags;
use crate::world::World;

bitflags! {
    /// Mode flags owned by one player controller.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ControllerFlags: u8 {
        /// The reserved button was pressed over an interactable.
        const TARGETING    = 1 << 0;
        /// The pawn is walking to the cached destination on its own.
        const AUTO_RUNNING = 1 << 1;
    }
}

/// A hover state change, delivered to `hover_changed` observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoverTransition {
    /// The cursor moved onto an interactable.
    Enter(EntityId),
    /// The cursor left an interactable.
    Exit(EntityId),
}

/// Local controller state for one player.
#[derive(Debug)]
pub struct PlayerController {
    entity: EntityId,
    config: ControllerConfig,
    reserved_tag: Tag,
    input: InputConfig,

    this_actor: Option<EntityId>,
    last_actor: Option<EntityId>,

    flags: ControllerFlags,
    follow_time: f32,
    cached_destination: Option<Vec3>,
    held_tags: BTreeSet<Tag>,

    /// Notified on every hover enter and exit, in that order when both happen.
    pub hover_changed: ObserverList<HoverTransition>,
}

impl PlayerController {
    /// Creates a controller for the controller entity `entity`, reserving the
    /// primary mouse button tag and using the default input bindings.
    #[must_use]
    pub fn new(entity: EntityId, config: ControllerConfig, tags: &GameplayTags) -> Self {
        Self {
            entity,
            config,
            reserved_tag: tags.input_lmb,
            input: InputConfig::default_bindings(tags),
            this_actor: None,
            last_actor: None,
            flags: ControllerFlags::empty(),
            follow_time: 0.0,
            cached_destination: None,
            held_tags: BTreeSet::new(),
            hover_changed: ObserverList::new(),
        }
    }

    /// Replaces the input bindings.
    #[must_use]
    pub fn with_input_config(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// The controller entity this drives.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Currently hovered interactable.
    #[must_use]
    pub const fn this_actor(&self) -> Option<EntityId> {
        self.this_actor
    }

    /// Interactable hovered before the last blocking trace.
    #[must_use]
    pub const fn last_actor(&self) -> Option<EntityId> {
        self.last_actor
    }

    /// Mode flags.
    #[must_use]
    pub const fn flags(&self) -> ControllerFlags {
        self.flags
    }

    /// Whether the reserved button is driving ability targeting.
    #[must_use]
    pub const fn is_targeting(&self) -> bool {
        self.flags.contains(ControllerFlags::TARGETING)
    }

    /// Whether click-to-move is running.
    #[must_use]
    pub const fn is_auto_running(&self) -> bool {
        self.flags.contains(ControllerFlags::AUTO_RUNNING)
    }

    /// Seconds the reserved button has been held in move mode.
    #[must_use]
    pub const fn follow_time(&self) -> f32 {
        self.follow_time
    }

    /// Last ground point the pawn was sent toward.
    #[must_use]
    pub const fn cached_destination(&self) -> Option<Vec3> {
        self.cached_destination
    }

    /// The pawn this controller possesses.
    #[must_use]
    pub fn pawn(&self, world: &World) -> Option<EntityId> {
        world
            .get(self.entity)
            .and_then(Entity::as_unit_controller)
            .and_then(UnitController::controlled_unit)
    }

    fn ability_system(&self, world: &World) -> Option<AbilitySystemId> {
        world.ability_system_of(self.pawn(world)?)
    }

    fn is_reserved(&self, tag: Tag) -> bool {
        tag.matches_tag_exact(self.reserved_tag)
    }

    // -------------------------------------------------------------------------
    // Per-tick
    // -------------------------------------------------------------------------

    /// Runs one controller tick: cursor trace, held inputs, click-to-move.
    pub fn tick(&mut self, world: &mut World, dt: f32) {
        self.cursor_trace(world);
        let held: Vec<Tag> = self.held_tags.iter().copied().collect();
        for tag in held {
            self.ability_input_tag_held(world, tag, dt);
        }
        self.auto_run(world);
    }

    /// Traces under the cursor and applies the hover transition table.
    pub fn cursor_trace(&mut self, world: &mut World) {
        let Some(hit) = world.hit_result_under_cursor(self.entity) else {
            return;
        };

        self.last_actor = self.this_actor;
        self.this_actor = hit
            .entity
            .filter(|id| world.get(*id).is_some_and(|e| e.as_interactable().is_some()));

        match (self.last_actor, self.this_actor) {
            (None, Some(current)) => self.enter(world, current),
            (Some(previous), None) => self.exit(world, previous),
            (Some(previous), Some(current)) if previous != current => {
                self.exit(world, previous);
                self.enter(world, current);
            }
            _ => {}
        }
    }

    fn enter(&mut self, world: &mut World, id: EntityId) {
        if let Some(interactable) = world.get_mut(id).and_then(Entity::as_interactable_mut) {
            interactable.highlight_actor();
        }
        debug!(controller = %self.entity, entity = %id, "hover enter");
        self.hover_changed.notify(&HoverTransition::Enter(id));
    }

    fn exit(&mut self, world: &mut World, id: EntityId) {
        // The entity may have been despawned since it was hovered
        if let Some(interactable) = world.get_mut(id).and_then(Entity::as_interactable_mut) {
            interactable.unhighlight_actor();
        }
        debug!(controller = %self.entity, entity = %id, "hover exit");
        self.hover_changed.notify(&HoverTransition::Exit(id));
    }

    fn auto_run(&mut self, world: &mut World) {
        if !self.is_auto_running() {
            return;
        }
        let (Some(pawn), Some(destination)) = (self.pawn(world), self.cached_destination) else {
            self.flags.remove(ControllerFlags::AUTO_RUNNING);
            return;
        };
        let Some(location) = world.get(pawn).and_then(Entity::transform).map(|t| t.location)
        else {
            self.flags.remove(ControllerFlags::AUTO_RUNNING);
            return;
        };

        let offset = horizontal(destination - location);
        if offset.length() <= self.config.auto_run_acceptance_radius {
            trace!(controller = %self.entity, "auto-run reached destination");
            self.flags.remove(ControllerFlags::AUTO_RUNNING);
            return;
        }
        world.add_movement_input(pawn, offset.normalize_or_zero(), 1.0);
    }

    // -------------------------------------------------------------------------
    // Input routing
    // -------------------------------------------------------------------------

    /// Routes a named input action through the bindings table.
    ///
    /// Pressed and released edges start and stop per-tick held reports, which
    /// [`PlayerController::tick`] sends once per step. A held edge only marks
    /// the input as down. Returns `false` if the action is unbound.
    pub fn handle_input(&mut self, world: &mut World, action: &str, edge: InputEdge) -> bool {
        let Some(tag) = self.input.find_ability_input_tag(action) else {
            return false;
        };
        match edge {
            InputEdge::Pressed => {
                self.held_tags.insert(tag);
                self.ability_input_tag_pressed(world, tag);
            }
            InputEdge::Held => {
                self.held_tags.insert(tag);
            }
            InputEdge::Released => {
                self.held_tags.remove(&tag);
                self.ability_input_tag_released(world, tag);
            }
        }
        true
    }

    /// Press edge for `tag`.
    ///
    /// The reserved tag sets targeting iff an interactable is hovered, stops
    /// click-to-move, and resets the hold timer. Other tags go to the ability
    /// layer.
    pub fn ability_input_tag_pressed(&mut self, world: &mut World, tag: Tag) {
        if self.is_reserved(tag) {
            // Hover state lags a tick behind despawns
            let hovering = self
                .this_actor
                .is_some_and(|id| world.get(id).and_then(Entity::as_interactable).is_some());
            self.flags.set(ControllerFlags::TARGETING, hovering);
            self.flags.remove(ControllerFlags::AUTO_RUNNING);
            self.follow_time = 0.0;
            return;
        }
        if let Some(asc) = self.ability_system(world) {
            world.ability_input_tag_pressed(asc, tag);
        }
    }

    /// Held edge for `tag`, reported every tick the input stays down.
    ///
    /// The reserved tag in move mode accumulates hold time, re-samples the
    /// cursor (keeping the old destination on a miss), and pushes the pawn
    /// toward the destination. Everything else goes to the ability layer.
    pub fn ability_input_tag_held(&mut self, world: &mut World, tag: Tag, dt: f32) {
        if !self.is_reserved(tag) || self.is_targeting() {
            if let Some(asc) = self.ability_system(world) {
                world.ability_input_tag_held(asc, tag);
            }
            return;
        }

        self.follow_time += dt;
        if let Some(hit) = world.hit_result_under_cursor(self.entity) {
            self.cached_destination = Some(hit.impact_point);
        }

        let Some(pawn) = self.pawn(world) else {
            return;
        };
        let (Some(destination), Some(location)) = (
            self.cached_destination,
            world.get(pawn).and_then(Entity::transform).map(|t| t.location),
        ) else {
            return;
        };
        let direction = horizontal(destination - location).normalize_or_zero();
        world.add_movement_input(pawn, direction, 1.0);
    }

    /// Release edge for `tag`, always forwarded to the ability layer.
    ///
    /// Releasing the reserved tag in move mode after a short press starts
    /// click-to-move toward the cached destination.
    pub fn ability_input_tag_released(&mut self, world: &mut World, tag: Tag) {
        if let Some(asc) = self.ability_system(world) {
            world.ability_input_tag_released(asc, tag);
        }
        if !self.is_reserved(tag) || self.is_targeting() {
            return;
        }

        if self.follow_time <= self.config.short_press_threshold
            && self.cached_destination.is_some()
        {
            debug!(
                controller = %self.entity,
                destination = ?self.cached_destination,
                "click-to-move started"
            );
            self.flags.insert(ControllerFlags::AUTO_RUNNING);
        }
        self.follow_time = 0.0;
    }

    /// Directional movement relative to the control rotation's heading.
    ///
    /// `axis.y` moves forward/back and `axis.x` moves right/left.
    pub fn move_input(&self, world: &mut World, axis: Vec2) {
        let Some(rotation) = world
            .get(self.entity)
            .and_then(Entity::as_controller)
            .map(|c| c.control_rotation.yaw_only())
        else {
            return;
        };
        let Some(pawn) = self.pawn(world) else {
            return;
        };
        world.add_movement_input(pawn, rotation.forward(), axis.y);
        world.add_movement_input(pawn, rotation.right(), axis.x);
    }
}

fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, 0.0)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::entity::components::{CharacterComponents, ControllerComponents, EnemyComponents};
    use crate::entity::{EntityInner, EntityTag, Interactable};
    use crate::math::{CursorRay, Rotator};

    const EPS: f32 = 1e-3;
    const EYE: Vec3 = Vec3::new(0.0, 0.0, 1000.0);

    struct Fixture {
        world: World,
        pc: PlayerController,
        hero: EntityId,
        enemy: EntityId,
        other: EntityId,
        log: Rc<RefCell<Vec<HoverTransition>>>,
    }

    fn fixture() -> Fixture {
        let tags = GameplayTags::initialize().unwrap();
        let mut world = World::default();
        let hero = world.spawn(EntityTag::Hero, EntityInner::Hero(CharacterComponents::default()));
        let enemy = world.spawn(
            EntityTag::Enemy,
            EntityInner::Enemy(EnemyComponents::at_location(Vec3::new(500.0, 0.0, 0.0))),
        );
        let other = world.spawn(
            EntityTag::Enemy,
            EntityInner::Enemy(EnemyComponents::at_location(Vec3::new(0.0, 500.0, 0.0))),
        );
        let controller = world.spawn(
            EntityTag::Controller,
            EntityInner::Controller(ControllerComponents::player()),
        );
        world.possess(controller, hero).unwrap();

        let mut pc = PlayerController::new(controller, ControllerConfig::default(), tags);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        pc.hover_changed
            .subscribe(move |t: &HoverTransition| sink.borrow_mut().push(*t));

        Fixture {
            world,
            pc,
            hero,
            enemy,
            other,
            log,
        }
    }

    fn aim(f: &mut Fixture, target: Vec3) {
        f.world
            .set_cursor(f.pc.entity(), Some(CursorRay::toward(EYE, target)))
            .unwrap();
    }

    fn aim_at_sky(f: &mut Fixture) {
        f.world
            .set_cursor(f.pc.entity(), Some(CursorRay::new(EYE, Vec3::Z)))
            .unwrap();
    }

    fn highlighted(world: &World, id: EntityId) -> bool {
        world
            .get(id)
            .and_then(Entity::as_interactable)
            .is_some_and(Interactable::is_highlighted)
    }

    mod hover_tests {
        use super::*;

        #[test]
        fn enter_then_exit() {
            let mut f = fixture();
            aim(&mut f, Vec3::new(500.0, 0.0, 0.0));
            f.pc.cursor_trace(&mut f.world);
            assert_eq!(f.pc.this_actor(), Some(f.enemy));
            assert!(highlighted(&f.world, f.enemy));

            aim(&mut f, Vec3::new(-300.0, -300.0, 0.0));
            f.pc.cursor_trace(&mut f.world);
            assert_eq!(f.pc.this_actor(), None);
            assert!(!highlighted(&f.world, f.enemy));

            assert_eq!(
                *f.log.borrow(),
                vec![HoverTransition::Enter(f.enemy), HoverTransition::Exit(f.enemy)]
            );
        }

        #[test]
        fn same_target_twice_enters_once() {
            let mut f = fixture();
            aim(&mut f, Vec3::new(500.0, 0.0, 0.0));
            f.pc.cursor_trace(&mut f.world);
            f.pc.cursor_trace(&mut f.world);
            assert_eq!(*f.log.borrow(), vec![HoverTransition::Enter(f.enemy)]);
        }

        #[test]
        fn switching_targets_exits_before_entering() {
            let mut f = fixture();
            aim(&mut f, Vec3::new(500.0, 0.0, 0.0));
            f.pc.cursor_trace(&mut f.world);
            aim(&mut f, Vec3::new(0.0, 500.0, 0.0));
            f.pc.cursor_trace(&mut f.world);

            assert_eq!(
                *f.log.borrow(),
                vec![
                    HoverTransition::Enter(f.enemy),
                    HoverTransition::Exit(f.enemy),
                    HoverTransition::Enter(f.other),
                ]
            );
            assert!(highlighted(&f.world, f.other));
            assert_eq!(f.pc.last_actor(), Some(f.enemy));
        }

        #[test]
        fn trace_miss_leaves_state_untouched() {
            let mut f = fixture();
            aim(&mut f, Vec3::new(500.0, 0.0, 0.0));
            f.pc.cursor_trace(&mut f.world);
            aim_at_sky(&mut f);
            f.pc.cursor_trace(&mut f.world);

            assert_eq!(f.pc.this_actor(), Some(f.enemy));
            assert_eq!(f.log.borrow().len(), 1);
        }

        #[test]
        fn hero_is_not_a_hover_target() {
            let mut f = fixture();
            aim(&mut f, Vec3::ZERO);
            f.pc.cursor_trace(&mut f.world);
            assert_eq!(f.pc.this_actor(), None);
            assert!(f.log.borrow().is_empty());
            let hit = f.world.hit_result_under_cursor(f.pc.entity()).unwrap();
            assert_eq!(hit.entity, Some(f.hero));
        }

        #[test]
        fn despawned_target_still_reports_exit() {
            let mut f = fixture();
            aim(&mut f, Vec3::new(500.0, 0.0, 0.0));
            f.pc.cursor_trace(&mut f.world);
            f.world.despawn(f.enemy);
            f.pc.cursor_trace(&mut f.world);

            assert_eq!(
                *f.log.borrow(),
                vec![HoverTransition::Enter(f.enemy), HoverTransition::Exit(f.enemy)]
            );
        }
    }

    mod reserved_input_tests {
        use super::*;

        #[test]
        fn press_over_interactable_starts_targeting() {
            let tags = GameplayTags::initialize().unwrap();
            let mut f = fixture();
            aim(&mut f, Vec3::new(500.0, 0.0, 0.0));
            f.pc.cursor_trace(&mut f.world);

            f.pc.ability_input_tag_pressed(&mut f.world, tags.input_lmb);
            assert!(f.pc.is_targeting());
            assert!(!f.pc.is_auto_running());
        }

        #[test]
        fn press_after_hovered_target_despawns_does_not_target() {
            let tags = GameplayTags::initialize().unwrap();
            let mut f = fixture();
            aim(&mut f, Vec3::new(500.0, 0.0, 0.0));
            f.pc.cursor_trace(&mut f.world);
            assert_eq!(f.pc.this_actor(), Some(f.enemy));

            f.world.despawn(f.enemy);
            f.pc.ability_input_tag_pressed(&mut f.world, tags.input_lmb);
            assert!(!f.pc.is_targeting());
        }

        #[test]
        fn press_over_ground_clears_modes() {
            let tags = GameplayTags::initialize().unwrap();
            let mut f = fixture();
            aim(&mut f, Vec3::new(200.0, 200.0, 0.0));
            f.pc.cursor_trace(&mut f.world);

            f.pc.ability_input_tag_pressed(&mut f.world, tags.input_lmb);
            f.pc.ability_input_tag_held(&mut f.world, tags.input_lmb, 0.1);
            f.pc.ability_input_tag_released(&mut f.world, tags.input_lmb);
            assert!(f.pc.is_auto_running());

            f.pc.ability_input_tag_pressed(&mut f.world, tags.input_lmb);
            assert!(!f.pc.is_targeting());
            assert!(!f.pc.is_auto_running());
            assert_eq!(f.pc.follow_time(), 0.0);
        }

        #[test]
        fn held_moves_pawn_toward_cursor() {
            let tags = GameplayTags::initialize().unwrap();
            let mut f = fixture();
            aim(&mut f, Vec3::new(0.0, -400.0, 0.0));

            f.pc.ability_input_tag_pressed(&mut f.world, tags.input_lmb);
            f.pc.ability_input_tag_held(&mut f.world, tags.input_lmb, 0.25);

            assert!((f.pc.follow_time() - 0.25).abs() < EPS);
            let destination = f.pc.cached_destination().unwrap();
            assert!(destination.abs_diff_eq(Vec3::new(0.0, -400.0, 0.0), EPS));
            let pending = f
                .world
                .get(f.hero)
                .and_then(Entity::as_character)
                .unwrap()
                .pending_movement;
            assert!(pending.abs_diff_eq(Vec3::NEG_Y, EPS));
        }

        #[test]
        fn held_reuses_destination_on_miss() {
            let tags = GameplayTags::initialize().unwrap();
            let mut f = fixture();
            aim(&mut f, Vec3::new(300.0, 300.0, 0.0));
            f.pc.ability_input_tag_held(&mut f.world, tags.input_lmb, 0.1);
            let first = f.pc.cached_destination();

            aim_at_sky(&mut f);
            f.pc.ability_input_tag_held(&mut f.world, tags.input_lmb, 0.1);
            assert_eq!(f.pc.cached_destination(), first);
            assert!((f.pc.follow_time() - 0.2).abs() < EPS);
        }

        #[test]
        fn long_press_does_not_auto_run() {
            let tags = GameplayTags::initialize().unwrap();
            let mut f = fixture();
            aim(&mut f, Vec3::new(300.0, 0.0, 0.0));
            f.pc.ability_input_tag_pressed(&mut f.world, tags.input_lmb);
            for _ in 0..10 {
                f.pc.ability_input_tag_held(&mut f.world, tags.input_lmb, 0.1);
            }
            f.pc.ability_input_tag_released(&mut f.world, tags.input_lmb);
            assert!(!f.pc.is_auto_running());
            assert_eq!(f.pc.follow_time(), 0.0);
        }

        #[test]
        fn auto_run_stops_inside_acceptance_radius() {
            let tags = GameplayTags::initialize().unwrap();
            let mut f = fixture();
            aim(&mut f, Vec3::new(-200.0, 0.0, 0.0));
            f.pc.ability_input_tag_pressed(&mut f.world, tags.input_lmb);
            f.pc.ability_input_tag_held(&mut f.world, tags.input_lmb, 0.05);
            f.pc.ability_input_tag_released(&mut f.world, tags.input_lmb);
            f.world.integrate_movement(0.0);
            assert!(f.pc.is_auto_running());

            for _ in 0..120 {
                f.pc.auto_run(&mut f.world);
                f.world.integrate_movement(1.0 / 60.0);
            }
            assert!(!f.pc.is_auto_running());
            let location = f.world.get(f.hero).unwrap().transform().unwrap().location;
            assert!(location.distance(Vec3::new(-200.0, 0.0, 0.0)) <= 50.0 + EPS);
        }
    }

    #[test]
    fn move_input_uses_heading_only() {
        let mut f = fixture();
        f.world
            .set_control_rotation(f.pc.entity(), Rotator::new(-45.0, 90.0, 0.0))
            .unwrap();
        f.pc.move_input(&mut f.world, Vec2::new(0.0, 1.0));
        let pending = f
            .world
            .get(f.hero)
            .and_then(Entity::as_character)
            .unwrap()
            .pending_movement;
        assert!(pending.abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn held_edge_does_not_double_report() {
        let mut f = fixture();
        aim(&mut f, Vec3::new(-200.0, 0.0, 0.0));
        assert!(f.pc.handle_input(&mut f.world, "IA_LMB", InputEdge::Pressed));
        f.pc.tick(&mut f.world, 0.1);
        assert!(f.pc.handle_input(&mut f.world, "IA_LMB", InputEdge::Held));
        f.pc.tick(&mut f.world, 0.1);
        assert!((f.pc.follow_time() - 0.2).abs() < EPS);
    }

    #[test]
    fn unbound_action_is_rejected() {
        let mut f = fixture();
        assert!(!f.pc.handle_input(&mut f.world, "IA_Jump", InputEdge::Pressed));
        assert!(f.pc.handle_input(&mut f.world, "IA_LMB", InputEdge::Pressed));
    }
}
