//! Fixed-step driver tying the world, controllers and replication together.
//!
//! Each [`Simulation::step`] runs these phases in order:
//!
//! 1. **INPUT**: queued input edges are routed through their controllers
//! 2. **CONTROL**: every controller ticks (cursor trace, held inputs, auto-run)
//! 3. **PROJECTILES**: projectiles fly, expire, and resolve impacts
//! 4. **MOVEMENT**: pending movement input is integrated
//! 5. **REPLICATION**: committed attribute changes are published on the link
//!    and due messages are applied to mirrors
//! 6. **ADVANCE**: the tick counter moves on
//!
//! # Determinism
//!
//! Entities, ability systems and in-flight messages all live in ordered maps,
//! and link latency comes from a seeded RNG. Two simulations built from the
//! same config and fed the same inputs produce the same reports.
//!
//! # Example
//!
//! ```
//! use emberfall_core::config::GameplayConfig;
//! use emberfall_core::entity::NetRole;
//! use emberfall_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(GameplayConfig::default(), NetRole::Authority);
//! for _ in 0..5 {
//!     sim.step(1.0 / 60.0);
//! }
//! assert_eq!(sim.tick(), 5);
//! ```

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{trace, warn};

use crate::ability::AbilitySystemId;
use crate::attribute::AttributeSet;
use crate::config::GameplayConfig;
use crate::controller::{InputEdge, PlayerController};
use crate::entity::NetRole;
use crate::error::WorldError;
use crate::projectile::{update_projectiles, ProjectileEvent};
use crate::replication::{AttributeMirror, ReplicationLink};
use crate::world::World;

// =============================================================================
// Step report
// =============================================================================

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    /// Tick the step ran at.
    pub tick: u64,
    /// Projectile impacts and expiries, in processing order.
    pub projectile_events: Vec<ProjectileEvent>,
    /// Attribute replicas put on the link.
    pub published: usize,
    /// Replicas a mirror accepted.
    pub applied: usize,
    /// Replicas dropped as stale.
    pub dropped: usize,
}

#[derive(Debug, Clone)]
struct QueuedInput {
    controller: usize,
    action: String,
    edge: InputEdge,
}

// =============================================================================
// Simulation
// =============================================================================

/// Owns a [`World`] plus the controllers and replication endpoints around it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    config: GameplayConfig,
    controllers: Vec<PlayerController>,
    link: ReplicationLink,
    mirrors: Vec<AttributeMirror>,
    pending_inputs: VecDeque<QueuedInput>,
}

impl Simulation {
    /// Creates an empty simulation running as `local_role`.
    #[must_use]
    pub fn new(config: GameplayConfig, local_role: NetRole) -> Self {
        let link = ReplicationLink::new(&config.replication);
        Self {
            world: World::new(local_role),
            config,
            controllers: Vec::new(),
            link,
            mirrors: Vec::new(),
            pending_inputs: VecDeque::new(),
        }
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for setup.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Configuration this simulation was built with.
    #[must_use]
    pub const fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Current tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.world.current_tick()
    }

    /// A fresh attribute set using the configured defaults and clamp policy.
    #[must_use]
    pub fn new_attribute_set(&self) -> AttributeSet {
        AttributeSet::new(&self.config.attributes, self.config.clamp_policy)
    }

    /// Registers a controller and returns its index.
    pub fn add_controller(&mut self, controller: PlayerController) -> usize {
        self.controllers.push(controller);
        self.controllers.len() - 1
    }

    /// Controller at `index`.
    #[must_use]
    pub fn controller(&self, index: usize) -> Option<&PlayerController> {
        self.controllers.get(index)
    }

    /// Mutable controller at `index`, e.g. to subscribe to hover changes.
    pub fn controller_mut(&mut self, index: usize) -> Option<&mut PlayerController> {
        self.controllers.get_mut(index)
    }

    /// Starts mirroring `ability_system`, seeded with its current values.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownAbilitySystem`] if it does not exist.
    pub fn add_mirror(&mut self, ability_system: AbilitySystemId) -> Result<usize, WorldError> {
        let system = self
            .world
            .ability_system(ability_system)
            .ok_or(WorldError::UnknownAbilitySystem(ability_system))?;
        self.mirrors
            .push(AttributeMirror::new(ability_system, system.attributes()));
        Ok(self.mirrors.len() - 1)
    }

    /// Mirror at `index`.
    #[must_use]
    pub fn mirror(&self, index: usize) -> Option<&AttributeMirror> {
        self.mirrors.get(index)
    }

    /// Mutable mirror at `index`.
    pub fn mirror_mut(&mut self, index: usize) -> Option<&mut AttributeMirror> {
        self.mirrors.get_mut(index)
    }

    /// Messages still on the link.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.link.in_flight()
    }

    /// Queues an input edge for the next step.
    pub fn queue_input(&mut self, controller: usize, action: impl Into<String>, edge: InputEdge) {
        self.pending_inputs.push_back(QueuedInput {
            controller,
            action: action.into(),
            edge,
        });
    }

    /// Runs one fixed step of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let tick = self.world.current_tick();
        let mut report = StepReport {
            tick,
            ..StepReport::default()
        };

        // INPUT
        while let Some(input) = self.pending_inputs.pop_front() {
            let Some(controller) = self.controllers.get_mut(input.controller) else {
                warn!(controller = input.controller, "input for unknown controller dropped");
                continue;
            };
            controller.handle_input(&mut self.world, &input.action, input.edge);
        }

        // CONTROL
        for controller in &mut self.controllers {
            controller.tick(&mut self.world, dt);
        }

        // PROJECTILES
        report.projectile_events = update_projectiles(&mut self.world, dt);

        // MOVEMENT
        self.world.integrate_movement(dt);

        // REPLICATION
        for replica in self.world.drain_replicas() {
            self.link.publish(tick, replica);
            report.published += 1;
        }
        for replica in self.link.deliver_due(tick) {
            for mirror in &mut self.mirrors {
                if mirror.ability_system() != replica.ability_system {
                    continue;
                }
                if mirror.apply(&replica) {
                    report.applied += 1;
                } else {
                    report.dropped += 1;
                }
            }
        }

        // ADVANCE
        self.world.advance_tick();
        trace!(
            tick,
            published = report.published,
            applied = report.applied,
            "step complete"
        );
        report
    }
}
