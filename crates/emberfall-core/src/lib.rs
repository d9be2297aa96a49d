//! # Emberfall Core
//!
//! Ability, attribute and targeting core for a top-down action RPG.
//!
//! ## Architecture
//!
//! - **World**: entities (heroes, enemies, controllers, projectiles) in an
//!   ordered store, plus the ability systems attached to them
//! - **Capabilities**: entities answer "can you be highlighted / do you have a
//!   combat socket / who controls you" through trait queries on [`entity::Entity`]
//! - **Abilities**: granted per ability system, bound to input tags, activated
//!   by the controller
//! - **Effects**: modifier bundles run through the attribute pipeline, with
//!   full source/target resolution for post-execution hooks
//! - **Replication**: committed attribute changes travel over a seeded, lossy
//!   ordering link to mirrors that keep only the newest revision
//!
//! ## Usage
//!
//! ```
//! use emberfall_core::config::GameplayConfig;
//! use emberfall_core::controller::PlayerController;
//! use emberfall_core::entity::{
//!     CharacterComponents, ControllerComponents, EnemyComponents, EntityInner, EntityTag, NetRole,
//! };
//! use emberfall_core::math::CursorRay;
//! use emberfall_core::simulation::Simulation;
//! use emberfall_core::tags::GameplayTags;
//! use glam::Vec3;
//!
//! let tags = GameplayTags::initialize().unwrap();
//! let mut sim = Simulation::new(GameplayConfig::default(), NetRole::Authority);
//!
//! let world = sim.world_mut();
//! let hero = world.spawn(EntityTag::Hero, EntityInner::Hero(CharacterComponents::default()));
//! let enemy = world.spawn(
//!     EntityTag::Enemy,
//!     EntityInner::Enemy(EnemyComponents::at_location(Vec3::new(400.0, 0.0, 0.0))),
//! );
//! let pc = world.spawn(EntityTag::Controller, EntityInner::Controller(ControllerComponents::player()));
//! world.possess(pc, hero).unwrap();
//! world
//!     .set_cursor(pc, Some(CursorRay::toward(Vec3::new(0.0, 0.0, 1000.0), Vec3::new(400.0, 0.0, 0.0))))
//!     .unwrap();
//!
//! let controller = PlayerController::new(pc, sim.config().controller.clone(), tags);
//! let index = sim.add_controller(controller);
//! sim.step(1.0 / 60.0);
//!
//! assert_eq!(sim.controller(index).unwrap().this_actor(), Some(enemy));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ability;
pub mod attribute;
pub mod config;
pub mod controller;
pub mod effect;
pub mod entity;
pub mod error;
pub mod math;
pub mod observer;
pub mod projectile;
pub mod replication;
pub mod simulation;
pub mod tags;
pub mod world;

pub use config::GameplayConfig;
pub use error::{ConfigError, WorldError};
pub use simulation::Simulation;
pub use world::World;

#[cfg(test)]
mod tests;
