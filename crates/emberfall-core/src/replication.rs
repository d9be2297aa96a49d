//! Attribute replication between the authority and remote copies.
//!
//! The authority publishes every committed attribute change as an
//! [`AttributeReplica`] on a [`ReplicationLink`]. The link delays each message
//! by a seeded random number of ticks, so messages can arrive out of order.
//! A remote [`AttributeMirror`] keeps the last revision seen per attribute,
//! applies only newer revisions, and notifies its observers exactly once per
//! applied change, even when the value is the same as before.
//!
//! # Example
//!
//! ```
//! use emberfall_core::ability::AbilitySystemId;
//! use emberfall_core::attribute::{AttributeId, AttributeSet};
//! use emberfall_core::config::{AttributeDefaults, ClampPolicy, ReplicationConfig};
//! use emberfall_core::replication::{AttributeMirror, AttributeReplica, ReplicationLink};
//!
//! let asc = AbilitySystemId::new(0);
//! let initial = AttributeSet::new(&AttributeDefaults::default(), ClampPolicy::Passthrough);
//! let mut mirror = AttributeMirror::new(asc, &initial);
//! let mut link = ReplicationLink::new(&ReplicationConfig::default());
//!
//! link.publish(0, AttributeReplica {
//!     ability_system: asc,
//!     attribute: AttributeId::Health,
//!     value: 42.0,
//!     revision: 1,
//! });
//!
//! for replica in link.deliver_due(10) {
//!     mirror.apply(&replica);
//! }
//! assert_eq!(mirror.attributes().get(AttributeId::Health), 42.0);
//! ```

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::ability::AbilitySystemId;
use crate::attribute::{AttributeChange, AttributeId, AttributeSet};
use crate::config::ReplicationConfig;
use crate::observer::ObserverList;

/// One replicated attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeReplica {
    /// Ability system owning the attribute.
    pub ability_system: AbilitySystemId,
    /// Which attribute.
    pub attribute: AttributeId,
    /// Committed value.
    pub value: f32,
    /// Commit counter of the attribute on the authority.
    pub revision: u64,
}

/// Simulated network link with seeded per-message latency.
#[derive(Debug)]
pub struct ReplicationLink {
    rng: ChaCha8Rng,
    min_latency: u64,
    max_latency: u64,
    next_seq: u64,
    in_flight: BTreeMap<(u64, u64), AttributeReplica>,
}

impl ReplicationLink {
    /// Creates a link. Equal configs (seed included) produce equal delivery
    /// schedules.
    #[must_use]
    pub fn new(config: &ReplicationConfig) -> Self {
        let min_latency = config.min_latency_ticks.min(config.max_latency_ticks);
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            min_latency,
            max_latency: config.max_latency_ticks,
            next_seq: 0,
            in_flight: BTreeMap::new(),
        }
    }

    /// Sends `replica` at tick `now`. Returns the tick it becomes deliverable.
    pub fn publish(&mut self, now: u64, replica: AttributeReplica) -> u64 {
        let latency = self.rng.gen_range(self.min_latency..=self.max_latency);
        let due = now + latency;
        self.in_flight.insert((due, self.next_seq), replica);
        self.next_seq += 1;
        trace!(
            ability_system = %replica.ability_system,
            attribute = %replica.attribute,
            revision = replica.revision,
            due,
            "replica published"
        );
        due
    }

    /// Removes and returns every message due at or before `now`, in due
    /// order and then send order.
    pub fn deliver_due(&mut self, now: u64) -> Vec<AttributeReplica> {
        let pending = self.in_flight.split_off(&(now + 1, 0));
        let due = std::mem::replace(&mut self.in_flight, pending);
        due.into_values().collect()
    }

    /// Number of messages not yet delivered.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Remote copy of one ability system's attributes.
#[derive(Debug)]
pub struct AttributeMirror {
    ability_system: AbilitySystemId,
    attributes: AttributeSet,

    /// Notified once per applied replica.
    pub attribute_changed: ObserverList<AttributeChange>,
}

impl AttributeMirror {
    /// Mirrors `ability_system`, starting from `initial`.
    #[must_use]
    pub fn new(ability_system: AbilitySystemId, initial: &AttributeSet) -> Self {
        Self {
            ability_system,
            attributes: initial.clone(),
            attribute_changed: ObserverList::new(),
        }
    }

    /// The mirrored ability system.
    #[must_use]
    pub const fn ability_system(&self) -> AbilitySystemId {
        self.ability_system
    }

    /// Last applied values.
    #[must_use]
    pub const fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Applies a replica if it is for this system and newer than the last
    /// revision seen for its attribute. Returns `true` if applied.
    pub fn apply(&mut self, replica: &AttributeReplica) -> bool {
        if replica.ability_system != self.ability_system {
            return false;
        }
        let Some(change) =
            self.attributes
                .apply_replicated(replica.attribute, replica.value, replica.revision)
        else {
            debug!(
                ability_system = %replica.ability_system,
                attribute = %replica.attribute,
                revision = replica.revision,
                seen = self.attributes.revision(replica.attribute),
                "dropped stale replica"
            );
            return false;
        };
        self.attribute_changed.notify(&change);
        true
    }
}
