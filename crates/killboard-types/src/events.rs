//! Combat events as delivered by the event source.
//!
//! Every participant field is optional. The source may omit any of them and
//! the aggregator has to cope.

use serde::{Deserialize, Serialize};

use crate::ids::{RawActorId, RawWeaponId};

/// The participants of a shot, hit, or kill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    /// The actor that fired.
    #[serde(default)]
    pub initiator: Option<RawActorId>,
    /// The actor that was aimed at, hit, or killed.
    #[serde(default)]
    pub target: Option<RawActorId>,
    /// The weapon object involved.
    #[serde(default)]
    pub weapon: Option<RawWeaponId>,
}

/// A single combat event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombatEvent {
    /// A weapon was released.
    Shot(Engagement),
    /// A weapon struck a target.
    Hit(Engagement),
    /// A target was destroyed.
    Kill(Engagement),
    /// An actor was lost. The source reports the lost actor as the initiator.
    UnitLost {
        /// The lost actor.
        #[serde(default)]
        initiator: Option<RawActorId>,
    },
    /// Any event kind the aggregator does not count.
    #[serde(other)]
    Other,
}

impl CombatEvent {
    /// Short name of the event kind, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Shot(_) => "shot",
            Self::Hit(_) => "hit",
            Self::Kill(_) => "kill",
            Self::UnitLost { .. } => "unit_lost",
            Self::Other => "other",
        }
    }
}

/// A combat event stamped with the simulation time it occurred at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Simulation time in seconds.
    #[serde(default)]
    pub time: f64,
    /// The event itself.
    pub event: CombatEvent,
}
