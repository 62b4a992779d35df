//! Enumeration types for the Killboard aggregator.
//!
//! Classification enums always carry an `Unknown` variant so that every
//! descriptor field has a value even when the simulation cannot classify
//! the underlying object.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The operating medium of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Fixed or rotary wing aircraft.
    Air,
    /// Land units.
    Surface,
    /// Ships.
    Naval,
    /// Anything the simulation could not classify.
    Unknown,
}

impl Domain {
    /// Map a group category to the operating domain.
    pub const fn from_group_category(category: GroupCategory) -> Self {
        match category {
            GroupCategory::Airplane | GroupCategory::Helicopter => Self::Air,
            GroupCategory::Ground => Self::Surface,
            GroupCategory::Ship => Self::Naval,
            GroupCategory::Train | GroupCategory::Unknown => Self::Unknown,
        }
    }

    /// Whether this is a surface or naval domain.
    pub const fn is_surface_or_naval(self) -> bool {
        matches!(self, Self::Surface | Self::Naval)
    }
}

/// The side an actor fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affiliation {
    /// Belongs to neither side.
    Neutral,
    /// The first coalition.
    SideA,
    /// The second coalition.
    SideB,
    /// Could not be determined.
    Unknown,
}

impl Affiliation {
    /// Map the simulation's numeric coalition code.
    ///
    /// `0` is neutral, `1` and `2` are the two sides. Anything else,
    /// including an absent code, is `Unknown`.
    pub const fn from_coalition(code: Option<i64>) -> Self {
        match code {
            Some(0) => Self::Neutral,
            Some(1) => Self::SideA,
            Some(2) => Self::SideB,
            _ => Self::Unknown,
        }
    }

    /// Whether the affiliation was actually determined.
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// The category the simulation assigns to a unit group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCategory {
    /// Fixed wing aircraft.
    Airplane,
    /// Rotary wing aircraft.
    Helicopter,
    /// Ground vehicles and infantry.
    Ground,
    /// Surface vessels.
    Ship,
    /// Rail units.
    Train,
    /// Not reported.
    #[serde(other)]
    Unknown,
}

/// The engagement type between an initiator and a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionCategory {
    /// Air versus air.
    SameDomain,
    /// Air versus surface or naval.
    CrossDomain,
    /// Surface or naval versus air.
    GroundToAir,
    /// Every other combination, including unknown domains.
    Other,
}

impl InteractionCategory {
    /// Classify an initiator/target domain pair.
    ///
    /// Exactly one category is selected for any pair.
    pub const fn classify(initiator: Domain, target: Domain) -> Self {
        match (initiator, target) {
            (Domain::Air, Domain::Air) => Self::SameDomain,
            (Domain::Air, Domain::Surface | Domain::Naval) => Self::CrossDomain,
            (Domain::Surface | Domain::Naval, Domain::Air) => Self::GroundToAir,
            _ => Self::Other,
        }
    }
}

impl core::fmt::Display for InteractionCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SameDomain => write!(f, "same_domain"),
            Self::CrossDomain => write!(f, "cross_domain"),
            Self::GroundToAir => write!(f, "ground_to_air"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// One of the nine scalar counters kept per actor and per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorCounter {
    /// Shots fired in same-domain engagements.
    SameDomainShots,
    /// Hits landed in same-domain engagements.
    SameDomainHits,
    /// Kills scored in same-domain engagements.
    SameDomainKills,
    /// Shots fired in cross-domain engagements.
    CrossDomainShots,
    /// Hits landed in cross-domain engagements.
    CrossDomainHits,
    /// Kills scored in cross-domain engagements.
    CrossDomainKills,
    /// Times this actor was lost.
    Deaths,
    /// Hits landed on a friendly actor.
    FriendlyFireHits,
    /// Kills scored on a friendly actor.
    FriendlyFireKills,
}

impl ActorCounter {
    /// Every counter, in rendering order.
    pub const ALL: [Self; 9] = [
        Self::SameDomainShots,
        Self::SameDomainHits,
        Self::SameDomainKills,
        Self::CrossDomainShots,
        Self::CrossDomainHits,
        Self::CrossDomainKills,
        Self::Deaths,
        Self::FriendlyFireHits,
        Self::FriendlyFireKills,
    ];
}

/// One of the three per-weapon counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponStat {
    /// Weapon releases.
    Shots,
    /// Weapon impacts.
    Hits,
    /// Kills credited to the weapon.
    Kills,
}

impl core::fmt::Display for WeaponStat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Shots => write!(f, "shots"),
            Self::Hits => write!(f, "hits"),
            Self::Kills => write!(f, "kills"),
        }
    }
}
