//! Counter records owned by the [`CounterStore`].
//!
//! Every counter starts at zero and only ever increases. Identity fields on
//! an actor record may be upgraded in place; counters are never reset.
//!
//! [`CounterStore`]: crate::CounterStore

use std::collections::BTreeMap;

use serde::Serialize;

use killboard_types::{
    ActorCounter, ActorDescriptor, AggregationKey, GroupKey, StableId, WeaponStat,
};

// ---------------------------------------------------------------------------
// CounterSet
// ---------------------------------------------------------------------------

/// The nine scalar counters shared by actor and group records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSet {
    /// Shots fired in same-domain engagements.
    pub same_domain_shots: u64,
    /// Hits landed in same-domain engagements.
    pub same_domain_hits: u64,
    /// Kills scored in same-domain engagements.
    pub same_domain_kills: u64,
    /// Shots fired in cross-domain engagements.
    pub cross_domain_shots: u64,
    /// Hits landed in cross-domain engagements.
    pub cross_domain_hits: u64,
    /// Kills scored in cross-domain engagements.
    pub cross_domain_kills: u64,
    /// Times lost.
    pub deaths: u64,
    /// Hits on friendly actors.
    pub friendly_fire_hits: u64,
    /// Kills of friendly actors.
    pub friendly_fire_kills: u64,
}

impl CounterSet {
    /// Read one counter.
    pub const fn get(&self, counter: ActorCounter) -> u64 {
        match counter {
            ActorCounter::SameDomainShots => self.same_domain_shots,
            ActorCounter::SameDomainHits => self.same_domain_hits,
            ActorCounter::SameDomainKills => self.same_domain_kills,
            ActorCounter::CrossDomainShots => self.cross_domain_shots,
            ActorCounter::CrossDomainHits => self.cross_domain_hits,
            ActorCounter::CrossDomainKills => self.cross_domain_kills,
            ActorCounter::Deaths => self.deaths,
            ActorCounter::FriendlyFireHits => self.friendly_fire_hits,
            ActorCounter::FriendlyFireKills => self.friendly_fire_kills,
        }
    }

    /// Add one to a counter.
    pub const fn increment(&mut self, counter: ActorCounter) {
        let slot = match counter {
            ActorCounter::SameDomainShots => &mut self.same_domain_shots,
            ActorCounter::SameDomainHits => &mut self.same_domain_hits,
            ActorCounter::SameDomainKills => &mut self.same_domain_kills,
            ActorCounter::CrossDomainShots => &mut self.cross_domain_shots,
            ActorCounter::CrossDomainHits => &mut self.cross_domain_hits,
            ActorCounter::CrossDomainKills => &mut self.cross_domain_kills,
            ActorCounter::Deaths => &mut self.deaths,
            ActorCounter::FriendlyFireHits => &mut self.friendly_fire_hits,
            ActorCounter::FriendlyFireKills => &mut self.friendly_fire_kills,
        };
        *slot = slot.saturating_add(1);
    }

    /// Sum of all nine counters.
    pub fn total(&self) -> u64 {
        ActorCounter::ALL
            .iter()
            .fold(0_u64, |acc, c| acc.saturating_add(self.get(*c)))
    }
}

// ---------------------------------------------------------------------------
// WeaponCounters
// ---------------------------------------------------------------------------

/// Shots, hits, and kills for one weapon type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeaponCounters {
    /// Releases.
    pub shots: u64,
    /// Impacts.
    pub hits: u64,
    /// Kills.
    pub kills: u64,
}

impl WeaponCounters {
    /// Read one counter.
    pub const fn get(&self, stat: WeaponStat) -> u64 {
        match stat {
            WeaponStat::Shots => self.shots,
            WeaponStat::Hits => self.hits,
            WeaponStat::Kills => self.kills,
        }
    }

    /// Add one to a counter.
    pub const fn increment(&mut self, stat: WeaponStat) {
        let slot = match stat {
            WeaponStat::Shots => &mut self.shots,
            WeaponStat::Hits => &mut self.hits,
            WeaponStat::Kills => &mut self.kills,
        };
        *slot = slot.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// ActorCounterRecord
// ---------------------------------------------------------------------------

/// Everything counted for one aggregation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorCounterRecord {
    key: AggregationKey,
    display_name: String,
    name_is_placeholder: bool,
    stable_id: Option<StableId>,
    needs_identity_upgrade: bool,
    counters: CounterSet,
    weapons: BTreeMap<String, WeaponCounters>,
}

impl ActorCounterRecord {
    /// Create a zeroed record from the descriptor that first produced `key`.
    pub fn new(key: AggregationKey, descriptor: &ActorDescriptor, is_fallback: bool) -> Self {
        Self {
            key,
            display_name: descriptor.display_name.clone(),
            name_is_placeholder: descriptor.name_is_placeholder,
            stable_id: descriptor.stable_id.clone(),
            needs_identity_upgrade: is_fallback,
            counters: CounterSet::default(),
            weapons: BTreeMap::new(),
        }
    }

    /// Create a zeroed record for a key that was incremented before it was
    /// ensured. The key doubles as the display name until a descriptor
    /// arrives.
    pub fn orphan(key: AggregationKey) -> Self {
        Self {
            display_name: key.as_str().to_owned(),
            key,
            name_is_placeholder: true,
            stable_id: None,
            needs_identity_upgrade: true,
            counters: CounterSet::default(),
            weapons: BTreeMap::new(),
        }
    }

    /// Replace placeholder identity fields with better ones from `descriptor`.
    ///
    /// Only fields that are currently placeholders are touched. Counters are
    /// left alone. Returns whether anything changed.
    pub fn upgrade_identity(&mut self, descriptor: &ActorDescriptor) -> bool {
        let mut changed = false;

        if self.stable_id.is_none() && descriptor.stable_id.is_some() {
            self.stable_id.clone_from(&descriptor.stable_id);
            changed = true;
        }

        if self.name_is_placeholder && descriptor.has_real_name() {
            self.display_name.clone_from(&descriptor.display_name);
            self.name_is_placeholder = false;
            changed = true;
        }

        if self.needs_identity_upgrade && (self.stable_id.is_some() || !self.name_is_placeholder) {
            self.needs_identity_upgrade = false;
            changed = true;
        }

        changed
    }

    /// The aggregation key.
    pub const fn key(&self) -> &AggregationKey {
        &self.key
    }

    /// Best-known display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Best-known external identity.
    pub const fn stable_id(&self) -> Option<&StableId> {
        self.stable_id.as_ref()
    }

    /// Whether the record is still waiting for a real identity.
    pub const fn needs_identity_upgrade(&self) -> bool {
        self.needs_identity_upgrade
    }

    /// The scalar counters.
    pub const fn counters(&self) -> &CounterSet {
        &self.counters
    }

    /// Per-weapon counters, by weapon type.
    pub const fn weapons(&self) -> &BTreeMap<String, WeaponCounters> {
        &self.weapons
    }

    /// Counters for one weapon type.
    pub fn weapon(&self, weapon_type: &str) -> Option<&WeaponCounters> {
        self.weapons.get(weapon_type)
    }

    pub(crate) const fn increment(&mut self, counter: ActorCounter) {
        self.counters.increment(counter);
    }

    pub(crate) fn increment_weapon(&mut self, weapon_type: &str, stat: WeaponStat) {
        self.weapons
            .entry(weapon_type.to_owned())
            .or_default()
            .increment(stat);
    }
}

// ---------------------------------------------------------------------------
// GroupCounterRecord
// ---------------------------------------------------------------------------

/// Everything counted for one unit group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCounterRecord {
    key: GroupKey,
    counters: CounterSet,
}

impl GroupCounterRecord {
    /// Create a zeroed record.
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            counters: CounterSet::default(),
        }
    }

    /// The group key.
    pub const fn key(&self) -> &GroupKey {
        &self.key
    }

    /// The scalar counters.
    pub const fn counters(&self) -> &CounterSet {
        &self.counters
    }

    pub(crate) const fn increment(&mut self, counter: ActorCounter) {
        self.counters.increment(counter);
    }
}
