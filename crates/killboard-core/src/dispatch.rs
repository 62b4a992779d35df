//! Event classification and dispatch.
//!
//! The [`Aggregator`] turns each [`CombatEvent`] into counter updates. It
//! resolves participants through the [`IdentityResolver`], classifies the
//! engagement, and applies the per-kind rules to the [`CounterStore`].
//!
//! Dispatch never fails. Anything that cannot be resolved is logged and
//! reported back as a [`DispatchOutcome::Skipped`].
//!
//! Deaths are counted on both [`CombatEvent::Kill`] and
//! [`CombatEvent::UnitLost`] without de-duplication. When the simulation
//! reports both for one loss, the victim's deaths go up by two.

use tracing::debug;

use killboard_identity::{ActorDatabase, EntitySource, IdentityResolver};
use killboard_store::{CounterStore, Snapshot};
use killboard_types::{
    ActorCounter, ActorDescriptor, Affiliation, AggregationKey, CombatEvent, Engagement, GroupKey,
    InteractionCategory, RawActorId, WeaponStat,
};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify an engagement. `None` when either side did not resolve.
pub const fn classify(
    initiator: Option<&ActorDescriptor>,
    target: Option<&ActorDescriptor>,
) -> Option<InteractionCategory> {
    match (initiator, target) {
        (Some(i), Some(t)) => Some(InteractionCategory::classify(i.domain, t.domain)),
        _ => None,
    }
}

/// Whether an engagement hit a friendly actor.
///
/// Both affiliations must be known, equal, and not neutral, and the two
/// sides must be different entities.
pub fn is_friendly_fire(initiator: &ActorDescriptor, target: &ActorDescriptor) -> bool {
    initiator.affiliation.is_known()
        && initiator.affiliation != Affiliation::Neutral
        && initiator.affiliation == target.affiliation
        && initiator.raw_id != target.raw_id
}

/// The actor counter an engagement of `category` adds to, if any.
const fn category_counter(
    category: InteractionCategory,
    same_domain: ActorCounter,
    cross_domain: ActorCounter,
) -> Option<ActorCounter> {
    match category {
        InteractionCategory::SameDomain => Some(same_domain),
        InteractionCategory::CrossDomain => Some(cross_domain),
        InteractionCategory::GroundToAir | InteractionCategory::Other => None,
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why an event changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event needs an initiator and none resolved.
    MissingInitiator,
    /// The event needs a target and none resolved.
    MissingTarget,
    /// Neither side resolved.
    NothingResolved,
}

/// What one call to [`Aggregator::process`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A shot was counted. `category` is `None` when there was no target.
    Shot {
        /// Engagement category, if the target resolved.
        category: Option<InteractionCategory>,
    },
    /// A hit was counted.
    Hit {
        /// Engagement category.
        category: InteractionCategory,
        /// Whether it counted as friendly fire.
        friendly_fire: bool,
    },
    /// A kill was credited and the victim's death counted.
    Kill {
        /// Engagement category.
        category: InteractionCategory,
        /// Whether it counted as friendly fire.
        friendly_fire: bool,
    },
    /// A kill with no attributable initiator: only the death was counted.
    UncreditedDeath,
    /// A unit loss was counted as a death.
    Loss,
    /// The event needed a participant that did not resolve.
    Skipped(SkipReason),
    /// The event kind is not counted.
    Ignored,
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// A participant after resolution, with its store keys.
struct Participant {
    descriptor: ActorDescriptor,
    key: AggregationKey,
    group: GroupKey,
}

/// Single-writer owner of the counter store.
#[derive(Debug)]
pub struct Aggregator<D> {
    resolver: IdentityResolver<D>,
    store: CounterStore,
    events_processed: u64,
}

impl<D: ActorDatabase> Aggregator<D> {
    /// Create an aggregator with an empty store.
    pub fn new(resolver: IdentityResolver<D>) -> Self {
        Self::with_store(resolver, CounterStore::new())
    }

    /// Create an aggregator over an existing store.
    pub const fn with_store(resolver: IdentityResolver<D>, store: CounterStore) -> Self {
        Self {
            resolver,
            store,
            events_processed: 0,
        }
    }

    /// The counter store.
    pub const fn store(&self) -> &CounterStore {
        &self.store
    }

    /// The identity resolver.
    pub const fn resolver(&self) -> &IdentityResolver<D> {
        &self.resolver
    }

    /// Events handed to [`Self::process`] so far, counted or not.
    pub const fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Copy the current counters.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot(self.events_processed)
    }

    /// Stop associating a simulation handle with its fallback key.
    ///
    /// Call when the entity leaves the world. Its record keeps its counters.
    pub fn release(&mut self, raw_id: RawActorId) {
        self.store.release_actor(raw_id);
    }

    /// Apply one event to the store.
    pub fn process(&mut self, world: &dyn EntitySource, event: &CombatEvent) -> DispatchOutcome {
        self.events_processed = self.events_processed.saturating_add(1);

        let outcome = match event {
            CombatEvent::Shot(engagement) => self.on_shot(world, engagement),
            CombatEvent::Hit(engagement) => self.on_hit(world, engagement),
            CombatEvent::Kill(engagement) => self.on_kill(world, engagement),
            CombatEvent::UnitLost { initiator } => self.on_unit_lost(world, *initiator),
            CombatEvent::Other => DispatchOutcome::Ignored,
        };

        if let DispatchOutcome::Skipped(reason) = outcome {
            debug!(kind = event.kind(), reason = ?reason, "Event skipped");
        }
        outcome
    }

    fn on_shot(&mut self, world: &dyn EntitySource, e: &Engagement) -> DispatchOutcome {
        let Some(initiator) = self.participant(world, e.initiator) else {
            return DispatchOutcome::Skipped(SkipReason::MissingInitiator);
        };
        let target = self.resolve(world, e.target);
        let category = classify(Some(&initiator.descriptor), target.as_ref());

        if let Some(counter) = category.and_then(|c| {
            category_counter(c, ActorCounter::SameDomainShots, ActorCounter::CrossDomainShots)
        }) {
            self.credit(&initiator, counter);
        }

        let weapon = self.resolver.resolve_weapon(world, e.weapon);
        self.store
            .increment_weapon(&initiator.key, &weapon, WeaponStat::Shots);

        DispatchOutcome::Shot { category }
    }

    fn on_hit(&mut self, world: &dyn EntitySource, e: &Engagement) -> DispatchOutcome {
        let initiator = self.resolve(world, e.initiator);
        let target = self.resolve(world, e.target);
        let (initiator, target) = match (initiator, target) {
            (Some(i), Some(t)) => (self.enroll(i), t),
            (None, Some(_)) => return DispatchOutcome::Skipped(SkipReason::MissingInitiator),
            (Some(_), None) => return DispatchOutcome::Skipped(SkipReason::MissingTarget),
            (None, None) => return DispatchOutcome::Skipped(SkipReason::NothingResolved),
        };

        let category = InteractionCategory::classify(initiator.descriptor.domain, target.domain);
        let friendly_fire = is_friendly_fire(&initiator.descriptor, &target);
        if friendly_fire {
            debug!(initiator = %initiator.key, category = %category, "Friendly fire hit");
        }
        self.credit_engagement(
            &initiator,
            category,
            friendly_fire,
            [
                ActorCounter::FriendlyFireHits,
                ActorCounter::SameDomainHits,
                ActorCounter::CrossDomainHits,
            ],
        );

        let weapon = self.resolver.resolve_weapon(world, e.weapon);
        self.store
            .increment_weapon(&initiator.key, &weapon, WeaponStat::Hits);

        DispatchOutcome::Hit {
            category,
            friendly_fire,
        }
    }

    fn on_kill(&mut self, world: &dyn EntitySource, e: &Engagement) -> DispatchOutcome {
        let initiator = self.resolve(world, e.initiator);
        let target = self.resolve(world, e.target);

        match (initiator, target) {
            (Some(initiator), Some(target)) => {
                let initiator = self.enroll(initiator);
                let target = self.enroll(target);
                let category = InteractionCategory::classify(
                    initiator.descriptor.domain,
                    target.descriptor.domain,
                );
                let friendly_fire = is_friendly_fire(&initiator.descriptor, &target.descriptor);
                if friendly_fire {
                    debug!(
                        initiator = %initiator.key,
                        target = %target.key,
                        category = %category,
                        "Friendly fire kill"
                    );
                }
                self.credit_engagement(
                    &initiator,
                    category,
                    friendly_fire,
                    [
                        ActorCounter::FriendlyFireKills,
                        ActorCounter::SameDomainKills,
                        ActorCounter::CrossDomainKills,
                    ],
                );

                let weapon = self.resolver.resolve_weapon(world, e.weapon);
                self.store
                    .increment_weapon(&initiator.key, &weapon, WeaponStat::Kills);
                self.credit(&target, ActorCounter::Deaths);

                DispatchOutcome::Kill {
                    category,
                    friendly_fire,
                }
            }
            (None, Some(target)) => {
                let target = self.enroll(target);
                debug!(
                    target = %target.key,
                    initiator = ?e.initiator,
                    "Kill without attributable initiator"
                );
                self.credit(&target, ActorCounter::Deaths);
                DispatchOutcome::UncreditedDeath
            }
            (Some(_), None) => DispatchOutcome::Skipped(SkipReason::MissingTarget),
            (None, None) => DispatchOutcome::Skipped(SkipReason::NothingResolved),
        }
    }

    fn on_unit_lost(
        &mut self,
        world: &dyn EntitySource,
        lost: Option<RawActorId>,
    ) -> DispatchOutcome {
        let Some(lost) = self.participant(world, lost) else {
            return DispatchOutcome::Skipped(SkipReason::MissingInitiator);
        };
        self.credit(&lost, ActorCounter::Deaths);
        DispatchOutcome::Loss
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn resolve(&self, world: &dyn EntitySource, raw: Option<RawActorId>) -> Option<ActorDescriptor> {
        raw.and_then(|raw| self.resolver.resolve(world, raw))
    }

    /// Resolve a participant and make sure its actor and group records exist.
    fn participant(
        &mut self,
        world: &dyn EntitySource,
        raw: Option<RawActorId>,
    ) -> Option<Participant> {
        let descriptor = self.resolve(world, raw)?;
        Some(self.enroll(descriptor))
    }

    /// Make sure the actor and group records of a resolved participant exist.
    fn enroll(&mut self, descriptor: ActorDescriptor) -> Participant {
        let key = self.store.ensure_actor(&descriptor);
        let group = self.store.ensure_group(&descriptor.group);
        Participant {
            descriptor,
            key,
            group,
        }
    }

    /// Add one to a counter on both the actor and its group.
    fn credit(&mut self, participant: &Participant, counter: ActorCounter) {
        self.store.increment_actor(&participant.key, counter);
        self.store.increment_group(&participant.group, counter);
    }

    /// Credit a hit or a kill: friendly fire replaces the category counter.
    ///
    /// `counters` is `[friendly_fire, same_domain, cross_domain]`.
    fn credit_engagement(
        &mut self,
        initiator: &Participant,
        category: InteractionCategory,
        friendly_fire: bool,
        counters: [ActorCounter; 3],
    ) {
        let [friendly, same_domain, cross_domain] = counters;
        let counter = if friendly_fire {
            Some(friendly)
        } else {
            category_counter(category, same_domain, cross_domain)
        };
        if let Some(counter) = counter {
            self.credit(initiator, counter);
        }
    }
}

#[cfg(test)]
mod tests {
    use killboard_identity::{
        EntityInfo, ExternalActorRow, GroupInfo, InMemoryActorDatabase, InMemoryWorld, WeaponInfo,
    };
    use killboard_store::UNKNOWN_WEAPON;
    use killboard_types::{Domain, GroupCategory, RawWeaponId};

    use super::*;

    const SIDE_A: i64 = 1;
    const SIDE_B: i64 = 2;

    fn entity(id: u64, name: &str, coalition: i64, group: &str, category: GroupCategory) -> EntityInfo {
        EntityInfo {
            id: RawActorId(id),
            type_name: Some(String::from("generic")),
            designer_name: Some(name.to_owned()),
            player_name: None,
            coalition: Some(coalition),
            group: Some(GroupInfo {
                name: Some(group.to_owned()),
                category: Some(category),
            }),
        }
    }

    fn jet(id: u64, name: &str, coalition: i64, group: &str) -> EntityInfo {
        entity(id, name, coalition, group, GroupCategory::Airplane)
    }

    fn tank(id: u64, name: &str, coalition: i64, group: &str) -> EntityInfo {
        entity(id, name, coalition, group, GroupCategory::Ground)
    }

    fn engagement(initiator: Option<u64>, target: Option<u64>, weapon: Option<u64>) -> Engagement {
        Engagement {
            initiator: initiator.map(RawActorId),
            target: target.map(RawActorId),
            weapon: weapon.map(RawWeaponId),
        }
    }

    fn setup() -> (Aggregator<InMemoryActorDatabase>, InMemoryWorld) {
        let aggregator = Aggregator::new(IdentityResolver::new(InMemoryActorDatabase::new()));
        let mut world = InMemoryWorld::new();
        world.register_weapon(WeaponInfo {
            id: RawWeaponId(100),
            name: Some(String::from("AIM-9X Sidewinder")),
            type_name: Some(String::from("AIM_9X")),
        });
        (aggregator, world)
    }

    fn actor_counter(agg: &Aggregator<InMemoryActorDatabase>, key: &str, counter: ActorCounter) -> u64 {
        agg.store()
            .actor(key)
            .map_or(0, |r| r.counters().get(counter))
    }

    fn group_counter(agg: &Aggregator<InMemoryActorDatabase>, key: &str, counter: ActorCounter) -> u64 {
        agg.store()
            .group(key)
            .map_or(0, |g| g.counters().get(counter))
    }

    fn weapon_stat(
        agg: &Aggregator<InMemoryActorDatabase>,
        key: &str,
        weapon: &str,
        stat: WeaponStat,
    ) -> u64 {
        agg.store()
            .actor(key)
            .and_then(|r| r.weapon(weapon))
            .map_or(0, |w| w.get(stat))
    }

    #[test]
    fn classify_needs_both_sides() {
        let (agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(tank(2, "T-72 1", SIDE_B, "Armor"));
        let air = agg.resolver().resolve(&world, RawActorId(1));
        let ground = agg.resolver().resolve(&world, RawActorId(2));

        assert_eq!(classify(air.as_ref(), None), None);
        assert_eq!(classify(None, ground.as_ref()), None);
        assert_eq!(
            classify(air.as_ref(), ground.as_ref()),
            Some(InteractionCategory::CrossDomain)
        );
        assert_eq!(
            classify(ground.as_ref(), air.as_ref()),
            Some(InteractionCategory::GroundToAir)
        );
    }

    fn descriptor(raw: u64, affiliation: Affiliation) -> ActorDescriptor {
        ActorDescriptor {
            raw_id: RawActorId(raw),
            display_name: format!("unit {raw}"),
            name_is_placeholder: false,
            stable_id: None,
            domain: Domain::Air,
            affiliation,
            is_controlled: false,
            group: killboard_types::GroupAffiliation::named("G"),
        }
    }

    #[test]
    fn friendly_fire_rules() {
        let a = descriptor(1, Affiliation::SideA);
        let b = descriptor(2, Affiliation::SideA);
        let c = descriptor(3, Affiliation::SideB);

        assert!(is_friendly_fire(&a, &b));
        assert!(!is_friendly_fire(&a, &c));
        assert!(!is_friendly_fire(&a, &a), "self-damage is not friendly fire");
        assert!(
            !is_friendly_fire(
                &descriptor(4, Affiliation::Neutral),
                &descriptor(5, Affiliation::Neutral)
            ),
            "neutrals never count"
        );
        assert!(
            !is_friendly_fire(
                &descriptor(6, Affiliation::Unknown),
                &descriptor(7, Affiliation::Unknown)
            ),
            "unknown affiliations never count"
        );
    }

    #[test]
    fn shot_without_target_only_counts_weapon() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));

        let outcome = agg.process(
            &world,
            &CombatEvent::Shot(engagement(Some(1), None, Some(100))),
        );

        assert_eq!(outcome, DispatchOutcome::Shot { category: None });
        assert_eq!(weapon_stat(&agg, "Viper 1-1", "AIM_9X", WeaponStat::Shots), 1);
        let record = agg.store().actor("Viper 1-1");
        assert_eq!(record.map(|r| r.counters().total()), Some(0));
        assert_eq!(group_counter(&agg, "Viper", ActorCounter::SameDomainShots), 0);
    }

    #[test]
    fn shot_counts_by_category() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(jet(2, "Flanker 1", SIDE_B, "Flanker"));
        world.spawn(tank(3, "T-72 1", SIDE_B, "Armor"));

        agg.process(&world, &CombatEvent::Shot(engagement(Some(1), Some(2), Some(100))));
        agg.process(&world, &CombatEvent::Shot(engagement(Some(1), Some(3), Some(100))));
        let g2a = agg.process(&world, &CombatEvent::Shot(engagement(Some(3), Some(1), None)));

        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::SameDomainShots), 1);
        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::CrossDomainShots), 1);
        assert_eq!(group_counter(&agg, "Viper", ActorCounter::SameDomainShots), 1);
        assert_eq!(group_counter(&agg, "Viper", ActorCounter::CrossDomainShots), 1);
        assert_eq!(weapon_stat(&agg, "Viper 1-1", "AIM_9X", WeaponStat::Shots), 2);

        assert_eq!(
            g2a,
            DispatchOutcome::Shot {
                category: Some(InteractionCategory::GroundToAir)
            }
        );
        assert_eq!(agg.store().actor("T-72 1").map(|r| r.counters().total()), Some(0));
        assert_eq!(weapon_stat(&agg, "T-72 1", UNKNOWN_WEAPON, WeaponStat::Shots), 1);
    }

    #[test]
    fn shot_without_initiator_is_skipped() {
        let (mut agg, world) = setup();
        let outcome = agg.process(&world, &CombatEvent::Shot(engagement(None, None, Some(100))));
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::MissingInitiator));
        assert_eq!(agg.store().actor_count(), 0);
        assert_eq!(agg.events_processed(), 1);
    }

    #[test]
    fn friendly_fire_hit_replaces_category_counter() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(tank(2, "Abrams 1", SIDE_A, "Armor"));

        let outcome = agg.process(&world, &CombatEvent::Hit(engagement(Some(1), Some(2), Some(100))));

        assert_eq!(
            outcome,
            DispatchOutcome::Hit {
                category: InteractionCategory::CrossDomain,
                friendly_fire: true
            }
        );
        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::FriendlyFireHits), 1);
        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::CrossDomainHits), 0);
        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::SameDomainHits), 0);
        assert_eq!(group_counter(&agg, "Viper", ActorCounter::FriendlyFireHits), 1);
        assert_eq!(weapon_stat(&agg, "Viper 1-1", "AIM_9X", WeaponStat::Hits), 1);
    }

    #[test]
    fn hit_needs_both_sides() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));

        let outcome = agg.process(&world, &CombatEvent::Hit(engagement(Some(1), Some(9), Some(100))));
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::MissingTarget));
        assert_eq!(weapon_stat(&agg, "Viper 1-1", "AIM_9X", WeaponStat::Hits), 0);

        let outcome = agg.process(&world, &CombatEvent::Hit(engagement(None, Some(1), None)));
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::MissingInitiator));
    }

    #[test]
    fn kill_credits_initiator_and_counts_death() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(jet(2, "Flanker 1", SIDE_B, "Flanker"));

        let outcome = agg.process(&world, &CombatEvent::Kill(engagement(Some(1), Some(2), Some(100))));

        assert_eq!(
            outcome,
            DispatchOutcome::Kill {
                category: InteractionCategory::SameDomain,
                friendly_fire: false
            }
        );
        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::SameDomainKills), 1);
        assert_eq!(group_counter(&agg, "Viper", ActorCounter::SameDomainKills), 1);
        assert_eq!(weapon_stat(&agg, "Viper 1-1", "AIM_9X", WeaponStat::Kills), 1);
        assert_eq!(actor_counter(&agg, "Flanker 1", ActorCounter::Deaths), 1);
        assert_eq!(group_counter(&agg, "Flanker", ActorCounter::Deaths), 1);
        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::Deaths), 0);
    }

    #[test]
    fn friendly_kill_still_counts_death() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(jet(2, "Viper 1-2", SIDE_A, "Viper"));

        agg.process(&world, &CombatEvent::Kill(engagement(Some(1), Some(2), Some(100))));

        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::FriendlyFireKills), 1);
        assert_eq!(actor_counter(&agg, "Viper 1-1", ActorCounter::SameDomainKills), 0);
        assert_eq!(actor_counter(&agg, "Viper 1-2", ActorCounter::Deaths), 1);
        assert_eq!(group_counter(&agg, "Viper", ActorCounter::FriendlyFireKills), 1);
        assert_eq!(group_counter(&agg, "Viper", ActorCounter::Deaths), 1);
    }

    #[test]
    fn uncredited_kill_only_counts_death() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(2, "Flanker 1", SIDE_B, "Flanker"));

        let outcome = agg.process(&world, &CombatEvent::Kill(engagement(Some(77), Some(2), Some(100))));

        assert_eq!(outcome, DispatchOutcome::UncreditedDeath);
        assert_eq!(actor_counter(&agg, "Flanker 1", ActorCounter::Deaths), 1);
        assert_eq!(group_counter(&agg, "Flanker", ActorCounter::Deaths), 1);
        assert_eq!(agg.store().actor_count(), 1);
    }

    #[test]
    fn kill_with_nothing_resolved_is_a_no_op() {
        let (mut agg, world) = setup();
        let outcome = agg.process(&world, &CombatEvent::Kill(engagement(Some(1), Some(2), None)));
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::NothingResolved));
        assert_eq!(agg.store().actor_count(), 0);
        assert_eq!(agg.store().group_count(), 0);
    }

    #[test]
    fn unit_lost_and_kill_both_count_deaths() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(jet(2, "Flanker 1", SIDE_B, "Flanker"));

        let outcome = agg.process(&world, &CombatEvent::UnitLost { initiator: Some(RawActorId(2)) });
        assert_eq!(outcome, DispatchOutcome::Loss);
        assert_eq!(actor_counter(&agg, "Flanker 1", ActorCounter::Deaths), 1);

        agg.process(&world, &CombatEvent::Kill(engagement(Some(1), Some(2), Some(100))));
        assert_eq!(actor_counter(&agg, "Flanker 1", ActorCounter::Deaths), 2);
        assert_eq!(group_counter(&agg, "Flanker", ActorCounter::Deaths), 2);
    }

    #[test]
    fn other_events_are_ignored() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        assert_eq!(agg.process(&world, &CombatEvent::Other), DispatchOutcome::Ignored);
        assert_eq!(agg.store().actor_count(), 0);
        assert_eq!(agg.events_processed(), 1);
    }

    #[test]
    fn unresolved_actor_keeps_one_fallback_record() {
        let (mut agg, mut world) = setup();
        world.spawn(EntityInfo {
            id: RawActorId(5),
            type_name: None,
            designer_name: None,
            player_name: None,
            coalition: Some(SIDE_A),
            group: None,
        });

        agg.process(&world, &CombatEvent::Shot(engagement(Some(5), None, Some(100))));
        agg.process(&world, &CombatEvent::Shot(engagement(Some(5), None, Some(100))));

        assert_eq!(agg.store().actor_count(), 1);
        let record = agg.store().actors().next();
        assert_eq!(
            record.and_then(|r| r.weapon("AIM_9X")).map(|w| w.shots),
            Some(2)
        );
        assert!(record.is_some_and(|r| r.needs_identity_upgrade()));
    }

    #[test]
    fn controlled_actor_aggregates_under_stable_id() {
        let mut db = InMemoryActorDatabase::new();
        db.insert_by_id(
            RawActorId(1),
            ExternalActorRow {
                raw_id: Some(RawActorId(1)),
                stable_id: String::from("ucid-1"),
                name: Some(String::from("Maverick")),
                designer_name: None,
            },
        );
        let mut agg = Aggregator::new(IdentityResolver::new(db));
        let mut world = InMemoryWorld::new();
        world.spawn(EntityInfo {
            player_name: Some(String::from("Maverick")),
            ..jet(1, "Viper 1-1", SIDE_A, "Viper")
        });
        world.spawn(jet(2, "Flanker 1", SIDE_B, "Flanker"));

        agg.process(&world, &CombatEvent::Kill(engagement(Some(1), Some(2), None)));

        assert_eq!(actor_counter(&agg, "ucid-1", ActorCounter::SameDomainKills), 1);
        assert_eq!(
            agg.store().actor("ucid-1").map(|r| r.display_name().to_owned()),
            Some(String::from("Maverick"))
        );
        assert_eq!(weapon_stat(&agg, "ucid-1", UNKNOWN_WEAPON, WeaponStat::Kills), 1);
    }

    #[test]
    fn stale_target_after_despawn() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(jet(2, "Flanker 1", SIDE_B, "Flanker"));
        world.despawn(RawActorId(2));

        let outcome = agg.process(&world, &CombatEvent::Hit(engagement(Some(1), Some(2), Some(100))));
        assert_eq!(outcome, DispatchOutcome::Skipped(SkipReason::MissingTarget));
    }

    #[test]
    fn group_counters_sum_their_members() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(jet(2, "Viper 1-2", SIDE_A, "Viper"));
        world.spawn(jet(3, "Flanker 1", SIDE_B, "Flanker"));

        agg.process(&world, &CombatEvent::Shot(engagement(Some(1), Some(3), Some(100))));
        agg.process(&world, &CombatEvent::Shot(engagement(Some(2), Some(3), Some(100))));
        agg.process(&world, &CombatEvent::Hit(engagement(Some(2), Some(3), Some(100))));

        for counter in ActorCounter::ALL {
            let members = actor_counter(&agg, "Viper 1-1", counter)
                .saturating_add(actor_counter(&agg, "Viper 1-2", counter));
            assert_eq!(group_counter(&agg, "Viper", counter), members, "{counter:?}");
        }
    }

    #[test]
    fn domain_of_unknown_category_is_other() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(EntityInfo {
            group: None,
            ..jet(2, "Static", SIDE_B, "x")
        });

        let d = agg.resolver().resolve(&world, RawActorId(2));
        assert_eq!(d.map(|d| d.domain), Some(Domain::Unknown));

        agg.process(&world, &CombatEvent::Hit(engagement(Some(1), Some(2), Some(100))));
        let record = agg.store().actor("Viper 1-1");
        assert_eq!(record.map(|r| r.counters().total()), Some(0));
        assert_eq!(weapon_stat(&agg, "Viper 1-1", "AIM_9X", WeaponStat::Hits), 1);
    }

    #[test]
    fn shot_at_unknown_domain_counts_only_the_weapon() {
        let (mut agg, mut world) = setup();
        world.spawn(jet(1, "Viper 1-1", SIDE_A, "Viper"));
        world.spawn(EntityInfo {
            group: None,
            ..jet(2, "Static", SIDE_B, "x")
        });

        let outcome = agg.process(&world, &CombatEvent::Shot(engagement(Some(1), Some(2), Some(100))));

        assert_eq!(
            outcome,
            DispatchOutcome::Shot {
                category: Some(InteractionCategory::Other)
            }
        );
        assert_eq!(weapon_stat(&agg, "Viper 1-1", "AIM_9X", WeaponStat::Shots), 1);
        assert_eq!(agg.store().actor("Viper 1-1").map(|r| r.counters().total()), Some(0));
        assert_eq!(agg.store().group("Viper").map(|g| g.counters().total()), Some(0));
    }

    #[test]
    fn unnamed_units_of_one_type_stay_apart() {
        let (mut agg, mut world) = setup();
        for id in [10, 11] {
            world.spawn(EntityInfo {
                id: RawActorId(id),
                type_name: Some(String::from("T-72B")),
                designer_name: None,
                player_name: None,
                coalition: Some(SIDE_B),
                group: None,
            });
        }

        agg.process(&world, &CombatEvent::UnitLost { initiator: Some(RawActorId(10)) });
        agg.process(&world, &CombatEvent::UnitLost { initiator: Some(RawActorId(11)) });

        assert_eq!(agg.store().actor_count(), 2);
        assert!(agg.store().actor("T-72B").is_none());
        for record in agg.store().actors() {
            assert_eq!(record.display_name(), "T-72B");
            assert_eq!(record.counters().deaths, 1);
        }
    }

    #[test]
    fn released_handle_is_rekeyed_for_its_next_entity() {
        let mut db = InMemoryActorDatabase::new();
        db.insert_by_id(
            RawActorId(5),
            ExternalActorRow {
                raw_id: Some(RawActorId(5)),
                stable_id: String::from("ucid-goose"),
                name: Some(String::from("Goose")),
                designer_name: None,
            },
        );
        let mut agg = Aggregator::new(IdentityResolver::new(db));
        let mut world = InMemoryWorld::new();
        world.spawn(EntityInfo {
            id: RawActorId(5),
            type_name: None,
            designer_name: None,
            player_name: None,
            coalition: Some(SIDE_A),
            group: None,
        });
        agg.process(&world, &CombatEvent::UnitLost { initiator: Some(RawActorId(5)) });
        world.despawn(RawActorId(5));
        agg.release(RawActorId(5));

        world.spawn(EntityInfo {
            player_name: Some(String::from("Goose")),
            ..jet(5, "Viper 1-2", SIDE_A, "Viper")
        });
        agg.process(&world, &CombatEvent::UnitLost { initiator: Some(RawActorId(5)) });

        assert_eq!(actor_counter(&agg, "ucid-goose", ActorCounter::Deaths), 1);
        assert_eq!(agg.store().actor_count(), 2);
        let old = agg.store().actors().find(|r| r.key().as_str() != "ucid-goose");
        assert_eq!(old.map(|r| r.counters().deaths), Some(1));
        assert!(old.is_some_and(|r| r.stable_id().is_none()));
    }
}
