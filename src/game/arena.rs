//! Arena lifecycle and the autonomous round loop.
//!
//! `ArenaCore` is the synchronous state machine: roster, round pipeline,
//! event dispatch, termination. `Arena` wraps it in `Arc<RwLock<...>>` and
//! drives rounds from a spawned task, taking the write lock once per
//! pipeline step so a `force_end` can take effect mid-round.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};
use tracing::{debug, info, warn};

use crate::config::ArenaConfig;
use crate::game::abilities;
use crate::game::alliance::AllianceManager;
use crate::game::classes;
use crate::game::combat;
use crate::game::constants::{combat as combat_consts, events as event_consts};
use crate::game::error::{ActionError, StartError};
use crate::game::events::{EventKind, EventSelector};
use crate::game::notify::{Notification, Notifier};
use crate::game::registry::PlayerRegistry;
use crate::game::state::{AllianceId, ArenaPhase, Class, Player, PlayerId};

/// Synchronous arena state machine
///
/// All mutation happens behind one lock; methods never block.
pub struct ArenaCore {
    config: ArenaConfig,
    phase: ArenaPhase,
    round: u32,
    registry: PlayerRegistry,
    alliances: AllianceManager,
    selector: EventSelector,
    notifier: Notifier,
    /// Roster assembled while Pending: player id and chosen class
    pending: Vec<(PlayerId, Option<Class>)>,
    winner: Option<PlayerId>,
}

impl ArenaCore {
    pub fn new(config: ArenaConfig, notifier: Notifier) -> Self {
        let selector = match config.seed {
            Some(seed) => EventSelector::with_seed(seed),
            None => EventSelector::new(),
        };
        Self {
            config,
            phase: ArenaPhase::Pending,
            round: 0,
            registry: PlayerRegistry::new(),
            alliances: AllianceManager::new(),
            selector,
            notifier,
            pending: Vec::new(),
            winner: None,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn snapshot(&self, id: PlayerId) -> Option<Player> {
        self.registry.snapshot(id)
    }

    pub fn living_players(&self) -> Vec<PlayerId> {
        self.registry.living_players()
    }

    /// Add a player to the pending roster; duplicates are ignored
    pub fn register(&mut self, id: PlayerId) -> Result<(), StartError> {
        if self.phase != ArenaPhase::Pending {
            return Err(StartError::AlreadyStarted);
        }
        if !self.pending.iter().any(|(p, _)| *p == id) {
            self.pending.push((id, None));
        }
        Ok(())
    }

    /// Lock in a class; only valid while the roster is assembling
    pub fn choose_class(&mut self, id: PlayerId, class: Class) -> Result<(), ActionError> {
        if self.phase != ArenaPhase::Pending {
            return Err(ActionError::InvalidActorState);
        }
        let entry = self
            .pending
            .iter_mut()
            .find(|(p, _)| *p == id)
            .ok_or(ActionError::UnknownPlayer)?;
        entry.1 = Some(class);
        Ok(())
    }

    pub fn all_classes_chosen(&self) -> bool {
        self.phase == ArenaPhase::Pending
            && !self.pending.is_empty()
            && self.pending.iter().all(|(_, class)| class.is_some())
    }

    /// Materialize the roster and run round 1 synchronously.
    ///
    /// Players who never chose a class fall back to the default. Fails with
    /// `InsufficientPlayers` before any state transition.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.phase != ArenaPhase::Pending {
            return Err(StartError::AlreadyStarted);
        }
        let actual = self.pending.len();
        if actual < self.config.min_players {
            return Err(StartError::InsufficientPlayers {
                minimum: self.config.min_players,
                actual,
            });
        }

        self.materialize_roster();
        self.phase = ArenaPhase::Active;
        info!(players = actual, "game started");
        self.run_round();
        Ok(())
    }

    fn materialize_roster(&mut self) {
        for (id, class) in std::mem::take(&mut self.pending) {
            let class = class.unwrap_or_default();
            let mut player = Player::new(id, class);
            player.inventory = classes::starter_kit(class);
            self.registry.add_player(player);
        }
    }

    /// One full round; the async driver calls the steps individually
    pub fn run_round(&mut self) {
        self.begin_round();
        self.step_synergy();
        self.step_betrayals();
        self.step_events();
        self.step_tick_and_check();
    }

    pub fn begin_round(&mut self) {
        self.round += 1;
        let living = self.registry.living_count();
        debug!(round = self.round, living, "round started");
        self.notifier.emit(Notification::RoundStarted {
            round: self.round,
            living,
        });
    }

    /// Pipeline step 1: alliance periodic synergy bonuses
    pub fn step_synergy(&mut self) {
        for (alliance, bonus) in self.alliances.apply_periodic_effects(&mut self.registry) {
            debug!(%alliance, bonus, "synergy bonus applied");
        }
    }

    /// Pipeline step 2: betrayal rolls; a triggered betrayal attacks the
    /// partner and dissolves the alliance regardless of outcome
    pub fn step_betrayals(&mut self) {
        let betrayals = self.alliances.pending_betrayals(&mut self.selector, self.round);
        for betrayal in betrayals {
            if self.alliances.dissolve(betrayal.alliance_id).is_none() {
                continue;
            }
            if !self.registry.is_alive(betrayal.betrayer) || !self.registry.is_alive(betrayal.victim)
            {
                continue;
            }
            self.notifier.emit(Notification::AllianceBetrayed {
                alliance: betrayal.alliance_id,
                betrayer: betrayal.betrayer,
                victim: betrayal.victim,
            });
            match combat::resolve_attack(
                &mut self.registry,
                &mut self.selector,
                betrayal.betrayer,
                betrayal.victim,
            ) {
                Ok(outcome) => {
                    self.notifier.emit(Notification::CombatResolved(outcome));
                    if outcome.defender_eliminated {
                        self.handle_elimination(betrayal.victim, Some(betrayal.betrayer));
                    }
                    if outcome.attacker_eliminated {
                        self.handle_elimination(betrayal.betrayer, Some(betrayal.victim));
                    }
                }
                Err(error) => warn!(%error, "betrayal attack failed"),
            }
        }
    }

    /// Pipeline step 3: per-player round events in join order
    pub fn step_events(&mut self) {
        for player in self.registry.living_players() {
            // Earlier events this round may have eliminated the player
            if !self.registry.is_alive(player) {
                continue;
            }
            if !self.selector.roll(event_consts::EVENT_CHANCE) {
                continue;
            }
            let kind = self.selector.pick_event();
            if let Err(error) = self.dispatch_event(player, kind) {
                warn!(player = %player, %error, "event handler failed");
            }
        }
    }

    /// Pipeline steps 4 and 5: effect tick, then termination check.
    /// Returns true once the game has ended.
    pub fn step_tick_and_check(&mut self) -> bool {
        for player in self.registry.tick_effects() {
            self.handle_elimination(player, None);
        }
        self.check_termination()
    }

    fn check_termination(&mut self) -> bool {
        if self.phase != ArenaPhase::Active {
            return true;
        }
        if self.registry.living_count() < 2 {
            self.finalize();
            return true;
        }
        false
    }

    fn dispatch_event(&mut self, player: PlayerId, kind: EventKind) -> Result<(), ActionError> {
        match kind {
            EventKind::Duel => self.event_duel(player),
            EventKind::Ambush => self.event_ambush(player),
            EventKind::Blessing => self.event_blessing(player),
            EventKind::Treasure => self.event_treasure(player),
            EventKind::Betrayal => self.event_betrayal(player),
            EventKind::Quest => self.event_quest(player),
        }
    }

    fn event_duel(&mut self, player: PlayerId) -> Result<(), ActionError> {
        let Some(opponent) = self.selector.pick_opponent(&self.registry, player) else {
            return Ok(());
        };
        let with_special = self.registry.charges(player) > 0
            && self.selector.roll(event_consts::DUEL_SPECIAL_CHANCE);
        if with_special {
            let outcome =
                combat::resolve_special(&mut self.registry, &mut self.selector, player, opponent)?;
            self.emit_special(player, &outcome);
            self.resolve_special_consequences(player, outcome);
        } else {
            let outcome =
                combat::resolve_attack(&mut self.registry, &mut self.selector, player, opponent)?;
            self.notifier.emit(Notification::CombatResolved(outcome));
            if outcome.defender_eliminated {
                self.handle_elimination(opponent, Some(player));
            }
            if outcome.attacker_eliminated {
                self.handle_elimination(player, Some(opponent));
            }
        }
        Ok(())
    }

    fn event_ambush(&mut self, player: PlayerId) -> Result<(), ActionError> {
        let Some(ambusher) = self.selector.pick_opponent(&self.registry, player) else {
            return Ok(());
        };
        let class = self.registry.class(player).ok_or(ActionError::UnknownPlayer)?;

        // Rogues sometimes sense the ambush and strike first
        if class == Class::Rogue && self.selector.roll(event_consts::ROGUE_COUNTER_CHANCE) {
            self.notifier.emit(Notification::EventOccurred {
                player,
                kind: EventKind::Ambush,
                description: "senses the ambush and counterattacks".to_string(),
            });
            let outcome =
                combat::resolve_attack(&mut self.registry, &mut self.selector, player, ambusher)?;
            self.notifier.emit(Notification::CombatResolved(outcome));
            if outcome.defender_eliminated {
                self.handle_elimination(ambusher, Some(player));
            }
            if outcome.attacker_eliminated {
                self.handle_elimination(player, Some(ambusher));
            }
            return Ok(());
        }

        let damage = (combat_consts::BASE_DAMAGE
            * event_consts::AMBUSH_DAMAGE_MULT
            * class.spec().event_damage_mod) as u32;
        let health = self.registry.apply_damage(player, damage).unwrap_or(0);
        self.notifier.emit(Notification::EventOccurred {
            player,
            kind: EventKind::Ambush,
            description: format!("is ambushed for {damage} damage"),
        });
        if health == 0 {
            self.registry.record_kill(ambusher);
            self.handle_elimination(player, Some(ambusher));
        }
        Ok(())
    }

    fn event_blessing(&mut self, player: PlayerId) -> Result<(), ActionError> {
        let class = self.registry.class(player).ok_or(ActionError::UnknownPlayer)?;
        let heal = (combat_consts::HEAL_AMOUNT as f32 * class.spec().event_heal_mod) as u32;
        self.registry.heal(player, heal);
        self.registry.restore_energy(player, event_consts::BLESSING_ENERGY);
        // Mages draw a spent charge back from a blessing
        if class == Class::Mage {
            self.registry.restore_charge(player);
        }
        self.notifier.emit(Notification::EventOccurred {
            player,
            kind: EventKind::Blessing,
            description: format!("is blessed, recovering {heal} health"),
        });
        Ok(())
    }

    fn event_treasure(&mut self, player: PlayerId) -> Result<(), ActionError> {
        let class = self.registry.class(player).ok_or(ActionError::UnknownPlayer)?;
        let mut pool = classes::treasure_pool(class);
        let item = pool.swap_remove(self.selector.choose_index(pool.len()));
        self.notifier.emit(Notification::EventOccurred {
            player,
            kind: EventKind::Treasure,
            description: format!("finds {}", item.name),
        });
        self.registry.grant_item(player, item);
        Ok(())
    }

    /// An allied partner turns on the player, or the pact simply frays.
    /// Players without an alliance shrug the event off.
    fn event_betrayal(&mut self, player: PlayerId) -> Result<(), ActionError> {
        let Some(alliance) = self.alliances.alliance_of(player) else {
            return Ok(());
        };
        let alliance_id = alliance.id;
        let members = alliance.members;
        let partner = alliance.partner_of(player).ok_or(ActionError::NotAllied)?;

        self.alliances.dissolve(alliance_id);
        if self.registry.is_alive(partner) && self.selector.roll(event_consts::TURNCOAT_CHANCE) {
            self.notifier.emit(Notification::AllianceBetrayed {
                alliance: alliance_id,
                betrayer: partner,
                victim: player,
            });
            let outcome =
                combat::resolve_attack(&mut self.registry, &mut self.selector, partner, player)?;
            self.notifier.emit(Notification::CombatResolved(outcome));
            if outcome.defender_eliminated {
                self.handle_elimination(player, Some(partner));
            }
            if outcome.attacker_eliminated {
                self.handle_elimination(partner, Some(player));
            }
        } else {
            self.notifier.emit(Notification::AllianceBroken {
                alliance: alliance_id,
                members,
            });
        }
        Ok(())
    }

    fn event_quest(&mut self, player: PlayerId) -> Result<(), ActionError> {
        let class = self.registry.class(player).ok_or(ActionError::UnknownPlayer)?;
        let heal = (event_consts::QUEST_HEALTH as f32 * class.spec().event_heal_mod) as u32;
        self.registry.heal(player, heal);
        self.registry.restore_energy(player, event_consts::QUEST_ENERGY);
        self.notifier.emit(Notification::EventOccurred {
            player,
            kind: EventKind::Quest,
            description: format!("completes a quest for {heal} health"),
        });
        Ok(())
    }

    /// Use the consumable at `index`; gateway entry point
    pub fn use_item(&mut self, player: PlayerId, index: usize) -> Result<String, ActionError> {
        if self.phase != ArenaPhase::Active {
            return Err(ActionError::InvalidActorState);
        }
        let report = abilities::use_item(&mut self.registry, &mut self.selector, player, index)?;
        self.notifier.emit(Notification::ItemUsed {
            player,
            item: report.item_name.clone(),
            description: report.description.clone(),
        });
        for id in &report.eliminated {
            self.handle_elimination(*id, Some(player));
        }
        self.check_termination();
        Ok(report.description)
    }

    /// Fire the class special at `target`; gateway entry point
    pub fn use_special(
        &mut self,
        player: PlayerId,
        target: PlayerId,
    ) -> Result<String, ActionError> {
        if self.phase != ArenaPhase::Active {
            return Err(ActionError::InvalidActorState);
        }
        let outcome =
            combat::resolve_special(&mut self.registry, &mut self.selector, player, target)?;
        self.emit_special(player, &outcome);
        let description = outcome.description.clone();
        self.resolve_special_consequences(player, outcome);
        self.check_termination();
        Ok(description)
    }

    /// Form an alliance between two living players; gateway entry point
    pub fn propose_alliance(
        &mut self,
        player: PlayerId,
        target: PlayerId,
    ) -> Result<AllianceId, ActionError> {
        if self.phase != ArenaPhase::Active {
            return Err(ActionError::InvalidActorState);
        }
        let id = self
            .alliances
            .propose(&self.registry, player, target, self.round)?;
        let alliance = self.alliances.get(id).ok_or(ActionError::NotAllied)?;
        self.notifier.emit(Notification::AllianceFormed {
            alliance: id,
            members: alliance.members,
            synergy: alliance.synergy_type,
        });
        Ok(id)
    }

    /// Voluntary break: no combat, the pact just ends; gateway entry point
    pub fn break_alliance(&mut self, player: PlayerId) -> Result<(), ActionError> {
        if self.phase != ArenaPhase::Active {
            return Err(ActionError::InvalidActorState);
        }
        if !self.registry.is_alive(player) {
            return Err(ActionError::InvalidActorState);
        }
        let alliance = self
            .alliances
            .remove_player(player)
            .ok_or(ActionError::NotAllied)?;
        self.notifier.emit(Notification::AllianceBroken {
            alliance: alliance.id,
            members: alliance.members,
        });
        Ok(())
    }

    fn emit_special(&mut self, player: PlayerId, outcome: &combat::SpecialOutcome) {
        let class = self.registry.class(player).unwrap_or_default();
        self.notifier.emit(Notification::SpecialUsed {
            player,
            class,
            description: outcome.description.clone(),
        });
    }

    fn resolve_special_consequences(&mut self, player: PlayerId, outcome: combat::SpecialOutcome) {
        for id in outcome.eliminated {
            self.handle_elimination(id, Some(player));
        }
        if outcome.attacker_eliminated {
            self.handle_elimination(player, None);
        }
    }

    /// Elimination consequences: notification and instant alliance teardown.
    /// Kill credit is already recorded by the combat layer.
    fn handle_elimination(&mut self, player: PlayerId, by: Option<PlayerId>) {
        info!(player = %player, "player eliminated");
        self.notifier.emit(Notification::PlayerEliminated { player, by });
        if let Some(alliance) = self.alliances.remove_player(player) {
            self.notifier.emit(Notification::AllianceBroken {
                alliance: alliance.id,
                members: alliance.members,
            });
        }
    }

    /// Winner is the sole survivor, or nobody on a forced end with several
    /// players still standing
    fn finalize(&mut self) {
        if self.phase == ArenaPhase::Ended {
            return;
        }
        self.phase = ArenaPhase::Ended;
        let living = self.registry.living_players();
        self.winner = if living.len() == 1 {
            living.first().copied()
        } else {
            None
        };
        info!(winner = ?self.winner, rounds = self.round, "game ended");
        self.notifier.emit(Notification::GameEnded {
            winner: self.winner,
            rounds: self.round,
        });
    }

    /// Idempotent immediate end
    pub fn force_end(&mut self, reason: &str) {
        if self.phase == ArenaPhase::Ended {
            return;
        }
        warn!(reason, "game force-ended");
        self.finalize();
    }

    #[cfg(test)]
    pub(crate) fn activate_for_test(&mut self) {
        self.materialize_roster();
        self.phase = ArenaPhase::Active;
        self.round = 1;
    }

    #[cfg(test)]
    pub(crate) fn registry_mut(&mut self) -> &mut PlayerRegistry {
        &mut self.registry
    }
}

/// Shared-state handle to one running arena
#[derive(Clone)]
pub struct Arena {
    core: Arc<RwLock<ArenaCore>>,
    cancel: Arc<Notify>,
}

impl Arena {
    pub fn new(config: ArenaConfig, notifier: Notifier) -> Self {
        Self {
            core: Arc::new(RwLock::new(ArenaCore::new(config, notifier))),
            cancel: Arc::new(Notify::new()),
        }
    }

    /// Shared core for the action gateway
    pub fn core(&self) -> Arc<RwLock<ArenaCore>> {
        self.core.clone()
    }

    pub async fn register(&self, id: PlayerId) -> Result<(), StartError> {
        self.core.write().await.register(id)
    }

    pub async fn choose_class(&self, id: PlayerId, class: Class) -> Result<(), ActionError> {
        self.core.write().await.choose_class(id, class)
    }

    /// Start the game and spawn the round loop
    pub async fn start(&self) -> Result<(), StartError> {
        let round_window = {
            let mut core = self.core.write().await;
            core.start()?;
            core.config().round_window
        };
        start_round_loop(self.core.clone(), self.cancel.clone(), round_window);
        Ok(())
    }

    /// Wait for everyone to lock in a class (bounded by the configured
    /// selection timeout), then start; stragglers get the default class
    pub async fn start_when_ready(&self) -> Result<(), StartError> {
        let timeout = self.core.read().await.config().class_select_timeout;
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.core.read().await.all_classes_chosen() {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                debug!("class selection timed out, starting with defaults");
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        self.start().await
    }

    pub async fn force_end(&self, reason: &str) {
        self.core.write().await.force_end(reason);
        self.cancel.notify_waiters();
    }

    pub async fn phase(&self) -> ArenaPhase {
        self.core.read().await.phase()
    }

    pub async fn round(&self) -> u32 {
        self.core.read().await.round()
    }

    pub async fn winner(&self) -> Option<PlayerId> {
        self.core.read().await.winner()
    }

    pub async fn snapshot(&self, id: PlayerId) -> Option<Player> {
        self.core.read().await.snapshot(id)
    }
}

/// Start the round loop background task.
///
/// The write lock is taken once per pipeline step, never across the window
/// sleep, so gateway actions and cancellation interleave between steps.
pub fn start_round_loop(core: Arc<RwLock<ArenaCore>>, cancel: Arc<Notify>, window: Duration) {
    tokio::spawn(async move {
        loop {
            if core.read().await.phase() != ArenaPhase::Active {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(window) => {}
                _ = cancel.notified() => break,
            }

            {
                let mut guard = core.write().await;
                if guard.phase() != ArenaPhase::Active {
                    break;
                }
                guard.begin_round();
                guard.step_synergy();
            }
            {
                let mut guard = core.write().await;
                if guard.phase() != ArenaPhase::Active {
                    break;
                }
                guard.step_betrayals();
            }
            {
                let mut guard = core.write().await;
                if guard.phase() != ArenaPhase::Active {
                    break;
                }
                guard.step_events();
            }
            {
                let mut guard = core.write().await;
                if guard.phase() != ArenaPhase::Active {
                    break;
                }
                if guard.step_tick_and_check() {
                    break;
                }
            }
        }
        debug!("round loop exited");
    });
}
