//! Best-effort notification fan-out to the embedding host.
//!
//! The simulation never blocks on its audience: if the host dropped the
//! receiver, sends are logged at debug and discarded.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::game::alliance::SynergyType;
use crate::game::combat::CombatOutcome;
use crate::game::events::EventKind;
use crate::game::state::{AllianceId, Class, PlayerId};

/// Everything the host can observe about a running game
#[derive(Debug, Clone)]
pub enum Notification {
    RoundStarted {
        round: u32,
        living: usize,
    },
    /// A round event resolved for one player
    EventOccurred {
        player: PlayerId,
        kind: EventKind,
        description: String,
    },
    CombatResolved(CombatOutcome),
    PlayerEliminated {
        player: PlayerId,
        /// Attacker credited with the elimination, if any
        by: Option<PlayerId>,
    },
    AllianceFormed {
        alliance: AllianceId,
        members: [PlayerId; 2],
        synergy: SynergyType,
    },
    AllianceBroken {
        alliance: AllianceId,
        members: [PlayerId; 2],
    },
    AllianceBetrayed {
        alliance: AllianceId,
        betrayer: PlayerId,
        victim: PlayerId,
    },
    ItemUsed {
        player: PlayerId,
        item: String,
        description: String,
    },
    SpecialUsed {
        player: PlayerId,
        class: Class,
        description: String,
    },
    GameEnded {
        winner: Option<PlayerId>,
        rounds: u32,
    },
}

/// Handle the arena uses to emit notifications
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<UnboundedSender<Notification>>,
}

impl Notifier {
    pub fn new(tx: UnboundedSender<Notification>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A notifier that discards everything (headless games, tests)
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, notification: Notification) {
        if let Some(tx) = &self.tx {
            if tx.send(notification).is_err() {
                debug!("notification receiver dropped; discarding");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_emit_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let notifier = Notifier::new(tx);
        notifier.emit(Notification::RoundStarted { round: 1, living: 4 });
    }

    #[test]
    fn test_disabled_notifier_discards() {
        let notifier = Notifier::disabled();
        notifier.emit(Notification::PlayerEliminated {
            player: Uuid::new_v4(),
            by: None,
        });
    }

    #[test]
    fn test_emit_delivers_in_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let notifier = Notifier::new(tx);
        notifier.emit(Notification::RoundStarted { round: 1, living: 2 });
        notifier.emit(Notification::RoundStarted { round: 2, living: 2 });

        assert!(matches!(
            rx.try_recv().unwrap(),
            Notification::RoundStarted { round: 1, .. }
        ));
        assert!(matches!(
            rx.try_recv().unwrap(),
            Notification::RoundStarted { round: 2, .. }
        ));
    }
}
