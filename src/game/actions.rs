//! External action intake.
//!
//! Host-submitted requests go through the same lock as the round loop, so
//! every action lands atomically between pipeline steps.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::game::arena::ArenaCore;
use crate::game::error::ActionError;
use crate::game::state::{ArenaPhase, Class, PlayerId};

/// What a player is asking to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Lock in a class; only valid before the game starts
    ChooseClass(Class),
    /// Use the consumable at this inventory index
    UseItem { index: usize },
    /// Fire the class special ability at a target
    UseSpecial { target: PlayerId },
    /// Offer an alliance to a target
    ProposeAlliance { target: PlayerId },
    /// Leave the current alliance (no combat)
    BreakAlliance,
}

/// One externally submitted request
#[derive(Debug, Clone, Copy)]
pub struct ActionRequest {
    pub player: PlayerId,
    pub kind: ActionKind,
}

/// Serialized intake for player actions against one arena
#[derive(Clone)]
pub struct ActionGateway {
    core: Arc<RwLock<ArenaCore>>,
}

impl ActionGateway {
    pub fn new(core: Arc<RwLock<ArenaCore>>) -> Self {
        Self { core }
    }

    /// Validate and apply one request, returning a short outcome summary.
    ///
    /// A dead player or a non-Active arena is rejected with
    /// `InvalidActorState`; nothing is queued for later.
    pub async fn submit(&self, request: ActionRequest) -> Result<String, ActionError> {
        debug!(player = %request.player, kind = ?request.kind, "action submitted");
        let mut core = self.core.write().await;

        if let ActionKind::ChooseClass(class) = request.kind {
            core.choose_class(request.player, class)?;
            return Ok(format!("class locked in: {}", class.name()));
        }

        if core.phase() != ArenaPhase::Active || !core.living_players().contains(&request.player) {
            return Err(ActionError::InvalidActorState);
        }

        match request.kind {
            ActionKind::ChooseClass(_) => unreachable!("handled above"),
            ActionKind::UseItem { index } => core.use_item(request.player, index),
            ActionKind::UseSpecial { target } => core.use_special(request.player, target),
            ActionKind::ProposeAlliance { target } => core
                .propose_alliance(request.player, target)
                .map(|_| "alliance formed".to_string()),
            ActionKind::BreakAlliance => core
                .break_alliance(request.player)
                .map(|_| "alliance dissolved".to_string()),
        }
    }
}
