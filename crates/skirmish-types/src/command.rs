//! The command boundary: typed intents the application layer sends into the
//! scheduler, translated from whatever UI gesture produced them.

use serde::{Deserialize, Serialize};

use crate::ids::CardId;
use crate::registry::AgentId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    PlayCard {
        card_id: CardId,
        time_start: Option<f32>,
        target: Option<AgentId>,
        modifier_of: Option<usize>,
    },
    CancelCard {
        card_id: CardId,
    },
    CommitAdd {
        card_id: CardId,
    },
    CommitWithdraw {
        play_index: usize,
    },
    CommitStack {
        play_index: usize,
        card_id: CardId,
    },
    CommitDone,
    SetPrimaryTarget {
        agent_id: AgentId,
    },
    EndTurn,
}

/// Errors surfaced at the command boundary. No world mutation occurs when
/// one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("command not valid in the current phase")]
    WrongPhase,
    #[error("insufficient stamina")]
    InsufficientStamina,
    #[error("insufficient focus")]
    InsufficientFocus,
    #[error("card is not playable from its current source")]
    InvalidPlaySource,
    #[error("card is not playable in combat")]
    NotCombatPlayable,
    #[error("requested channels conflict with an existing timeline slot")]
    ChannelConflict,
    #[error("target is out of the technique's reach band")]
    OutOfRange,
    #[error("card is not in hand")]
    CardNotInHand,
    #[error("no valid target resolved for this command")]
    InvalidTarget,
    #[error("timeline or resource capacity exceeded")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_round_trips_through_json() {
        let cmd = Command::SetPrimaryTarget { agent_id: AgentId::new(2, 0) };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn command_error_has_display() {
        assert_eq!(CommandError::WrongPhase.to_string(), "command not valid in the current phase");
    }
}
