//! Client → server messages.
//!
//! Each [`ClientMessage`] encodes to one ready-to-send frame whose buffer
//! is sized exactly from [`ClientMessage::body_len`]. Sending is
//! fire-and-forget: nothing here tracks replies.

use serde::{Deserialize, Serialize};

use crate::codec::{Reader, Wire, Writer};
use crate::{ClientOpcode, Color, PlayerId, ProtocolError, SettingChange, SettingsPatch, TeamId};

/// JOIN body: who we are (or were, when rejoining).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// A previously assigned id to reclaim. `None` asks for a new one.
    pub rejoin_id: Option<PlayerId>,
    pub rejoin_team_id: Option<TeamId>,
    pub color: Color,
    pub alive: bool,
    pub name: String,
}

/// Every message a client can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    TeamCreate { name: String },
    TeamRemove { team_id: TeamId },
    TeamNameUpdate { team_id: TeamId, name: String },
    PlayerNameUpdate { name: String },
    PlayerColorUpdate { color: Color },
    /// Moves any player (usually ourselves) to a team, or out of all teams.
    MoveTeams {
        player_id: PlayerId,
        team_id: Option<TeamId>,
    },
    SettingsUpdate(SettingChange),
    Join(JoinRequest),
    StartGame,
    TileClick { x: i32, y: i32 },
    TileFlag { x: i32, y: i32, is_pencil: bool },
    CursorMove { x: f32, y: f32 },
    ResetBoard,
}

impl ClientMessage {
    /// Expands a partial settings update into one message per set field.
    ///
    /// # Errors
    /// [`ProtocolError::EmptySettingsPatch`] if the patch sets nothing.
    pub fn settings(patch: SettingsPatch) -> Result<Vec<Self>, ProtocolError> {
        Ok(patch
            .into_changes()?
            .into_iter()
            .map(Self::SettingsUpdate)
            .collect())
    }

    /// The opcode this message is sent under.
    pub fn opcode(&self) -> ClientOpcode {
        match self {
            Self::TeamCreate { .. } => ClientOpcode::TeamCreate,
            Self::TeamRemove { .. } => ClientOpcode::TeamRemove,
            Self::TeamNameUpdate { .. } => ClientOpcode::TeamNameUpdate,
            Self::PlayerNameUpdate { .. } => ClientOpcode::PlayerNameUpdate,
            Self::PlayerColorUpdate { .. } => ClientOpcode::PlayerColorUpdate,
            Self::MoveTeams { .. } => ClientOpcode::MoveTeams,
            Self::SettingsUpdate(_) => ClientOpcode::SettingsUpdate,
            Self::Join(_) => ClientOpcode::Join,
            Self::StartGame => ClientOpcode::StartGame,
            Self::TileClick { .. } => ClientOpcode::TileClick,
            Self::TileFlag { .. } => ClientOpcode::TileFlag,
            Self::CursorMove { .. } => ClientOpcode::CursorMove,
            Self::ResetBoard => ClientOpcode::ResetBoard,
        }
    }

    /// Wire width of the body (everything after the opcode byte).
    pub fn body_len(&self) -> usize {
        match self {
            Self::TeamCreate { name } | Self::PlayerNameUpdate { name } => Writer::string_len(name),
            Self::TeamRemove { .. } => 4,
            Self::TeamNameUpdate { name, .. } => 4 + Writer::string_len(name),
            Self::PlayerColorUpdate { color } => color.wire_len(),
            Self::MoveTeams { .. } => 8,
            Self::SettingsUpdate(change) => 4 + change.payload_len(),
            Self::Join(join) => 4 + 4 + join.color.wire_len() + 1 + Writer::string_len(&join.name),
            Self::StartGame | Self::ResetBoard => 0,
            Self::TileClick { .. } => 8,
            Self::TileFlag { .. } => 9,
            Self::CursorMove { .. } => 8,
        }
    }

    /// Encodes the message into an exactly sized frame.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut w = Writer::with_len(1 + self.body_len());
        w.byte(self.opcode().byte())?;
        match self {
            Self::TeamCreate { name } | Self::PlayerNameUpdate { name } => w.string(name)?,
            Self::TeamRemove { team_id } => w.i32(team_id.0)?,
            Self::TeamNameUpdate { team_id, name } => {
                w.i32(team_id.0)?;
                w.string(name)?;
            }
            Self::PlayerColorUpdate { color } => w.write(color)?,
            Self::MoveTeams { player_id, team_id } => {
                w.i32(player_id.0)?;
                w.i32(TeamId::to_wire(*team_id))?;
            }
            Self::SettingsUpdate(change) => {
                w.i32(change.code())?;
                change.write_payload(&mut w)?;
            }
            Self::Join(join) => {
                w.i32(join.rejoin_id.map_or(0, |id| id.0))?;
                w.i32(TeamId::to_wire(join.rejoin_team_id))?;
                w.write(&join.color)?;
                w.bool(join.alive)?;
                w.string(&join.name)?;
            }
            Self::StartGame | Self::ResetBoard => {}
            Self::TileClick { x, y } => {
                w.i32(*x)?;
                w.i32(*y)?;
            }
            Self::TileFlag { x, y, is_pencil } => {
                w.i32(*x)?;
                w.i32(*y)?;
                w.bool(*is_pencil)?;
            }
            Self::CursorMove { x, y } => {
                w.f32(*x)?;
                w.f32(*y)?;
            }
        }
        w.finish()
    }

    /// Decodes a client frame. Used by test servers and tooling.
    ///
    /// Returns `Ok(None)` for an empty frame or unknown opcode.
    pub fn decode(frame: &[u8]) -> Result<Option<Self>, ProtocolError> {
        let Some((&op, body)) = frame.split_first() else {
            return Ok(None);
        };
        let Some(opcode) = ClientOpcode::from_byte(op) else {
            return Ok(None);
        };
        let r = &mut Reader::new(body);
        Ok(Some(match opcode {
            ClientOpcode::TeamCreate => Self::TeamCreate { name: r.string()? },
            ClientOpcode::TeamRemove => Self::TeamRemove {
                team_id: TeamId(r.i32()?),
            },
            ClientOpcode::TeamNameUpdate => Self::TeamNameUpdate {
                team_id: TeamId(r.i32()?),
                name: r.string()?,
            },
            ClientOpcode::PlayerNameUpdate => Self::PlayerNameUpdate { name: r.string()? },
            ClientOpcode::PlayerColorUpdate => Self::PlayerColorUpdate { color: r.read()? },
            ClientOpcode::MoveTeams => Self::MoveTeams {
                player_id: PlayerId(r.i32()?),
                team_id: TeamId::from_wire(r.i32()?),
            },
            ClientOpcode::SettingsUpdate => {
                let code = r.i32()?;
                Self::SettingsUpdate(SettingChange::read_payload(code, r)?)
            }
            ClientOpcode::Join => Self::Join(JoinRequest {
                rejoin_id: Some(r.i32()?).filter(|id| *id != 0).map(PlayerId),
                rejoin_team_id: TeamId::from_wire(r.i32()?),
                color: r.read()?,
                alive: r.bool()?,
                name: r.string()?,
            }),
            ClientOpcode::StartGame => Self::StartGame,
            ClientOpcode::TileClick => Self::TileClick {
                x: r.i32()?,
                y: r.i32()?,
            },
            ClientOpcode::TileFlag => Self::TileFlag {
                x: r.i32()?,
                y: r.i32()?,
                is_pencil: r.bool()?,
            },
            ClientOpcode::CursorMove => Self::CursorMove {
                x: r.f32()?,
                y: r.f32()?,
            },
            ClientOpcode::ResetBoard => Self::ResetBoard,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_wire_layout() {
        let msg = ClientMessage::Join(JoinRequest {
            rejoin_id: Some(PlayerId(9)),
            rejoin_team_id: None,
            color: Color::new(10, 20, 30),
            alive: true,
            name: "Al".into(),
        });
        let frame = msg.encode().unwrap();
        assert_eq!(
            frame,
            vec![50, 0, 0, 0, 9, 0, 0, 0, 0, 10, 20, 30, 1, 0, 2, b'A', b'l']
        );
        assert_eq!(ClientMessage::decode(&frame).unwrap(), Some(msg));
    }

    #[test]
    fn test_move_teams_to_no_team_writes_zero() {
        let msg = ClientMessage::MoveTeams {
            player_id: PlayerId(4),
            team_id: None,
        };
        assert_eq!(msg.encode().unwrap(), vec![5, 0, 0, 0, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn test_empty_bodies_are_one_byte() {
        assert_eq!(ClientMessage::StartGame.encode().unwrap(), vec![53]);
        assert_eq!(ClientMessage::ResetBoard.encode().unwrap(), vec![60]);
    }

    #[test]
    fn test_settings_patch_expands_to_frames() {
        let msgs = ClientMessage::settings(SettingsPatch {
            mine_count: Some(40),
            sudden_death: Some(true),
            ..SettingsPatch::default()
        })
        .unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].encode().unwrap(), vec![6, 0, 0, 0, 2, 1]);
        assert_eq!(msgs[1].encode().unwrap(), vec![6, 0, 0, 0, 4, 0, 0, 0, 40]);
    }

    #[test]
    fn test_empty_settings_patch_is_rejected_before_encoding() {
        assert_eq!(
            ClientMessage::settings(SettingsPatch::default()),
            Err(ProtocolError::EmptySettingsPatch)
        );
    }

    #[test]
    fn test_every_message_round_trips() {
        let msgs = vec![
            ClientMessage::TeamCreate { name: String::new() },
            ClientMessage::TeamRemove { team_id: TeamId(-2) },
            ClientMessage::TeamNameUpdate {
                team_id: TeamId(3),
                name: "blue".into(),
            },
            ClientMessage::PlayerNameUpdate { name: "Zoë".into() },
            ClientMessage::PlayerColorUpdate {
                color: Color::new(0, 255, 128),
            },
            ClientMessage::MoveTeams {
                player_id: PlayerId(1),
                team_id: Some(TeamId(2)),
            },
            ClientMessage::SettingsUpdate(SettingChange::NoGuessing(false)),
            ClientMessage::TileClick { x: 0, y: 15 },
            ClientMessage::TileFlag {
                x: 29,
                y: 0,
                is_pencil: true,
            },
            ClientMessage::CursorMove { x: 3.5, y: -0.25 },
        ];
        for msg in msgs {
            let frame = msg.encode().unwrap();
            assert_eq!(frame.len(), 1 + msg.body_len());
            assert_eq!(ClientMessage::decode(&frame).unwrap(), Some(msg));
        }
    }
}
