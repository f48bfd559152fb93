//! Server → client messages.
//!
//! [`ServerMessage`] is the closed set of everything the server can tell
//! a client. Decoding is context-free: every length the body needs
//! (board sizes, record counts) travels inside the body itself, so a frame
//! is turned into a fully owned value before any state is touched.
//!
//! The encode half exists so tests and tooling can produce frames that
//! match what a real server sends.

use serde::{Deserialize, Serialize};

use crate::codec::{Reader, Wire, Writer};
use crate::types::cell_count;
use crate::{
    GameSettings, PlayerId, PlayerRecord, ProtocolError, ServerOpcode, SettingChange, TeamId,
    TeamRecord,
};

// ---------------------------------------------------------------------------
// Bodies with more than a handful of fields
// ---------------------------------------------------------------------------

/// One entry of a CURSOR_UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub player_id: PlayerId,
    pub x: f32,
    pub y: f32,
}

/// TILE_REVEAL body.
///
/// `tiles` is the team's authoritative view of a `width × height` board,
/// row-major, with the unrevealed placeholder where nothing is disclosed.
/// `(x, y)` is the clicked cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileReveal {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<u8>,
    pub time: i64,
}

/// A team's board arrays as carried by a resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressBlock {
    pub board: Vec<u8>,
    pub flags: Vec<i32>,
}

/// The running-game part of a LOBBY_STATE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBlock {
    pub settings: GameSettings,
    pub start_time: i64,
    pub start_x: i32,
    pub start_y: i32,
    /// Teams that already finished, with their finish time.
    pub finishes: Vec<(TeamId, i64)>,
    /// Progress blocks in server order. The count already reflects what
    /// the receiving viewer is allowed to see.
    pub progress: Vec<ProgressBlock>,
}

/// LOBBY_STATE body: a full resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyState {
    pub settings: GameSettings,
    pub self_id: PlayerId,
    pub players: Vec<PlayerRecord>,
    pub teams: Vec<TeamRecord>,
    pub game: Option<GameBlock>,
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Every message the server can send, decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    TeamCreate {
        team_id: TeamId,
        by: PlayerId,
        name: String,
    },
    TeamRemove {
        team_id: TeamId,
        by: PlayerId,
    },
    TeamNameUpdate {
        team_id: TeamId,
        by: PlayerId,
        name: String,
    },
    PlayerCreate(PlayerRecord),
    PlayerRemove {
        player_id: PlayerId,
    },
    PlayerNameUpdate {
        player_id: PlayerId,
        name: String,
    },
    PlayerColorUpdate {
        player_id: PlayerId,
        color: crate::Color,
    },
    PlayerTeamUpdate {
        player_id: PlayerId,
        team_id: Option<TeamId>,
    },
    SettingsUpdate {
        from: PlayerId,
        change: SettingChange,
    },
    LobbyState(LobbyState),
    GameStart {
        from: PlayerId,
        start_time: i64,
        start_x: i32,
        start_y: i32,
        settings: GameSettings,
    },
    TileReveal(TileReveal),
    TileFlag {
        player_id: PlayerId,
        team_id: TeamId,
        x: i32,
        y: i32,
        is_added: bool,
        is_pencil: bool,
    },
    CursorUpdate(Vec<CursorPosition>),
    TeamFinish {
        team_id: TeamId,
        time: i64,
    },
    PlayerLose {
        player_id: PlayerId,
        team_id: TeamId,
        time: i64,
    },
    TeamLose {
        click_player_id: PlayerId,
        team_id: TeamId,
        time: i64,
    },
    BoardClear(Vec<PlayerRecord>),
}

fn read_count(reader: &mut Reader<'_>) -> Result<usize, ProtocolError> {
    let raw = reader.i32()?;
    usize::try_from(raw).map_err(|_| ProtocolError::NegativeCount(raw))
}

fn read_many<T: Wire>(reader: &mut Reader<'_>, count: usize) -> Result<Vec<T>, ProtocolError> {
    (0..count).map(|_| T::read(reader)).collect()
}

fn count_to_wire(len: usize) -> Result<i32, ProtocolError> {
    i32::try_from(len).map_err(|_| ProtocolError::NegativeCount(i32::MAX))
}

impl ServerMessage {
    /// Decodes a whole frame.
    ///
    /// Returns `Ok(None)` for an empty frame or an opcode this client
    /// doesn't know. Trailing bytes after the body are ignored here; the
    /// router reports them.
    pub fn decode(frame: &[u8]) -> Result<Option<Self>, ProtocolError> {
        let Some((&op, body)) = frame.split_first() else {
            return Ok(None);
        };
        let Some(opcode) = ServerOpcode::from_byte(op) else {
            return Ok(None);
        };
        Self::read_body(opcode, &mut Reader::new(body)).map(Some)
    }

    /// Reads the body that follows `opcode`.
    pub fn read_body(opcode: ServerOpcode, r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(match opcode {
            ServerOpcode::TeamCreate => Self::TeamCreate {
                team_id: TeamId(r.i32()?),
                by: PlayerId(r.i32()?),
                name: r.string()?,
            },
            ServerOpcode::TeamRemove => Self::TeamRemove {
                team_id: TeamId(r.i32()?),
                by: PlayerId(r.i32()?),
            },
            ServerOpcode::TeamNameUpdate => Self::TeamNameUpdate {
                team_id: TeamId(r.i32()?),
                by: PlayerId(r.i32()?),
                name: r.string()?,
            },
            ServerOpcode::PlayerCreate => Self::PlayerCreate(r.read()?),
            ServerOpcode::PlayerRemove => Self::PlayerRemove {
                player_id: PlayerId(r.i32()?),
            },
            ServerOpcode::PlayerNameUpdate => Self::PlayerNameUpdate {
                player_id: PlayerId(r.i32()?),
                name: r.string()?,
            },
            ServerOpcode::PlayerColorUpdate => Self::PlayerColorUpdate {
                player_id: PlayerId(r.i32()?),
                color: r.read()?,
            },
            ServerOpcode::PlayerTeamUpdate => Self::PlayerTeamUpdate {
                player_id: PlayerId(r.i32()?),
                team_id: TeamId::from_wire(r.i32()?),
            },
            ServerOpcode::SettingsUpdate => {
                let code = r.i32()?;
                let from = PlayerId(r.i32()?);
                Self::SettingsUpdate {
                    from,
                    change: SettingChange::read_payload(code, r)?,
                }
            }
            ServerOpcode::LobbyState => Self::LobbyState(read_lobby_state(r)?),
            ServerOpcode::GameStart => Self::GameStart {
                from: PlayerId(r.i32()?),
                start_time: r.i64()?,
                start_x: r.i32()?,
                start_y: r.i32()?,
                settings: r.read()?,
            },
            ServerOpcode::TileReveal => {
                let player_id = PlayerId(r.i32()?);
                let team_id = TeamId(r.i32()?);
                let x = r.i32()?;
                let y = r.i32()?;
                let width = r.i32()?;
                let height = r.i32()?;
                let tiles = r.bytes(cell_count(width, height)?)?;
                Self::TileReveal(TileReveal {
                    player_id,
                    team_id,
                    x,
                    y,
                    width,
                    height,
                    tiles,
                    time: r.i64()?,
                })
            }
            ServerOpcode::TileFlag => Self::TileFlag {
                player_id: PlayerId(r.i32()?),
                team_id: TeamId(r.i32()?),
                x: r.i32()?,
                y: r.i32()?,
                is_added: r.bool()?,
                is_pencil: r.bool()?,
            },
            ServerOpcode::CursorUpdate => {
                let count = read_count(r)?;
                let cursors = (0..count)
                    .map(|_| -> Result<_, ProtocolError> {
                        Ok(CursorPosition {
                            player_id: PlayerId(r.i32()?),
                            x: r.f32()?,
                            y: r.f32()?,
                        })
                    })
                    .collect::<Result<_, ProtocolError>>()?;
                Self::CursorUpdate(cursors)
            }
            ServerOpcode::TeamFinish => Self::TeamFinish {
                team_id: TeamId(r.i32()?),
                time: r.i64()?,
            },
            ServerOpcode::PlayerLose => Self::PlayerLose {
                player_id: PlayerId(r.i32()?),
                team_id: TeamId(r.i32()?),
                time: r.i64()?,
            },
            ServerOpcode::TeamLose => Self::TeamLose {
                click_player_id: PlayerId(r.i32()?),
                team_id: TeamId(r.i32()?),
                time: r.i64()?,
            },
            ServerOpcode::BoardClear => {
                let count = read_count(r)?;
                Self::BoardClear(read_many(r, count)?)
            }
        })
    }

    /// The opcode this message is sent under.
    pub fn opcode(&self) -> ServerOpcode {
        match self {
            Self::TeamCreate { .. } => ServerOpcode::TeamCreate,
            Self::TeamRemove { .. } => ServerOpcode::TeamRemove,
            Self::TeamNameUpdate { .. } => ServerOpcode::TeamNameUpdate,
            Self::PlayerCreate(_) => ServerOpcode::PlayerCreate,
            Self::PlayerRemove { .. } => ServerOpcode::PlayerRemove,
            Self::PlayerNameUpdate { .. } => ServerOpcode::PlayerNameUpdate,
            Self::PlayerColorUpdate { .. } => ServerOpcode::PlayerColorUpdate,
            Self::PlayerTeamUpdate { .. } => ServerOpcode::PlayerTeamUpdate,
            Self::SettingsUpdate { .. } => ServerOpcode::SettingsUpdate,
            Self::LobbyState(_) => ServerOpcode::LobbyState,
            Self::GameStart { .. } => ServerOpcode::GameStart,
            Self::TileReveal(_) => ServerOpcode::TileReveal,
            Self::TileFlag { .. } => ServerOpcode::TileFlag,
            Self::CursorUpdate(_) => ServerOpcode::CursorUpdate,
            Self::TeamFinish { .. } => ServerOpcode::TeamFinish,
            Self::PlayerLose { .. } => ServerOpcode::PlayerLose,
            Self::TeamLose { .. } => ServerOpcode::TeamLose,
            Self::BoardClear(_) => ServerOpcode::BoardClear,
        }
    }

    /// Wire width of the body (everything after the opcode byte).
    pub fn body_len(&self) -> usize {
        match self {
            Self::TeamCreate { name, .. } | Self::TeamNameUpdate { name, .. } => {
                8 + Writer::string_len(name)
            }
            Self::TeamRemove { .. } => 8,
            Self::PlayerCreate(record) => record.wire_len(),
            Self::PlayerRemove { .. } => 4,
            Self::PlayerNameUpdate { name, .. } => 4 + Writer::string_len(name),
            Self::PlayerColorUpdate { .. } => 4 + 3,
            Self::PlayerTeamUpdate { .. } => 8,
            Self::SettingsUpdate { change, .. } => 8 + change.payload_len(),
            Self::LobbyState(state) => lobby_state_len(state),
            Self::GameStart { settings, .. } => 4 + 8 + 4 + 4 + settings.wire_len(),
            Self::TileReveal(reveal) => 6 * 4 + reveal.tiles.len() + 8,
            Self::TileFlag { .. } => 4 * 4 + 2,
            Self::CursorUpdate(cursors) => 4 + cursors.len() * 12,
            Self::TeamFinish { .. } => 4 + 8,
            Self::PlayerLose { .. } | Self::TeamLose { .. } => 8 + 8,
            Self::BoardClear(records) => 4 + records.iter().map(Wire::wire_len).sum::<usize>(),
        }
    }

    /// Encodes the message into an exactly sized frame.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut w = Writer::with_len(1 + self.body_len());
        w.byte(self.opcode().byte())?;
        self.write_body(&mut w)?;
        w.finish()
    }

    fn write_body(&self, w: &mut Writer) -> Result<(), ProtocolError> {
        match self {
            Self::TeamCreate { team_id, by, name } | Self::TeamNameUpdate { team_id, by, name } => {
                w.i32(team_id.0)?;
                w.i32(by.0)?;
                w.string(name)
            }
            Self::TeamRemove { team_id, by } => {
                w.i32(team_id.0)?;
                w.i32(by.0)
            }
            Self::PlayerCreate(record) => w.write(record),
            Self::PlayerRemove { player_id } => w.i32(player_id.0),
            Self::PlayerNameUpdate { player_id, name } => {
                w.i32(player_id.0)?;
                w.string(name)
            }
            Self::PlayerColorUpdate { player_id, color } => {
                w.i32(player_id.0)?;
                w.write(color)
            }
            Self::PlayerTeamUpdate { player_id, team_id } => {
                w.i32(player_id.0)?;
                w.i32(TeamId::to_wire(*team_id))
            }
            Self::SettingsUpdate { from, change } => {
                w.i32(change.code())?;
                w.i32(from.0)?;
                change.write_payload(w)
            }
            Self::LobbyState(state) => write_lobby_state(state, w),
            Self::GameStart {
                from,
                start_time,
                start_x,
                start_y,
                settings,
            } => {
                w.i32(from.0)?;
                w.i64(*start_time)?;
                w.i32(*start_x)?;
                w.i32(*start_y)?;
                w.write(settings)
            }
            Self::TileReveal(reveal) => {
                if cell_count(reveal.width, reveal.height)? != reveal.tiles.len() {
                    return Err(ProtocolError::InvalidDimensions {
                        width: reveal.width,
                        height: reveal.height,
                    });
                }
                w.i32(reveal.player_id.0)?;
                w.i32(reveal.team_id.0)?;
                w.i32(reveal.x)?;
                w.i32(reveal.y)?;
                w.i32(reveal.width)?;
                w.i32(reveal.height)?;
                w.bytes(&reveal.tiles)?;
                w.i64(reveal.time)
            }
            Self::TileFlag {
                player_id,
                team_id,
                x,
                y,
                is_added,
                is_pencil,
            } => {
                w.i32(player_id.0)?;
                w.i32(team_id.0)?;
                w.i32(*x)?;
                w.i32(*y)?;
                w.bool(*is_added)?;
                w.bool(*is_pencil)
            }
            Self::CursorUpdate(cursors) => {
                w.i32(count_to_wire(cursors.len())?)?;
                cursors.iter().try_for_each(|c| {
                    w.i32(c.player_id.0)?;
                    w.f32(c.x)?;
                    w.f32(c.y)
                })
            }
            Self::TeamFinish { team_id, time } => {
                w.i32(team_id.0)?;
                w.i64(*time)
            }
            Self::PlayerLose {
                player_id,
                team_id,
                time,
            } => {
                w.i32(player_id.0)?;
                w.i32(team_id.0)?;
                w.i64(*time)
            }
            Self::TeamLose {
                click_player_id,
                team_id,
                time,
            } => {
                w.i32(click_player_id.0)?;
                w.i32(team_id.0)?;
                w.i64(*time)
            }
            Self::BoardClear(records) => {
                w.i32(count_to_wire(records.len())?)?;
                records.iter().try_for_each(|rec| w.write(rec))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LOBBY_STATE layout
// ---------------------------------------------------------------------------

fn read_lobby_state(r: &mut Reader<'_>) -> Result<LobbyState, ProtocolError> {
    let settings = r.read()?;
    let player_count = read_count(r)?;
    let team_count = read_count(r)?;
    let self_id = PlayerId(r.i32()?);
    let players = read_many(r, player_count)?;
    let teams = read_many(r, team_count)?;
    let game = if r.bool()? {
        Some(read_game_block(r)?)
    } else {
        None
    };

    Ok(LobbyState {
        settings,
        self_id,
        players,
        teams,
        game,
    })
}

fn read_game_block(r: &mut Reader<'_>) -> Result<GameBlock, ProtocolError> {
    let settings: GameSettings = r.read()?;
    let start_time = r.i64()?;
    let start_x = r.i32()?;
    let start_y = r.i32()?;

    let finish_count = read_count(r)?;
    let finishes = (0..finish_count)
        .map(|_| -> Result<_, ProtocolError> { Ok((TeamId(r.i32()?), r.i64()?)) })
        .collect::<Result<_, ProtocolError>>()?;

    let cells = settings.cell_count()?;
    let progress_count = read_count(r)?;
    let progress = (0..progress_count)
        .map(|_| -> Result<_, ProtocolError> {
            Ok(ProgressBlock {
                board: r.bytes(cells)?,
                flags: r.i32_array(cells)?,
            })
        })
        .collect::<Result<_, ProtocolError>>()?;

    Ok(GameBlock {
        settings,
        start_time,
        start_x,
        start_y,
        finishes,
        progress,
    })
}

fn lobby_state_len(state: &LobbyState) -> usize {
    let records: usize = state.players.iter().map(Wire::wire_len).sum::<usize>()
        + state.teams.iter().map(Wire::wire_len).sum::<usize>();
    let game = state.game.as_ref().map_or(0, |g| {
        g.settings.wire_len()
            + 8
            + 4
            + 4
            + 4
            + g.finishes.len() * 12
            + 4
            + g.progress
                .iter()
                .map(|p| p.board.len() + p.flags.len() * 4)
                .sum::<usize>()
    });
    state.settings.wire_len() + 12 + records + 1 + game
}

fn write_lobby_state(state: &LobbyState, w: &mut Writer) -> Result<(), ProtocolError> {
    w.write(&state.settings)?;
    w.i32(count_to_wire(state.players.len())?)?;
    w.i32(count_to_wire(state.teams.len())?)?;
    w.i32(state.self_id.0)?;
    state.players.iter().try_for_each(|p| w.write(p))?;
    state.teams.iter().try_for_each(|t| w.write(t))?;
    w.bool(state.game.is_some())?;

    let Some(game) = &state.game else {
        return Ok(());
    };
    let cells = game.settings.cell_count()?;
    w.write(&game.settings)?;
    w.i64(game.start_time)?;
    w.i32(game.start_x)?;
    w.i32(game.start_y)?;
    w.i32(count_to_wire(game.finishes.len())?)?;
    for (team_id, time) in &game.finishes {
        w.i32(team_id.0)?;
        w.i64(*time)?;
    }
    w.i32(count_to_wire(game.progress.len())?)?;
    for block in &game.progress {
        if block.board.len() != cells || block.flags.len() != cells {
            return Err(ProtocolError::InvalidDimensions {
                width: game.settings.width,
                height: game.settings.height,
            });
        }
        w.bytes(&block.board)?;
        w.i32_array(&block.flags)?;
    }
    Ok(())
}
