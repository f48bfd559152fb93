//! The client's mirror of server state.
//!
//! A [`Document`] holds everything the server has told this client: the
//! lobby (players, teams, settings), the running [`Game`] if there is one,
//! and an append-only activity [`LogEntry`] list.
//!
//! Invariants the handlers keep:
//!
//! - A player's `team_id`, when set, names a team in `teams`.
//! - `Game::team_datas` has an entry for every team that existed when the
//!   round started or was created during it, and none for removed teams.
//! - A team's liveness is derived from its members' liveness.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sweepline_board::Board;
use sweepline_protocol::{
    Color, CursorPosition, GameSettings, PlayerId, PlayerRecord, TeamId, TeamRecord,
};
use sweepline_session::ConnectionState;

// ---------------------------------------------------------------------------
// Lobby entities
// ---------------------------------------------------------------------------

/// A player in the lobby. Disconnected players stay listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub color: Color,
    pub name: String,
    pub team_id: Option<TeamId>,
    pub cursor_x: i32,
    pub cursor_y: i32,
    pub is_connected: bool,
}

impl From<&PlayerRecord> for Player {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            id: record.id,
            color: record.color,
            name: record.name.clone(),
            team_id: record.team_id,
            cursor_x: record.cursor_x,
            cursor_y: record.cursor_y,
            is_connected: record.is_connected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl From<&TeamRecord> for Team {
    fn from(record: &TeamRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    pub is_alive: bool,
}

/// A team's board as far as this viewer is allowed to know it.
///
/// There is no half-visible state: either the whole board is here or none
/// of it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamProgress {
    /// Shared with older snapshots until the next write touches it.
    Shown(Arc<Board>),
    Hidden,
}

impl TeamProgress {
    pub fn shown(board: Board) -> Self {
        Self::Shown(Arc::new(board))
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Shown(_))
    }

    pub fn board(&self) -> Option<&Board> {
        match self {
            Self::Shown(board) => Some(board),
            Self::Hidden => None,
        }
    }

    /// Mutable access, cloning the board first if a snapshot still shares
    /// it.
    pub fn board_mut(&mut self) -> Option<&mut Board> {
        match self {
            Self::Shown(board) => Some(Arc::make_mut(board)),
            Self::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamData {
    pub is_alive: bool,
    /// When the team finished, by clearing the board or by losing.
    pub finish_time: Option<i64>,
    pub progress: TeamProgress,
}

impl TeamData {
    pub fn new(progress: TeamProgress) -> Self {
        Self {
            is_alive: true,
            finish_time: None,
            progress,
        }
    }
}

/// Where the first click lands in no-guessing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPosition {
    pub x: i32,
    pub y: i32,
}

/// A running round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub settings: GameSettings,
    /// Only set when `settings.no_guessing` is on.
    pub start: Option<StartPosition>,
    /// Milliseconds since the Unix epoch.
    pub start_time: i64,
    pub player_datas: BTreeMap<PlayerId, PlayerData>,
    pub team_datas: BTreeMap<TeamId, TeamData>,
    pub cursors: Vec<CursorPosition>,
}

impl Game {
    pub fn new(settings: GameSettings, start_time: i64, start_x: i32, start_y: i32) -> Self {
        Self {
            settings,
            start: settings.no_guessing.then_some(StartPosition {
                x: start_x,
                y: start_y,
            }),
            start_time,
            player_datas: BTreeMap::new(),
            team_datas: BTreeMap::new(),
            cursors: Vec::new(),
        }
    }

    /// Liveness of a player; players the round doesn't know are alive.
    pub fn is_alive(&self, player: PlayerId) -> bool {
        self.player_datas.get(&player).is_none_or(|data| data.is_alive)
    }

    pub fn board(&self, team: TeamId) -> Option<&Board> {
        self.team_datas.get(&team).and_then(|data| data.progress.board())
    }
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

/// One line of the team activity log. Appended, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEntry {
    TeamRenamed {
        team_id: TeamId,
        by: PlayerId,
        old_name: String,
        new_name: String,
    },
    TeamRemoved {
        team_id: TeamId,
        by: PlayerId,
        name: String,
    },
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Everything the client knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Set by the first resync.
    pub self_id: Option<PlayerId>,
    pub settings: GameSettings,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub game: Option<Game>,
    pub log: Vec<LogEntry>,
    pub connection: ConnectionState,
}

/// Players in `players` currently on `team`.
pub(crate) fn members(players: &[Player], team: TeamId) -> impl Iterator<Item = &Player> + '_ {
    players.iter().filter(move |p| p.team_id == Some(team))
}

impl Document {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    /// The player record for this client, once known.
    pub fn self_player(&self) -> Option<&Player> {
        self.self_id.and_then(|id| self.player(id))
    }

    /// Current members of `team`.
    pub fn members(&self, team: TeamId) -> impl Iterator<Item = &Player> + '_ {
        members(&self.players, team)
    }

    /// Inserts a player, replacing any existing entry with the same id in
    /// place.
    pub fn upsert_player(&mut self, player: Player) {
        match self.player_mut(player.id) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }
}
