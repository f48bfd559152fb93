//! Identity types and the records shared by several messages.
//!
//! Player and team ids are server-assigned `int32`s. On the wire a team id
//! of `0` means "no team"; in Rust that is `Option<TeamId>`, so a sentinel
//! never leaks into the document.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{Reader, Wire, Writer};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A server-assigned player id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub i32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A server-assigned team id. Never zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TeamId(pub i32);

impl TeamId {
    /// Maps the wire encoding (`0` = no team) onto an option.
    pub fn from_wire(raw: i32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Inverse of [`from_wire`](Self::from_wire).
    pub fn to_wire(team: Option<Self>) -> i32 {
        team.map_or(0, |t| t.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A player's display colour, three raw bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Wire for Color {
    fn read(reader: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            r: reader.byte()?,
            g: reader.byte()?,
            b: reader.byte()?,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<(), ProtocolError> {
        writer.bytes(&[self.r, self.g, self.b])
    }

    fn wire_len(&self) -> usize {
        3
    }
}

// ---------------------------------------------------------------------------
// GameSettings
// ---------------------------------------------------------------------------

/// Lobby-wide game settings.
///
/// Replaced wholesale by a resync or game start, patched one field at a
/// time by [`SettingChange`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub no_guessing: bool,
    pub sudden_death: bool,
    pub width: i32,
    pub height: i32,
    pub mine_count: i32,
    /// Countdown before a round starts, in seconds.
    pub countdown_length: i32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            no_guessing: false,
            sudden_death: false,
            width: 30,
            height: 16,
            mine_count: 99,
            countdown_length: 3,
        }
    }
}

impl GameSettings {
    /// Number of cells on the board, or an error for nonsensical sizes.
    pub fn cell_count(&self) -> Result<usize, ProtocolError> {
        cell_count(self.width, self.height)
    }

    /// Returns `true` if `(x, y)` lies on the board.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }
}

/// `width * height` as a buffer length.
pub(crate) fn cell_count(width: i32, height: i32) -> Result<usize, ProtocolError> {
    let invalid = ProtocolError::InvalidDimensions { width, height };
    let w = usize::try_from(width).map_err(|_| invalid.clone())?;
    let h = usize::try_from(height).map_err(|_| invalid.clone())?;
    w.checked_mul(h).ok_or(invalid)
}

impl Wire for GameSettings {
    fn read(reader: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            no_guessing: reader.bool()?,
            sudden_death: reader.bool()?,
            width: reader.i32()?,
            height: reader.i32()?,
            mine_count: reader.i32()?,
            countdown_length: reader.i32()?,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<(), ProtocolError> {
        writer.bool(self.no_guessing)?;
        writer.bool(self.sudden_death)?;
        writer.i32(self.width)?;
        writer.i32(self.height)?;
        writer.i32(self.mine_count)?;
        writer.i32(self.countdown_length)
    }

    fn wire_len(&self) -> usize {
        2 + 4 * 4
    }
}

// ---------------------------------------------------------------------------
// Settings updates
// ---------------------------------------------------------------------------

/// A single-field settings update, identified on the wire by its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingChange {
    NoGuessing(bool),
    SuddenDeath(bool),
    BoardSize { width: i32, height: i32 },
    MineCount(i32),
    CountdownLength(i32),
}

impl SettingChange {
    pub const CODE_NO_GUESSING: i32 = 1;
    pub const CODE_SUDDEN_DEATH: i32 = 2;
    pub const CODE_BOARD_SIZE: i32 = 3;
    pub const CODE_MINE_COUNT: i32 = 4;
    pub const CODE_COUNTDOWN_LENGTH: i32 = 5;

    /// The wire setting code.
    pub fn code(&self) -> i32 {
        match self {
            Self::NoGuessing(_) => Self::CODE_NO_GUESSING,
            Self::SuddenDeath(_) => Self::CODE_SUDDEN_DEATH,
            Self::BoardSize { .. } => Self::CODE_BOARD_SIZE,
            Self::MineCount(_) => Self::CODE_MINE_COUNT,
            Self::CountdownLength(_) => Self::CODE_COUNTDOWN_LENGTH,
        }
    }

    /// Reads the payload that follows `code`.
    pub fn read_payload(code: i32, reader: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(match code {
            Self::CODE_NO_GUESSING => Self::NoGuessing(reader.bool()?),
            Self::CODE_SUDDEN_DEATH => Self::SuddenDeath(reader.bool()?),
            Self::CODE_BOARD_SIZE => Self::BoardSize {
                width: reader.i32()?,
                height: reader.i32()?,
            },
            Self::CODE_MINE_COUNT => Self::MineCount(reader.i32()?),
            Self::CODE_COUNTDOWN_LENGTH => Self::CountdownLength(reader.i32()?),
            other => return Err(ProtocolError::UnknownSetting(other)),
        })
    }

    /// Writes the payload only (not the code).
    pub fn write_payload(&self, writer: &mut Writer) -> Result<(), ProtocolError> {
        match *self {
            Self::NoGuessing(v) | Self::SuddenDeath(v) => writer.bool(v),
            Self::BoardSize { width, height } => {
                writer.i32(width)?;
                writer.i32(height)
            }
            Self::MineCount(v) | Self::CountdownLength(v) => writer.i32(v),
        }
    }

    /// Wire width of the payload.
    pub fn payload_len(&self) -> usize {
        match self {
            Self::NoGuessing(_) | Self::SuddenDeath(_) => 1,
            Self::BoardSize { .. } => 8,
            Self::MineCount(_) | Self::CountdownLength(_) => 4,
        }
    }

    /// Patches one field of `settings`.
    pub fn apply_to(&self, settings: &mut GameSettings) {
        match *self {
            Self::NoGuessing(v) => settings.no_guessing = v,
            Self::SuddenDeath(v) => settings.sudden_death = v,
            Self::BoardSize { width, height } => {
                settings.width = width;
                settings.height = height;
            }
            Self::MineCount(v) => settings.mine_count = v,
            Self::CountdownLength(v) => settings.countdown_length = v,
        }
    }
}

/// A partial settings update built by a UI: any subset of fields.
///
/// Expands into one [`SettingChange`] per set field. An empty patch is
/// rejected so the caller learns nothing was sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub no_guessing: Option<bool>,
    pub sudden_death: Option<bool>,
    pub board_size: Option<(i32, i32)>,
    pub mine_count: Option<i32>,
    pub countdown_length: Option<i32>,
}

impl SettingsPatch {
    /// Expands the patch into wire-level changes, in setting-code order.
    ///
    /// # Errors
    /// [`ProtocolError::EmptySettingsPatch`] if no field is set.
    pub fn into_changes(self) -> Result<Vec<SettingChange>, ProtocolError> {
        let changes: Vec<SettingChange> = [
            self.no_guessing.map(SettingChange::NoGuessing),
            self.sudden_death.map(SettingChange::SuddenDeath),
            self.board_size
                .map(|(width, height)| SettingChange::BoardSize { width, height }),
            self.mine_count.map(SettingChange::MineCount),
            self.countdown_length.map(SettingChange::CountdownLength),
        ]
        .into_iter()
        .flatten()
        .collect();

        if changes.is_empty() {
            return Err(ProtocolError::EmptySettingsPatch);
        }
        Ok(changes)
    }
}

// ---------------------------------------------------------------------------
// Player and team records
// ---------------------------------------------------------------------------

/// A player as described by PLAYER_CREATE, LOBBY_STATE and BOARD_CLEAR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub color: Color,
    pub name: String,
    pub is_dead: bool,
    pub team_id: Option<TeamId>,
    pub cursor_x: i32,
    pub cursor_y: i32,
    pub is_connected: bool,
}

impl Wire for PlayerRecord {
    fn read(reader: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: PlayerId(reader.i32()?),
            color: reader.read()?,
            name: reader.string()?,
            is_dead: reader.bool()?,
            team_id: TeamId::from_wire(reader.i32()?),
            cursor_x: reader.i32()?,
            cursor_y: reader.i32()?,
            is_connected: reader.bool()?,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<(), ProtocolError> {
        writer.i32(self.id.0)?;
        writer.write(&self.color)?;
        writer.string(&self.name)?;
        writer.bool(self.is_dead)?;
        writer.i32(TeamId::to_wire(self.team_id))?;
        writer.i32(self.cursor_x)?;
        writer.i32(self.cursor_y)?;
        writer.bool(self.is_connected)
    }

    fn wire_len(&self) -> usize {
        4 + 3 + Writer::string_len(&self.name) + 1 + 4 + 4 + 4 + 1
    }
}

/// A team as described by LOBBY_STATE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,
    pub name: String,
}

impl Wire for TeamRecord {
    fn read(reader: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: TeamId(reader.i32()?),
            name: reader.string()?,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<(), ProtocolError> {
        writer.i32(self.id.0)?;
        writer.string(&self.name)
    }

    fn wire_len(&self) -> usize {
        4 + Writer::string_len(&self.name)
    }
}
