//! One-byte opcodes that prefix every frame.
//!
//! Both directions use a closed set. An inbound byte outside
//! [`ServerOpcode`] is not an error: newer servers may send messages this
//! client doesn't know yet, and those frames are simply skipped.

macro_rules! opcodes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $value:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant = $value,)+
        }

        impl $name {
            /// Looks up the opcode for a raw byte.
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The raw byte written at offset 0 of the frame.
            pub fn byte(self) -> u8 {
                self as u8
            }
        }
    };
}

opcodes! {
    /// Server → client message kinds.
    pub enum ServerOpcode {
        TeamCreate = 1,
        TeamRemove = 2,
        PlayerNameUpdate = 3,
        PlayerColorUpdate = 4,
        PlayerTeamUpdate = 5,
        SettingsUpdate = 6,
        TeamNameUpdate = 11,
        LobbyState = 50,
        PlayerCreate = 51,
        PlayerRemove = 52,
        GameStart = 53,
        TileReveal = 54,
        TileFlag = 55,
        CursorUpdate = 56,
        TeamFinish = 57,
        PlayerLose = 58,
        TeamLose = 59,
        BoardClear = 60,
    }
}

opcodes! {
    /// Client → server message kinds.
    pub enum ClientOpcode {
        TeamCreate = 1,
        TeamRemove = 2,
        PlayerNameUpdate = 3,
        PlayerColorUpdate = 4,
        MoveTeams = 5,
        SettingsUpdate = 6,
        TeamNameUpdate = 11,
        Join = 50,
        StartGame = 53,
        TileClick = 54,
        TileFlag = 55,
        CursorMove = 56,
        ResetBoard = 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_opcode_from_byte() {
        assert_eq!(ServerOpcode::from_byte(51), Some(ServerOpcode::PlayerCreate));
        assert_eq!(ServerOpcode::from_byte(11), Some(ServerOpcode::TeamNameUpdate));
        assert_eq!(ServerOpcode::from_byte(0), None);
        assert_eq!(ServerOpcode::from_byte(200), None);
    }

    #[test]
    fn test_opcode_byte_round_trip() {
        for byte in 0..=u8::MAX {
            if let Some(op) = ClientOpcode::from_byte(byte) {
                assert_eq!(op.byte(), byte);
            }
        }
    }
}
