//! Integration tests for frame routing and handler semantics.
//!
//! Every test drives the store through encoded frames, the same way a
//! live connection does.

use sweepline::router::{Routed, route};
use sweepline_board::{Flag, MINE, UNREVEALED};
use sweepline_protocol::{
    Color, CursorPosition, GameBlock, GameSettings, LobbyState, PlayerId, PlayerRecord,
    ProgressBlock, ServerMessage, ServerOpcode, SettingChange, TeamId, TeamRecord, TileReveal,
};
use sweepline_state::{LogEntry, StateStore, TeamProgress, Viewer};

// =========================================================================
// Helpers
// =========================================================================

fn small() -> GameSettings {
    GameSettings {
        width: 3,
        height: 3,
        mine_count: 1,
        ..GameSettings::default()
    }
}

/// Authoritative tiles for a 3×3 board with one mine at (2, 2).
///
/// ```text
/// 0 0 0
/// 0 1 1
/// 0 1 9
/// ```
fn solved() -> Vec<u8> {
    vec![0, 0, 0, 0, 1, 1, 0, 1, MINE]
}

fn record(id: i32, team: Option<i32>) -> PlayerRecord {
    PlayerRecord {
        id: PlayerId(id),
        color: Color::new(10, 20, 30),
        name: format!("p{id}"),
        is_dead: false,
        team_id: team.map(TeamId),
        cursor_x: 0,
        cursor_y: 0,
        is_connected: true,
    }
}

fn team(id: i32) -> TeamRecord {
    TeamRecord {
        id: TeamId(id),
        name: format!("team {id}"),
    }
}

fn feed(store: &mut StateStore, msg: ServerMessage) -> Routed {
    let frame = msg.encode().expect("test message should encode");
    route(store, &frame).expect("test frame should decode")
}

/// Lobby with us (P-1) and P-2 on team 1, P-3 on team 2. No game.
fn lobby() -> StateStore {
    let mut store = StateStore::default();
    feed(
        &mut store,
        ServerMessage::LobbyState(LobbyState {
            settings: small(),
            self_id: PlayerId(1),
            players: vec![record(1, Some(1)), record(2, Some(1)), record(3, Some(2))],
            teams: vec![team(1), team(2)],
            game: None,
        }),
    );
    store
}

fn start(store: &mut StateStore, settings: GameSettings) {
    feed(
        store,
        ServerMessage::GameStart {
            from: PlayerId(1),
            start_time: 1_000,
            start_x: 1,
            start_y: 1,
            settings,
        },
    );
}

/// Lobby plus a running 3×3 game.
fn in_game() -> StateStore {
    let mut store = lobby();
    start(&mut store, small());
    store
}

fn reveal(player: i32, team: i32, x: i32, y: i32, tiles: Vec<u8>, time: i64) -> ServerMessage {
    ServerMessage::TileReveal(TileReveal {
        player_id: PlayerId(player),
        team_id: TeamId(team),
        x,
        y,
        width: 3,
        height: 3,
        tiles,
        time,
    })
}

fn player_lose(player: i32, team: i32, time: i64) -> ServerMessage {
    ServerMessage::PlayerLose {
        player_id: PlayerId(player),
        team_id: TeamId(team),
        time,
    }
}

// =========================================================================
// Players
// =========================================================================

#[test]
fn test_player_create_from_raw_bytes() {
    let mut store = StateStore::default();
    let frame = [
        51, // PLAYER_CREATE
        0, 0, 0, 7, // id
        1, 2, 3, // colour
        0, 3, b'B', b'o', b'b', // name
        0, // isDead
        0, 0, 0, 0, // teamId = none
        0, 0, 0, 0, // cursorX
        0, 0, 0, 0, // cursorY
        1, // isConnected
    ];

    let routed = route(&mut store, &frame).unwrap();
    assert!(routed.changed());

    let doc = store.document();
    assert_eq!(doc.players.len(), 1);
    let bob = doc.player(PlayerId(7)).unwrap();
    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.team_id, None);
    assert!(bob.is_connected);
    assert_eq!(bob.color, Color::new(1, 2, 3));
}

#[test]
fn test_player_create_during_game_sets_liveness() {
    let mut store = in_game();
    let mut late = record(7, None);
    late.is_dead = true;

    feed(&mut store, ServerMessage::PlayerCreate(record(8, None)));
    feed(&mut store, ServerMessage::PlayerCreate(late));

    let game = store.document().game.as_ref().unwrap();
    assert!(game.player_datas[&PlayerId(8)].is_alive);
    assert!(!game.player_datas[&PlayerId(7)].is_alive);
}

#[test]
fn test_player_create_replaces_on_same_id() {
    let mut store = lobby();
    let mut renamed = record(2, Some(2));
    renamed.name = "again".into();

    feed(&mut store, ServerMessage::PlayerCreate(renamed));

    let doc = store.document();
    assert_eq!(doc.players.len(), 3);
    assert_eq!(doc.player(PlayerId(2)).unwrap().name, "again");
    assert_eq!(doc.player(PlayerId(2)).unwrap().team_id, Some(TeamId(2)));
}

#[test]
fn test_player_remove_marks_disconnected() {
    let mut store = lobby();
    feed(
        &mut store,
        ServerMessage::PlayerRemove {
            player_id: PlayerId(3),
        },
    );

    let doc = store.document();
    assert_eq!(doc.players.len(), 3);
    assert!(!doc.player(PlayerId(3)).unwrap().is_connected);
}

#[test]
fn test_player_name_and_color_updates() {
    let mut store = lobby();
    feed(
        &mut store,
        ServerMessage::PlayerNameUpdate {
            player_id: PlayerId(2),
            name: "Zoë".into(),
        },
    );
    feed(
        &mut store,
        ServerMessage::PlayerColorUpdate {
            player_id: PlayerId(2),
            color: Color::new(255, 0, 0),
        },
    );

    let p2 = store.document().player(PlayerId(2)).unwrap().clone();
    assert_eq!(p2.name, "Zoë");
    assert_eq!(p2.color, Color::new(255, 0, 0));
}

#[test]
fn test_team_update_to_zero_clears_team() {
    let mut store = lobby();
    feed(
        &mut store,
        ServerMessage::PlayerTeamUpdate {
            player_id: PlayerId(2),
            team_id: None,
        },
    );
    assert_eq!(store.document().player(PlayerId(2)).unwrap().team_id, None);
}

#[test]
fn test_team_update_to_unknown_team_is_ignored() {
    let mut store = lobby();
    let version = store.version();

    let routed = feed(
        &mut store,
        ServerMessage::PlayerTeamUpdate {
            player_id: PlayerId(2),
            team_id: Some(TeamId(99)),
        },
    );

    assert!(!routed.changed());
    assert_eq!(store.version(), version);
    assert_eq!(
        store.document().player(PlayerId(2)).unwrap().team_id,
        Some(TeamId(1))
    );
}

#[test]
fn test_moving_last_survivor_out_kills_team() {
    let mut store = in_game();
    // P-3 is alone on team 2 and still alive; P-1 dies on team 1.
    feed(&mut store, player_lose(1, 1, 50));
    // Move the surviving P-2 to team 2: team 1 now holds only dead P-1.
    feed(
        &mut store,
        ServerMessage::PlayerTeamUpdate {
            player_id: PlayerId(2),
            team_id: Some(TeamId(2)),
        },
    );

    let game = store.document().game.as_ref().unwrap();
    assert!(!game.team_datas[&TeamId(1)].is_alive);
    assert!(game.team_datas[&TeamId(2)].is_alive);
}

// =========================================================================
// Teams and the activity log
// =========================================================================

#[test]
fn test_team_create_adds_team_and_game_data() {
    let mut store = in_game();
    feed(
        &mut store,
        ServerMessage::TeamCreate {
            team_id: TeamId(3),
            by: PlayerId(2),
            name: "late".into(),
        },
    );

    let doc = store.document();
    assert_eq!(doc.team(TeamId(3)).unwrap().name, "late");
    let data = &doc.game.as_ref().unwrap().team_datas[&TeamId(3)];
    assert!(data.is_alive);
    assert_eq!(data.progress, TeamProgress::Hidden);
}

#[test]
fn test_team_remove_clears_members_and_logs() {
    let mut store = in_game();
    feed(
        &mut store,
        ServerMessage::TeamRemove {
            team_id: TeamId(2),
            by: PlayerId(1),
        },
    );

    let doc = store.document();
    assert!(doc.team(TeamId(2)).is_none());
    assert_eq!(doc.player(PlayerId(3)).unwrap().team_id, None);
    assert!(!doc.game.as_ref().unwrap().team_datas.contains_key(&TeamId(2)));
    assert_eq!(
        doc.log,
        vec![LogEntry::TeamRemoved {
            team_id: TeamId(2),
            by: PlayerId(1),
            name: "team 2".into(),
        }]
    );
}

#[test]
fn test_team_rename_logs_old_and_new_name() {
    let mut store = lobby();
    feed(
        &mut store,
        ServerMessage::TeamNameUpdate {
            team_id: TeamId(1),
            by: PlayerId(2),
            name: "reds".into(),
        },
    );

    let doc = store.document();
    assert_eq!(doc.team(TeamId(1)).unwrap().name, "reds");
    assert_eq!(
        doc.log,
        vec![LogEntry::TeamRenamed {
            team_id: TeamId(1),
            by: PlayerId(2),
            old_name: "team 1".into(),
            new_name: "reds".into(),
        }]
    );
}

#[test]
fn test_log_survives_resync() {
    let mut store = lobby();
    feed(
        &mut store,
        ServerMessage::TeamNameUpdate {
            team_id: TeamId(1),
            by: PlayerId(2),
            name: "reds".into(),
        },
    );

    feed(
        &mut store,
        ServerMessage::LobbyState(LobbyState {
            settings: small(),
            self_id: PlayerId(1),
            players: vec![record(1, None)],
            teams: vec![],
            game: None,
        }),
    );

    let doc = store.document();
    assert_eq!(doc.log.len(), 1);
    assert!(doc.teams.is_empty());
    assert_eq!(doc.players.len(), 1);
}

// =========================================================================
// Settings
// =========================================================================

#[test]
fn test_settings_update_patches_one_field() {
    let mut store = lobby();
    feed(
        &mut store,
        ServerMessage::SettingsUpdate {
            from: PlayerId(2),
            change: SettingChange::BoardSize {
                width: 9,
                height: 8,
            },
        },
    );

    let settings = store.document().settings;
    assert_eq!((settings.width, settings.height), (9, 8));
    assert_eq!(settings.mine_count, 1);
}

// =========================================================================
// Game lifecycle and visibility
// =========================================================================

#[test]
fn test_game_start_shows_only_own_team() {
    let store = in_game();
    let game = store.document().game.as_ref().unwrap();

    let own = game.board(TeamId(1)).expect("own team is shown");
    assert!(own.values().iter().all(|v| *v == UNREVEALED));
    assert_eq!(game.team_datas[&TeamId(2)].progress, TeamProgress::Hidden);
    assert!(game.player_datas.values().all(|d| d.is_alive));
    assert_eq!(game.start, None);
}

#[test]
fn test_game_start_keeps_start_only_with_no_guessing() {
    let mut store = lobby();
    start(
        &mut store,
        GameSettings {
            no_guessing: true,
            ..small()
        },
    );

    let doc = store.document();
    let game = doc.game.as_ref().unwrap();
    let start = game.start.expect("start position kept");
    assert_eq!((start.x, start.y), (1, 1));
    assert!(doc.settings.no_guessing);
}

#[test]
fn test_spectator_resync_populates_every_team() {
    let mut store = StateStore::default();
    let blocks = (0..3)
        .map(|i| ProgressBlock {
            board: vec![i; 9],
            flags: vec![0; 9],
        })
        .collect();

    feed(
        &mut store,
        ServerMessage::LobbyState(LobbyState {
            settings: small(),
            self_id: PlayerId(9),
            players: vec![record(9, None), record(1, Some(1))],
            teams: vec![team(1), team(2), team(3)],
            game: Some(GameBlock {
                settings: small(),
                start_time: 5,
                start_x: 0,
                start_y: 0,
                finishes: vec![],
                progress: blocks,
            }),
        }),
    );

    let game = store.document().game.as_ref().unwrap();
    for (i, id) in [1, 2, 3].into_iter().enumerate() {
        let board = game.board(TeamId(id)).expect("spectator sees all");
        assert_eq!(board.values()[0], i as u8);
    }
}

#[test]
fn test_member_resync_populates_only_own_team() {
    let mut store = StateStore::default();
    let mut flags = vec![0; 9];
    flags[4] = -2;

    feed(
        &mut store,
        ServerMessage::LobbyState(LobbyState {
            settings: small(),
            self_id: PlayerId(2),
            players: vec![record(1, Some(1)), record(2, Some(2)), record(3, Some(3))],
            teams: vec![team(1), team(2), team(3)],
            game: Some(GameBlock {
                settings: small(),
                start_time: 5,
                start_x: 0,
                start_y: 0,
                finishes: vec![(TeamId(3), 77)],
                progress: vec![ProgressBlock {
                    board: vec![UNREVEALED; 9],
                    flags,
                }],
            }),
        }),
    );

    let game = store.document().game.as_ref().unwrap();
    assert_eq!(game.team_datas[&TeamId(1)].progress, TeamProgress::Hidden);
    assert_eq!(game.team_datas[&TeamId(3)].progress, TeamProgress::Hidden);
    let own = game.board(TeamId(2)).expect("own team shown");
    assert_eq!(own.flag(1, 1), Some(Flag::Pencil(PlayerId(2))));
    assert_eq!(game.team_datas[&TeamId(3)].finish_time, Some(77));
}

#[test]
fn test_resync_derives_dead_team_from_players() {
    let mut store = StateStore::default();
    let mut dead = record(2, Some(2));
    dead.is_dead = true;

    feed(
        &mut store,
        ServerMessage::LobbyState(LobbyState {
            settings: small(),
            self_id: PlayerId(1),
            players: vec![record(1, Some(1)), dead],
            teams: vec![team(1), team(2)],
            game: Some(GameBlock {
                settings: small(),
                start_time: 5,
                start_x: 0,
                start_y: 0,
                finishes: vec![(TeamId(2), 40)],
                progress: vec![ProgressBlock {
                    board: vec![UNREVEALED; 9],
                    flags: vec![0; 9],
                }],
            }),
        }),
    );

    let game = store.document().game.as_ref().unwrap();
    assert!(game.team_datas[&TeamId(1)].is_alive);
    assert!(!game.team_datas[&TeamId(2)].is_alive);
    assert_eq!(game.team_datas[&TeamId(2)].finish_time, Some(40));
}

#[test]
fn test_board_clear_tears_down_game() {
    let mut store = in_game();
    feed(
        &mut store,
        ServerMessage::BoardClear(vec![record(1, Some(1)), record(5, Some(42))]),
    );

    let doc = store.document();
    assert!(doc.game.is_none());
    assert_eq!(doc.players.len(), 2);
    // Team 42 doesn't exist, so the reference is dropped.
    assert_eq!(doc.player(PlayerId(5)).unwrap().team_id, None);
}

// =========================================================================
// Visibility after our own team changes
// =========================================================================

/// Running game seen by spectator P-9, with teams 1..=3 each holding a
/// board whose first tile is `team - 1`.
fn spectating() -> StateStore {
    let mut store = StateStore::default();
    let blocks = (0..3)
        .map(|i| ProgressBlock {
            board: vec![i; 9],
            flags: vec![0; 9],
        })
        .collect();
    feed(
        &mut store,
        ServerMessage::LobbyState(LobbyState {
            settings: small(),
            self_id: PlayerId(9),
            players: vec![record(9, None), record(1, Some(1)), record(2, Some(2))],
            teams: vec![team(1), team(2), team(3)],
            game: Some(GameBlock {
                settings: small(),
                start_time: 5,
                start_x: 0,
                start_y: 0,
                finishes: vec![],
                progress: blocks,
            }),
        }),
    );
    store
}

fn progress(store: &StateStore, team: i32) -> &TeamProgress {
    &store.document().game.as_ref().unwrap().team_datas[&TeamId(team)].progress
}

#[test]
fn test_spectator_joining_team_hides_other_boards() {
    let mut store = spectating();
    feed(
        &mut store,
        ServerMessage::PlayerTeamUpdate {
            player_id: PlayerId(9),
            team_id: Some(TeamId(1)),
        },
    );

    assert_eq!(Viewer::of(store.document()), Viewer::Member(TeamId(1)));
    let own = progress(&store, 1).board().expect("own board kept");
    assert_eq!(own.values()[0], 0);
    assert_eq!(progress(&store, 2), &TeamProgress::Hidden);
    assert_eq!(progress(&store, 3), &TeamProgress::Hidden);
}

#[test]
fn test_moving_to_another_team_swaps_boards() {
    let mut store = in_game();
    feed(&mut store, reveal(1, 1, 0, 0, solved(), 10));
    feed(
        &mut store,
        ServerMessage::PlayerTeamUpdate {
            player_id: PlayerId(1),
            team_id: Some(TeamId(2)),
        },
    );

    assert_eq!(progress(&store, 1), &TeamProgress::Hidden);
    let own = progress(&store, 2).board().expect("new team shown");
    assert_eq!(own.revealed_count(), 0);

    assert!(feed(&mut store, reveal(1, 2, 0, 0, solved(), 20)).changed());
    let own = progress(&store, 2).board().unwrap();
    assert_eq!(own.revealed_count(), 8);
    assert!(!feed(&mut store, reveal(2, 1, 0, 0, solved(), 30)).changed());
}

#[test]
fn test_self_replacement_on_new_team_swaps_boards() {
    let mut store = in_game();
    feed(&mut store, ServerMessage::PlayerCreate(record(1, Some(2))));

    assert_eq!(Viewer::of(store.document()), Viewer::Member(TeamId(2)));
    assert_eq!(progress(&store, 1), &TeamProgress::Hidden);
    let own = progress(&store, 2).board().expect("new team shown");
    assert!(own.values().iter().all(|v| *v == UNREVEALED));
}

#[test]
fn test_removing_own_team_leaves_spectator_with_hidden_boards() {
    let mut store = in_game();
    feed(
        &mut store,
        ServerMessage::TeamRemove {
            team_id: TeamId(1),
            by: PlayerId(3),
        },
    );

    let doc = store.document();
    assert_eq!(doc.player(PlayerId(1)).unwrap().team_id, None);
    assert_eq!(Viewer::of(doc), Viewer::Spectator);
    let game = doc.game.as_ref().unwrap();
    assert!(!game.team_datas.contains_key(&TeamId(1)));
    assert_eq!(progress(&store, 2), &TeamProgress::Hidden);
    // Still hidden, so its traffic is dropped until the next resync.
    assert!(!feed(&mut store, reveal(3, 2, 0, 0, solved(), 10)).changed());
}

#[test]
fn test_leaving_team_keeps_own_board() {
    let mut store = in_game();
    feed(&mut store, reveal(1, 1, 0, 0, solved(), 10));
    feed(
        &mut store,
        ServerMessage::PlayerTeamUpdate {
            player_id: PlayerId(1),
            team_id: None,
        },
    );

    assert_eq!(Viewer::of(store.document()), Viewer::Spectator);
    assert_eq!(progress(&store, 1).board().unwrap().revealed_count(), 8);
    assert_eq!(progress(&store, 2), &TeamProgress::Hidden);
}

#[test]
fn test_moving_another_player_keeps_visibility() {
    let mut store = in_game();
    feed(
        &mut store,
        ServerMessage::PlayerTeamUpdate {
            player_id: PlayerId(2),
            team_id: Some(TeamId(2)),
        },
    );

    let doc = store.document();
    assert_eq!(doc.members(TeamId(1)).count(), 1);
    assert_eq!(doc.members(TeamId(2)).count(), 2);
    assert!(progress(&store, 1).is_shown());
    assert_eq!(progress(&store, 2), &TeamProgress::Hidden);
}

// =========================================================================
// Board traffic
// =========================================================================

#[test]
fn test_reveal_floods_own_board() {
    let mut store = in_game();
    feed(&mut store, reveal(1, 1, 0, 0, solved(), 10));

    let board = store.document().game.as_ref().unwrap().board(TeamId(1)).unwrap();
    assert_eq!(board.revealed_count(), 8);
    assert_eq!(board.value(2, 2), Some(UNREVEALED));
}

#[test]
fn test_reveal_for_hidden_team_is_ignored() {
    let mut store = in_game();
    let version = store.version();

    let routed = feed(&mut store, reveal(3, 2, 0, 0, solved(), 10));

    assert_eq!(
        routed,
        Routed::Applied {
            opcode: ServerOpcode::TileReveal,
            changed: false,
        }
    );
    assert_eq!(store.version(), version);
}

#[test]
fn test_reveal_with_wrong_dimensions_is_ignored() {
    let mut store = in_game();
    let routed = feed(
        &mut store,
        ServerMessage::TileReveal(TileReveal {
            player_id: PlayerId(1),
            team_id: TeamId(1),
            x: 0,
            y: 0,
            width: 2,
            height: 2,
            tiles: vec![0; 4],
            time: 1,
        }),
    );
    assert!(!routed.changed());
}

#[test]
fn test_reveal_out_of_bounds_is_ignored() {
    let mut store = in_game();
    assert!(!feed(&mut store, reveal(1, 1, 3, 0, solved(), 1)).changed());
}

#[test]
fn test_revealing_mine_eliminates_player() {
    let mut store = in_game();
    feed(&mut store, reveal(1, 1, 2, 2, solved(), 123));

    let game = store.document().game.as_ref().unwrap();
    assert_eq!(game.board(TeamId(1)).unwrap().value(2, 2), Some(MINE));
    assert!(!game.player_datas[&PlayerId(1)].is_alive);
    // P-2 is still alive on team 1.
    assert!(game.team_datas[&TeamId(1)].is_alive);
}

#[test]
fn test_click_on_number_chords_unflagged_neighbors() {
    let mut store = in_game();
    // Reveal only the "1" in the middle first.
    let mut partial = vec![UNREVEALED; 9];
    partial[4] = 1;
    feed(&mut store, reveal(1, 1, 1, 1, partial, 1));
    feed(
        &mut store,
        ServerMessage::TileFlag {
            player_id: PlayerId(2),
            team_id: TeamId(1),
            x: 2,
            y: 2,
            is_added: true,
            is_pencil: false,
        },
    );

    // Clicking the revealed "1" again opens its unflagged neighbourhood.
    feed(&mut store, reveal(1, 1, 1, 1, solved(), 2));

    let game = store.document().game.as_ref().unwrap();
    let board = game.board(TeamId(1)).unwrap();
    assert_eq!(board.revealed_count(), 8);
    assert_eq!(board.flag(2, 2), Some(Flag::Real(PlayerId(2))));
    assert!(game.player_datas[&PlayerId(1)].is_alive);
}

#[test]
fn test_flags_last_writer_wins_and_clear() {
    let mut store = in_game();
    let flag = |player: i32, is_added: bool, is_pencil: bool| ServerMessage::TileFlag {
        player_id: PlayerId(player),
        team_id: TeamId(1),
        x: 0,
        y: 2,
        is_added,
        is_pencil,
    };

    feed(&mut store, flag(1, true, true));
    let board = store.document().game.as_ref().unwrap().board(TeamId(1)).unwrap();
    assert_eq!(board.flags()[6], -1);

    feed(&mut store, flag(2, true, false));
    let board = store.document().game.as_ref().unwrap().board(TeamId(1)).unwrap();
    assert_eq!(board.flags()[6], 2);

    feed(&mut store, flag(2, false, false));
    let board = store.document().game.as_ref().unwrap().board(TeamId(1)).unwrap();
    assert_eq!(board.flags()[6], 0);
}

#[test]
fn test_snapshot_taken_before_reveal_keeps_old_board() {
    let mut store = in_game();
    let before = store.snapshot();

    feed(&mut store, reveal(1, 1, 0, 0, solved(), 10));

    let old = before.game.as_ref().unwrap().board(TeamId(1)).unwrap();
    assert_eq!(old.revealed_count(), 0);
    let new = store.document().game.as_ref().unwrap().board(TeamId(1)).unwrap();
    assert_eq!(new.revealed_count(), 8);
}

#[test]
fn test_cursor_update_replaces_list_only_in_game() {
    let cursors = vec![
        CursorPosition {
            player_id: PlayerId(1),
            x: 1.5,
            y: 2.25,
        },
        CursorPosition {
            player_id: PlayerId(2),
            x: 0.0,
            y: 0.0,
        },
    ];

    let mut store = lobby();
    assert!(!feed(&mut store, ServerMessage::CursorUpdate(cursors.clone())).changed());

    let mut store = in_game();
    feed(&mut store, ServerMessage::CursorUpdate(cursors.clone()));
    feed(&mut store, ServerMessage::CursorUpdate(cursors[..1].to_vec()));
    assert_eq!(
        store.document().game.as_ref().unwrap().cursors,
        cursors[..1].to_vec()
    );
}

// =========================================================================
// Elimination
// =========================================================================

/// Lobby with a single team of three (us among them) and a running game.
fn team_of_three() -> StateStore {
    let mut store = StateStore::default();
    feed(
        &mut store,
        ServerMessage::LobbyState(LobbyState {
            settings: small(),
            self_id: PlayerId(1),
            players: vec![record(1, Some(1)), record(2, Some(1)), record(3, Some(1))],
            teams: vec![team(1)],
            game: None,
        }),
    );
    start(&mut store, small());
    store
}

#[test]
fn test_team_dies_when_all_three_lose() {
    let mut store = team_of_three();
    feed(&mut store, player_lose(1, 1, 100));
    feed(&mut store, player_lose(2, 1, 200));
    feed(&mut store, player_lose(3, 1, 300));

    let data = &store.document().game.as_ref().unwrap().team_datas[&TeamId(1)];
    assert!(!data.is_alive);
    assert_eq!(data.finish_time, Some(300));
}

#[test]
fn test_team_survives_two_of_three_losses() {
    let mut store = team_of_three();
    feed(&mut store, player_lose(1, 1, 100));
    feed(&mut store, player_lose(2, 1, 200));

    let data = &store.document().game.as_ref().unwrap().team_datas[&TeamId(1)];
    assert!(data.is_alive);
    assert_eq!(data.finish_time, None);
}

#[test]
fn test_team_lose_cascades_to_members() {
    let mut store = team_of_three();
    feed(
        &mut store,
        ServerMessage::TeamLose {
            click_player_id: PlayerId(2),
            team_id: TeamId(1),
            time: 500,
        },
    );

    let game = store.document().game.as_ref().unwrap();
    assert!(game.player_datas.values().all(|d| !d.is_alive));
    assert_eq!(game.team_datas[&TeamId(1)].finish_time, Some(500));
}

#[test]
fn test_team_finish_sets_time_only() {
    let mut store = team_of_three();
    feed(
        &mut store,
        ServerMessage::TeamFinish {
            team_id: TeamId(1),
            time: 9_000,
        },
    );

    let data = &store.document().game.as_ref().unwrap().team_datas[&TeamId(1)];
    assert!(data.is_alive);
    assert_eq!(data.finish_time, Some(9_000));
}

#[test]
fn test_game_messages_outside_game_are_ignored() {
    let mut store = lobby();
    let version = store.version();

    assert!(!feed(&mut store, player_lose(1, 1, 1)).changed());
    assert!(!feed(&mut store, reveal(1, 1, 0, 0, solved(), 1)).changed());
    assert!(
        !feed(
            &mut store,
            ServerMessage::TeamFinish {
                team_id: TeamId(1),
                time: 1,
            }
        )
        .changed()
    );
    assert_eq!(store.version(), version);
}
