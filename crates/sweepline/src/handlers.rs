//! State-mutation routines, one per server message.
//!
//! Every routine takes an already decoded message and the document, and
//! reports whether it changed anything. None of them can fail: a message
//! that refers to a player or team this client doesn't know is logged and
//! ignored, and the next full resync repairs whatever was missed.

use sweepline_protocol::{
    CursorPosition, GameBlock, GameSettings, LobbyState, PlayerId, PlayerRecord, ServerMessage,
    SettingChange, TeamId, TileReveal,
};
use sweepline_state::{
    Document, Game, LogEntry, Player, PlayerData, Team, TeamData, TeamProgress, Viewer,
    elimination,
};
use tracing::{debug, info, trace};

/// Applies one message to the document. Returns `true` if it changed.
pub fn apply(doc: &mut Document, msg: ServerMessage) -> bool {
    match msg {
        ServerMessage::TeamCreate { team_id, by, name } => team_create(doc, team_id, by, name),
        ServerMessage::TeamRemove { team_id, by } => team_remove(doc, team_id, by),
        ServerMessage::TeamNameUpdate { team_id, by, name } => {
            team_name_update(doc, team_id, by, name)
        }
        ServerMessage::PlayerCreate(record) => player_create(doc, &record),
        ServerMessage::PlayerRemove { player_id } => player_remove(doc, player_id),
        ServerMessage::PlayerNameUpdate { player_id, name } => {
            player_name_update(doc, player_id, name)
        }
        ServerMessage::PlayerColorUpdate { player_id, color } => {
            let Some(player) = doc.player_mut(player_id) else {
                debug!(%player_id, "colour update for unknown player");
                return false;
            };
            player.color = color;
            true
        }
        ServerMessage::PlayerTeamUpdate { player_id, team_id } => {
            player_team_update(doc, player_id, team_id)
        }
        ServerMessage::SettingsUpdate { from, change } => settings_update(doc, from, change),
        ServerMessage::LobbyState(state) => lobby_state(doc, state),
        ServerMessage::GameStart {
            from,
            start_time,
            start_x,
            start_y,
            settings,
        } => game_start(doc, from, start_time, start_x, start_y, settings),
        ServerMessage::TileReveal(reveal) => tile_reveal(doc, reveal),
        ServerMessage::TileFlag {
            player_id,
            team_id,
            x,
            y,
            is_added,
            is_pencil,
        } => tile_flag(doc, player_id, team_id, x, y, is_added, is_pencil),
        ServerMessage::CursorUpdate(cursors) => cursor_update(doc, cursors),
        ServerMessage::TeamFinish { team_id, time } => {
            let Some(game) = running(doc) else {
                return false;
            };
            if !game.team_datas.contains_key(&team_id) {
                debug!(%team_id, "finish for unknown team");
                return false;
            }
            elimination::team_finish(game, team_id, time);
            true
        }
        ServerMessage::PlayerLose {
            player_id,
            team_id,
            time,
        } => {
            let Document { game, players, .. } = doc;
            let Some(game) = game.as_mut() else {
                debug!(%player_id, "player loss outside a game");
                return false;
            };
            let team = TeamId::from_wire(team_id.0);
            elimination::player_lose(game, players, player_id, team, time);
            true
        }
        ServerMessage::TeamLose {
            click_player_id,
            team_id,
            time,
        } => {
            let Document { game, players, .. } = doc;
            let Some(game) = game.as_mut() else {
                debug!(%team_id, "team loss outside a game");
                return false;
            };
            if !game.team_datas.contains_key(&team_id) {
                debug!(%team_id, "loss for unknown team");
                return false;
            }
            debug!(%team_id, by = %click_player_id, "team lost on click");
            elimination::team_lose(game, players, team_id, time);
            true
        }
        ServerMessage::BoardClear(records) => board_clear(doc, &records),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn running(doc: &mut Document) -> Option<&mut Game> {
    let game = doc.game.as_mut();
    if game.is_none() {
        trace!("game message outside a game");
    }
    game
}

/// Builds a lobby player, dropping a team id that names no known team.
fn admit(teams: &[Team], record: &PlayerRecord) -> Player {
    let mut player = Player::from(record);
    if let Some(team) = player.team_id {
        if !teams.iter().any(|t| t.id == team) {
            debug!(player_id = %player.id, team_id = %team, "player refers to unknown team");
            player.team_id = None;
        }
    }
    player
}

/// Re-derives liveness for each team that is `Some`.
fn recompute(doc: &mut Document, teams: [Option<TeamId>; 2]) {
    let Document { game, players, .. } = doc;
    let Some(game) = game.as_mut() else {
        return;
    };
    for team in teams.into_iter().flatten() {
        elimination::recompute_team(game, players, team, None);
    }
}

/// Re-derives which boards we hold once our own team may have changed.
fn revisit(doc: &mut Document, before: Viewer) {
    let after = Viewer::of(doc);
    if after == before {
        return;
    }
    debug!(?before, ?after, "viewer changed");
    if let Some(game) = doc.game.as_mut() {
        after.reconcile(game);
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

fn team_create(doc: &mut Document, team_id: TeamId, by: PlayerId, name: String) -> bool {
    match doc.team_mut(team_id) {
        Some(team) => team.name = name,
        None => doc.teams.push(Team { id: team_id, name }),
    }

    let viewer = Viewer::of(doc);
    if let Some(game) = doc.game.as_mut() {
        let progress = viewer.fresh_progress(team_id, &game.settings);
        game.team_datas
            .entry(team_id)
            .or_insert_with(|| TeamData::new(progress));
    }
    debug!(%team_id, %by, "team created");
    true
}

fn team_remove(doc: &mut Document, team_id: TeamId, by: PlayerId) -> bool {
    let Some(index) = doc.teams.iter().position(|t| t.id == team_id) else {
        debug!(%team_id, "removal of unknown team");
        return false;
    };
    let team = doc.teams.remove(index);
    let before = Viewer::of(doc);

    for player in doc.players.iter_mut().filter(|p| p.team_id == Some(team_id)) {
        player.team_id = None;
    }
    if let Some(game) = doc.game.as_mut() {
        game.team_datas.remove(&team_id);
    }
    revisit(doc, before);

    info!(%team_id, %by, name = %team.name, "team removed");
    doc.log.push(LogEntry::TeamRemoved {
        team_id,
        by,
        name: team.name,
    });
    true
}

fn team_name_update(doc: &mut Document, team_id: TeamId, by: PlayerId, name: String) -> bool {
    let Some(team) = doc.team_mut(team_id) else {
        debug!(%team_id, "rename of unknown team");
        return false;
    };
    let old_name = std::mem::replace(&mut team.name, name.clone());
    doc.log.push(LogEntry::TeamRenamed {
        team_id,
        by,
        old_name,
        new_name: name,
    });
    true
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

fn player_create(doc: &mut Document, record: &PlayerRecord) -> bool {
    let player = admit(&doc.teams, record);
    let before = Viewer::of(doc);
    let previous_team = doc.player(player.id).and_then(|p| p.team_id);
    let team = player.team_id;
    doc.upsert_player(player);

    if let Some(game) = doc.game.as_mut() {
        game.player_datas.insert(
            record.id,
            PlayerData {
                is_alive: !record.is_dead,
            },
        );
        recompute(doc, [previous_team, team]);
    }
    revisit(doc, before);
    debug!(player_id = %record.id, "player created");
    true
}

fn player_remove(doc: &mut Document, player_id: PlayerId) -> bool {
    let Some(player) = doc.player_mut(player_id) else {
        debug!(%player_id, "removal of unknown player");
        return false;
    };
    player.is_connected = false;
    true
}

fn player_name_update(doc: &mut Document, player_id: PlayerId, name: String) -> bool {
    let Some(player) = doc.player_mut(player_id) else {
        debug!(%player_id, "rename of unknown player");
        return false;
    };
    player.name = name;
    true
}

fn player_team_update(doc: &mut Document, player_id: PlayerId, team_id: Option<TeamId>) -> bool {
    if let Some(team) = team_id {
        if doc.team(team).is_none() {
            debug!(%player_id, team_id = %team, "move to unknown team");
            return false;
        }
    }
    let before = Viewer::of(doc);
    let Some(player) = doc.player_mut(player_id) else {
        debug!(%player_id, "move of unknown player");
        return false;
    };
    let previous = std::mem::replace(&mut player.team_id, team_id);
    recompute(doc, [previous, team_id]);
    revisit(doc, before);
    true
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

fn settings_update(doc: &mut Document, from: PlayerId, change: SettingChange) -> bool {
    change.apply_to(&mut doc.settings);
    debug!(%from, code = change.code(), "setting changed");
    true
}

fn lobby_state(doc: &mut Document, state: LobbyState) -> bool {
    let LobbyState {
        settings,
        self_id,
        players,
        teams,
        game,
    } = state;

    doc.settings = settings;
    doc.self_id = Some(self_id);
    doc.teams = teams.iter().map(Team::from).collect();
    doc.players = players.iter().map(|r| admit(&doc.teams, r)).collect();
    let game = game.map(|block| resume_game(doc, &players, block));
    doc.game = game;

    info!(
        self_id = %self_id,
        players = doc.players.len(),
        teams = doc.teams.len(),
        game = doc.game.is_some(),
        "lobby resynced"
    );
    true
}

/// Rebuilds a running game from a resync block.
fn resume_game(doc: &Document, records: &[PlayerRecord], block: GameBlock) -> Game {
    let GameBlock {
        settings,
        start_time,
        start_x,
        start_y,
        finishes,
        progress,
    } = block;

    let mut game = Game::new(settings, start_time, start_x, start_y);
    for record in records {
        game.player_datas.insert(
            record.id,
            PlayerData {
                is_alive: !record.is_dead,
            },
        );
    }

    let viewer = Viewer::of(doc);
    let mut boards = viewer.assign_progress(&doc.teams, progress, &settings);
    for team in &doc.teams {
        let progress = boards
            .remove(&team.id)
            .unwrap_or(TeamProgress::Hidden);
        let mut data = TeamData::new(progress);
        let finish = finishes
            .iter()
            .find(|(id, _)| *id == team.id)
            .map(|(_, time)| *time);
        data.finish_time = finish;
        game.team_datas.insert(team.id, data);
        elimination::recompute_team(&mut game, &doc.players, team.id, finish);
    }
    game
}

fn game_start(
    doc: &mut Document,
    from: PlayerId,
    start_time: i64,
    start_x: i32,
    start_y: i32,
    settings: GameSettings,
) -> bool {
    let viewer = Viewer::of(doc);
    let mut game = Game::new(settings, start_time, start_x, start_y);
    for player in &doc.players {
        game.player_datas
            .insert(player.id, PlayerData { is_alive: true });
    }
    for team in &doc.teams {
        let progress = viewer.fresh_progress(team.id, &settings);
        game.team_datas.insert(team.id, TeamData::new(progress));
    }

    doc.settings = settings;
    doc.game = Some(game);
    info!(%from, start_time, width = settings.width, height = settings.height, "game started");
    true
}

fn board_clear(doc: &mut Document, records: &[PlayerRecord]) -> bool {
    doc.game = None;
    doc.players = records.iter().map(|r| admit(&doc.teams, r)).collect();
    info!(players = doc.players.len(), "board cleared");
    true
}

// ---------------------------------------------------------------------------
// Board traffic
// ---------------------------------------------------------------------------

fn tile_reveal(doc: &mut Document, reveal: TileReveal) -> bool {
    let TileReveal {
        player_id,
        team_id,
        x,
        y,
        width,
        height,
        tiles,
        time,
    } = reveal;

    let Document { game, players, .. } = doc;
    let Some(game) = game.as_mut() else {
        trace!("reveal outside a game");
        return false;
    };
    if (width, height) != (game.settings.width, game.settings.height) {
        debug!(width, height, "reveal window does not match board");
        return false;
    }
    if !game.settings.contains(x, y) {
        debug!(x, y, "reveal out of bounds");
        return false;
    }
    let Some(board) = game
        .team_datas
        .get_mut(&team_id)
        .and_then(|data| data.progress.board_mut())
    else {
        trace!(%team_id, "reveal for hidden or unknown team");
        return false;
    };

    let numbered = board.value(x, y).is_some_and(|v| (1..=8).contains(&v));
    let result = if numbered {
        board.chord(x, y, &tiles)
    } else {
        board.reveal(x, y, &tiles)
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(error = %e, "reveal rejected");
            return false;
        }
    };

    if outcome.hit_mine {
        elimination::player_lose(game, players, player_id, Some(team_id), time);
    }
    outcome.changed()
}

fn tile_flag(
    doc: &mut Document,
    player_id: PlayerId,
    team_id: TeamId,
    x: i32,
    y: i32,
    is_added: bool,
    is_pencil: bool,
) -> bool {
    let Some(game) = running(doc) else {
        return false;
    };
    if !game.settings.contains(x, y) {
        debug!(x, y, "flag out of bounds");
        return false;
    }
    let Some(board) = game
        .team_datas
        .get_mut(&team_id)
        .and_then(|data| data.progress.board_mut())
    else {
        trace!(%team_id, "flag for hidden or unknown team");
        return false;
    };

    match board.set_flag(x, y, player_id, is_added, is_pencil) {
        Ok(changed) => changed,
        Err(e) => {
            debug!(error = %e, "flag rejected");
            false
        }
    }
}

fn cursor_update(doc: &mut Document, cursors: Vec<CursorPosition>) -> bool {
    let Some(game) = running(doc) else {
        return false;
    };
    game.cursors = cursors;
    true
}
