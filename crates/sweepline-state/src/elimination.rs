//! Player and team liveness during a round.
//!
//! Team liveness is never stored independently of its members: every
//! change to a player's liveness or team membership re-derives it from a
//! full scan of the team's current members.

use sweepline_protocol::{PlayerId, TeamId};
use tracing::info;

use crate::model::{Game, Player, PlayerData, members};

/// Marks `player` dead, then re-derives `team`'s liveness.
///
/// `time` becomes the team's finish time if this loss was its last living
/// member.
pub fn player_lose(
    game: &mut Game,
    players: &[Player],
    player: PlayerId,
    team: Option<TeamId>,
    time: i64,
) {
    game.player_datas
        .insert(player, PlayerData { is_alive: false });
    info!(player_id = %player, time, "player eliminated");
    if let Some(team) = team {
        recompute_team(game, players, team, Some(time));
    }
}

/// Marks `team` dead and every current member with it.
pub fn team_lose(game: &mut Game, players: &[Player], team: TeamId, time: i64) {
    let Some(data) = game.team_datas.get_mut(&team) else {
        return;
    };
    data.is_alive = false;
    data.finish_time = Some(time);

    for member in members(players, team) {
        game.player_datas
            .insert(member.id, PlayerData { is_alive: false });
    }
    info!(team_id = %team, time, "team eliminated");
}

/// Stamps a successful finish. Liveness is untouched.
pub fn team_finish(game: &mut Game, team: TeamId, time: i64) {
    if let Some(data) = game.team_datas.get_mut(&team) {
        data.finish_time = Some(time);
        info!(team_id = %team, time, "team finished");
    }
}

/// Re-derives `team`'s liveness from its current members.
///
/// A team with no members is left as it is. When the team dies here its
/// finish time becomes `time` (if given). A dead team that regains a
/// living member comes back alive with its finish time cleared.
///
/// Returns `true` if liveness changed.
pub fn recompute_team(
    game: &mut Game,
    players: &[Player],
    team: TeamId,
    time: Option<i64>,
) -> bool {
    let mut current = members(players, team).peekable();
    if current.peek().is_none() {
        return false;
    }
    let any_alive = current.any(|p| game.is_alive(p.id));

    let Some(data) = game.team_datas.get_mut(&team) else {
        return false;
    };
    if data.is_alive == any_alive {
        return false;
    }

    data.is_alive = any_alive;
    if any_alive {
        data.finish_time = None;
    } else {
        data.finish_time = time;
        info!(team_id = %team, "team eliminated, no living members");
    }
    true
}
