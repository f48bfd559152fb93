//! Which team boards this client may hold.
//!
//! A player on a team sees only that team's board. A player with no team
//! is a spectator and sees every board. The server applies the same rule
//! before sending, so on a resync the client maps whatever blocks arrived
//! onto teams in order instead of counting them itself.

use std::collections::BTreeMap;

use sweepline_board::Board;
use sweepline_protocol::{GameSettings, ProgressBlock, TeamId};
use tracing::{debug, warn};

use crate::model::{Document, Game, Team, TeamProgress};

/// How the local player relates to the teams in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Member(TeamId),
    Spectator,
}

impl Viewer {
    /// Works out the viewer from the document's own player. Before the
    /// first resync, when the client doesn't know who it is, it counts as
    /// a spectator.
    pub fn of(doc: &Document) -> Self {
        match doc.self_player().and_then(|p| p.team_id) {
            Some(team) => Self::Member(team),
            None => Self::Spectator,
        }
    }

    pub fn can_see(self, team: TeamId) -> bool {
        match self {
            Self::Member(own) => own == team,
            Self::Spectator => true,
        }
    }

    /// A blank board for `team` at the start of a round, or `Hidden`.
    pub fn fresh_progress(self, team: TeamId, settings: &GameSettings) -> TeamProgress {
        if !self.can_see(team) {
            return TeamProgress::Hidden;
        }
        match Board::new(settings.width, settings.height) {
            Ok(board) => TeamProgress::shown(board),
            Err(e) => {
                warn!(team_id = %team, error = %e, "cannot build board, keeping team hidden");
                TeamProgress::Hidden
            }
        }
    }

    /// Brings a running game's boards in line with this viewer after the
    /// local player changed team. Returns `true` if any progress changed.
    ///
    /// Boards this viewer may no longer see become `Hidden`. A member whose
    /// own team was hidden gets a blank board for it, so the reveals and
    /// flags that follow still land; what the team uncovered before the
    /// move arrives with the next resync. Other newly visible teams stay
    /// `Hidden` until then.
    pub fn reconcile(self, game: &mut Game) -> bool {
        let settings = game.settings;
        let mut changed = false;

        for (&team, data) in game.team_datas.iter_mut() {
            let shown = data.progress.is_shown();
            if shown && !self.can_see(team) {
                debug!(team_id = %team, "hiding board the viewer can no longer see");
                data.progress = TeamProgress::Hidden;
                changed = true;
            } else if !shown && self == Self::Member(team) {
                data.progress = self.fresh_progress(team, &settings);
                changed |= data.progress.is_shown();
            }
        }

        changed
    }

    /// Maps resync progress blocks onto teams.
    ///
    /// A member's single block belongs to their own team. A spectator's
    /// blocks follow the order of `teams`. Teams that get no block are
    /// `Hidden`; blocks with no team to land on are dropped.
    pub fn assign_progress(
        self,
        teams: &[Team],
        blocks: Vec<ProgressBlock>,
        settings: &GameSettings,
    ) -> BTreeMap<TeamId, TeamProgress> {
        let targets: Vec<TeamId> = match self {
            Self::Member(own) => vec![own],
            Self::Spectator => teams.iter().map(|t| t.id).collect(),
        };

        let mut progress: BTreeMap<TeamId, TeamProgress> = teams
            .iter()
            .map(|t| (t.id, TeamProgress::Hidden))
            .collect();

        let received = blocks.len();
        if received > targets.len() {
            debug!(
                received,
                expected = targets.len(),
                "dropping progress blocks with no matching team"
            );
        }

        for (team, block) in targets.into_iter().zip(blocks) {
            if !progress.contains_key(&team) {
                debug!(team_id = %team, "progress block for unknown team");
                continue;
            }
            match Board::from_parts(settings.width, settings.height, block.board, block.flags) {
                Ok(board) => {
                    progress.insert(team, TeamProgress::shown(board));
                }
                Err(e) => warn!(team_id = %team, error = %e, "discarding progress block"),
            }
        }

        progress
    }
}
