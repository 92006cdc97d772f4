//! Bracket advancement and final playoff placement.

use tracing::{debug, info};
use tourney_core::{BracketAdvancement, OPEN_STATION, PlayoffPlacement, TeamIndex};

use crate::bracket::Bracket;
use crate::error::{ScheduleError, ScheduleResult};

/// Routes the winner of a completed bracket match into its next match.
///
/// Callers must advance each completed match at most once, inside one
/// storage transaction; nothing here dedupes repeated calls.
pub struct BracketAdvancer;

impl BracketAdvancer {
    /// Copy the non-surrogate winners of `number` into the target match's
    /// target alliance, each at its own station. A surrogate's station is
    /// left as [`OPEN_STATION`]. Returns the advancement applied.
    pub fn advance(bracket: &mut Bracket, number: u32) -> ScheduleResult<BracketAdvancement> {
        let source = bracket
            .get(number)
            .ok_or(ScheduleError::MatchNotFound(number))?;
        if !source.is_completed() {
            return Err(ScheduleError::MatchNotCompleted(number));
        }
        let winner = source
            .winner
            .ok_or(ScheduleError::MissingWinningAlliance(number))?;
        let winners: Vec<TeamIndex> = source
            .alliance(winner)
            .iter()
            .map(|&t| if source.is_surrogate(t) { OPEN_STATION } else { t })
            .collect();

        let advancement = *bracket
            .advancements
            .get(&number)
            .ok_or(ScheduleError::NoAdvancementRecord(number))?;

        let target = bracket
            .get_mut(advancement.target)
            .ok_or(ScheduleError::MatchNotFound(advancement.target))?;
        *target.alliance_mut(advancement.color) = winners.clone();

        debug!(
            source = number,
            target = advancement.target,
            color = %advancement.color,
            teams = ?winners,
            "winners advanced"
        );
        Ok(advancement)
    }
}

/// Assigns final placements once every bracket match is completed.
pub struct PlayoffRankingFinalizer;

impl PlayoffRankingFinalizer {
    /// Final winners rank 1 and final losers rank 2. Losers of round `k`
    /// tie at `2^(rounds − k) + 1`. Output is sorted by rank, then team.
    pub fn finalize(bracket: &Bracket) -> ScheduleResult<Vec<PlayoffPlacement>> {
        if let Some(open) = bracket.matches.values().find(|m| !m.is_completed()) {
            return Err(ScheduleError::IncompleteBracket(open.number));
        }

        let mut placements = Vec::new();
        for m in bracket.matches.values() {
            let winner = m
                .winner
                .ok_or(ScheduleError::MissingWinningAlliance(m.number))?;
            let loser_rank = if m.round >= bracket.rounds {
                for &team in m.alliance(winner).iter().filter(|&&t| !m.is_surrogate(t)) {
                    placements.push(PlayoffPlacement { team, rank: 1 });
                }
                2
            } else {
                (1u32 << (bracket.rounds - m.round)) + 1
            };
            for &team in m
                .alliance(winner.opposite())
                .iter()
                .filter(|&&t| !m.is_surrogate(t))
            {
                placements.push(PlayoffPlacement {
                    team,
                    rank: loser_rank,
                });
            }
        }

        placements.sort_by_key(|p| (p.rank, p.team));
        info!(
            rounds = bracket.rounds,
            placed = placements.len(),
            "playoff placements finalized"
        );
        Ok(placements)
    }
}
