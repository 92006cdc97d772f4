//! Plain-text reports for schedules, brackets and standings.

use tourney_core::{Match, OPEN_STATION, PlayoffPlacement, TeamIndex, TeamRanking};

use crate::bracket::Bracket;
use crate::optimizer::OptimizationReport;
use crate::score::ScoreBreakdown;

fn roster(m: &Match, teams: &[TeamIndex]) -> String {
    if teams.is_empty() {
        return "TBD".to_string();
    }
    teams
        .iter()
        .map(|&t| {
            if t == OPEN_STATION {
                "-".to_string()
            } else if m.is_surrogate(t) {
                format!("{t}*")
            } else {
                t.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per match; surrogates are marked with `*`.
pub fn schedule_report(title: &str, matches: &[Match]) -> String {
    let mut report = String::new();
    report.push_str(&format!("=== {title} ===\n\n"));
    report.push_str(&format!(
        "{:>5} {:>5} {:<10} {:<20} {:<20}\n",
        "Match", "Round", "Field", "Red", "Blue"
    ));
    report.push_str(&"-".repeat(64));
    report.push('\n');

    for m in matches {
        report.push_str(&format!(
            "{:>5} {:>5} {:<10} {:<20} {:<20}\n",
            m.number,
            m.round,
            m.field.as_deref().unwrap_or("-"),
            roster(m, &m.red),
            roster(m, &m.blue),
        ));
    }

    if matches.iter().any(|m| !m.surrogates.is_empty()) {
        report.push_str("\n* surrogate appearance, not ranked\n");
    }
    report
}

pub fn optimization_summary(report: &OptimizationReport, breakdown: &ScoreBreakdown) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Score: {:.2} -> {:.2} after {} iterations ({} accepted, {} invalid swaps, T={:.4})\n",
        report.initial_score,
        report.best_score,
        report.iterations,
        report.accepted,
        report.invalid_swaps,
        report.final_temperature
    ));
    out.push_str(&format!(
        "  partner {:.2}  opponent {:.2}  separation {:.2}  color {:.2}  station {:.2}\n",
        breakdown.partner_repeat,
        breakdown.opponent_repeat,
        breakdown.separation,
        breakdown.color_imbalance,
        breakdown.station_imbalance
    ));
    out
}

/// Matches grouped by round, with where each winner goes.
pub fn bracket_report(bracket: &Bracket) -> String {
    let mut report = String::new();
    report.push_str(&format!("=== Bracket: {} rounds ===\n", bracket.rounds));

    for round in 1..=bracket.rounds {
        let label = match bracket.rounds - round {
            0 => "Final".to_string(),
            1 => "Semifinals".to_string(),
            2 => "Quarterfinals".to_string(),
            _ => format!("Round {round}"),
        };
        report.push_str(&format!("\n{label}\n"));
        for m in bracket.round(round) {
            let next = match bracket.advancements.get(&m.number) {
                Some(link) => format!(" -> match {} {}", link.target, link.color),
                None => String::new(),
            };
            report.push_str(&format!(
                "  #{:<3} {:<16} vs {:<16}{}\n",
                m.number,
                roster(m, &m.red),
                roster(m, &m.blue),
                next
            ));
        }
    }
    report
}

pub fn standings_report(standings: &[TeamRanking]) -> String {
    let mut report = String::new();
    report.push_str(&format!(
        "{:>4} {:>6} {:>4} {:>4} {:>4} {:>4} {:>7} {:>6}\n",
        "Rank", "Team", "RP", "W", "L", "T", "OWP", "Diff"
    ));
    report.push_str(&"-".repeat(46));
    report.push('\n');
    for r in standings {
        report.push_str(&format!(
            "{:>4} {:>6} {:>4} {:>4} {:>4} {:>4} {:>7.3} {:>6}\n",
            r.rank.map(|n| n.to_string()).unwrap_or_default(),
            r.team,
            r.ranking_points(),
            r.wins,
            r.losses,
            r.ties,
            r.opponent_win_percentage,
            r.point_differential()
        ));
    }
    report
}

pub fn placements_report(placements: &[PlayoffPlacement]) -> String {
    let mut report = String::from("Final placements:\n");
    for p in placements {
        report.push_str(&format!("  {:>3}. team {}\n", p.rank, p.team));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::BracketBuilder;

    #[test]
    fn schedule_marks_surrogates() {
        let mut m = Match::new(1, 1, vec![1, 2], vec![3, 4]);
        m.surrogates.insert(4);
        m.field = Some("north".to_string());
        let text = schedule_report("Quals", &[m]);

        assert!(text.starts_with("=== Quals ===\n"));
        assert!(text.contains("north"));
        assert!(text.contains("3 4*"));
        assert!(text.contains("surrogate appearance"));
    }

    #[test]
    fn bracket_shows_links_and_placeholders() {
        let bracket = BracketBuilder::new(1)
            .build(&[vec![1], vec![2], vec![3], vec![4]], 2)
            .unwrap();
        let text = bracket_report(&bracket);

        assert!(text.contains("Semifinals"));
        assert!(text.contains("Final"));
        assert!(text.contains("-> match 3 RED"));
        assert!(text.contains("-> match 3 BLUE"));
        assert!(text.contains("TBD"));
    }

    #[test]
    fn standings_list_every_team() {
        let mut first = TeamRanking::new(7);
        first.wins = 2;
        first.matches_played = 2;
        first.rank = Some(1);
        let mut second = TeamRanking::new(3);
        second.rank = Some(2);
        let text = standings_report(&[first, second]);
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(2).unwrap().contains('7'));
    }
}
