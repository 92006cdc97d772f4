//! Full stage lifecycle through the redb store: qualification schedule,
//! results, rankings, playoff bracket, advancement and final placement.

use tourney_core::{
    AllianceColor, EngineConfig, Field, RankingScope, Stage, StageType, Team, TeamRepository,
};
use tourney_schedule::{StageScheduler, seeded};
use tourney_state::StateStore;

fn teams(count: u32) -> Vec<Team> {
    (1..=count)
        .map(|i| Team {
            id: format!("frc{}", 1000 + i),
            index: i,
            name: format!("Team {i}"),
        })
        .collect()
}

fn fields() -> Vec<Field> {
    ["north", "south"]
        .iter()
        .map(|id| Field {
            id: id.to_string(),
            name: id.to_uppercase(),
        })
        .collect()
}

fn stage(id: &str, stage_type: StageType, rounds: u32) -> Stage {
    Stage {
        id: id.to_string(),
        tournament_id: Some("regional".to_string()),
        stage_type,
        rounds,
        teams_per_alliance: 2,
    }
}

fn scheduler() -> StageScheduler {
    let mut config = EngineConfig::default();
    config.optimizer.max_iterations = Some(3_000);
    StageScheduler::new(config)
}

#[test]
fn qualification_to_playoff_placement() {
    let mut store = StateStore::open_in_memory().unwrap();
    let scheduler = scheduler();
    let mut rng = seeded(2024);

    // ── Qualification ──────────────────────────────────────────────
    let quals = stage("quals", StageType::RoundRobin, 3);
    store.put_stage(&quals).unwrap();
    store.put_teams(&quals.id, &teams(8)).unwrap();
    store.put_fields(&quals.id, &fields()).unwrap();

    let output = {
        let repo = store.clone();
        scheduler
            .generate(&quals, &repo, &mut store, &mut rng)
            .unwrap()
    };
    assert_eq!(output.matches.len(), 6);
    let stored = store.matches_for_stage(&quals.id).unwrap();
    assert_eq!(
        stored.iter().map(|m| m.number).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6]
    );
    assert!(stored.iter().all(|m| m.field.is_some()));

    // Lower team indices always score more.
    for m in &stored {
        let red: u32 = m.red.iter().map(|&t| 100 - t).sum();
        let blue: u32 = m.blue.iter().map(|&t| 100 - t).sum();
        store
            .record_result(&quals.id, m.number, red, blue, None)
            .unwrap();
    }

    let scope = RankingScope::Stage(quals.id.clone());
    let standings = {
        let repo = store.clone();
        scheduler
            .recompute_rankings(&scope, std::slice::from_ref(&quals), &repo, &mut store)
            .unwrap()
    };
    assert_eq!(standings.len(), 8);
    assert!(standings.iter().all(|r| r.matches_played == 3));
    assert_eq!(store.rankings_for_scope(&scope).unwrap().len(), 8);

    // Recomputing over the same matches changes nothing.
    let again = {
        let repo = store.clone();
        scheduler
            .recompute_rankings(&scope, std::slice::from_ref(&quals), &repo, &mut store)
            .unwrap()
    };
    assert_eq!(again, standings);

    // ── Playoffs ───────────────────────────────────────────────────
    let playoffs = stage("playoffs", StageType::Playoff, 2);
    store.put_stage(&playoffs).unwrap();
    let all_teams = teams(8);
    let seeded_roster: Vec<Team> = standings
        .iter()
        .filter_map(|r| all_teams.iter().find(|t| t.index == r.team).cloned())
        .collect();
    store.put_teams(&playoffs.id, &seeded_roster).unwrap();
    store.put_fields(&playoffs.id, &fields()).unwrap();

    let bracket_output = {
        let repo = store.clone();
        scheduler
            .generate(&playoffs, &repo, &mut store, &mut rng)
            .unwrap()
    };
    assert_eq!(bracket_output.matches.len(), 3);
    assert_eq!(bracket_output.advancements.len(), 2);

    let top_seed = &seeded_roster[0..2];
    let first = store.get_match(&playoffs.id, 1).unwrap().unwrap();
    assert_eq!(
        first.red,
        top_seed.iter().map(|t| t.index).collect::<Vec<_>>()
    );

    // RED wins both semifinals, BLUE wins the final.
    for number in 1..=2 {
        store
            .record_result(&playoffs.id, number, 50, 20, Some(AllianceColor::Red))
            .unwrap();
        store.advance_bracket_match(&playoffs.id, number).unwrap();
    }
    let final_match = store.get_match(&playoffs.id, 3).unwrap().unwrap();
    assert_eq!(final_match.red.len(), 2);
    assert_eq!(final_match.blue.len(), 2);

    store
        .record_result(&playoffs.id, 3, 10, 30, Some(AllianceColor::Blue))
        .unwrap();
    let placements = store.finalize_playoff(&playoffs.id).unwrap();

    assert_eq!(placements.len(), 8);
    let champions: Vec<u32> = placements
        .iter()
        .filter(|p| p.rank == 1)
        .map(|p| p.team)
        .collect();
    let mut expected = final_match.blue.clone();
    expected.sort_unstable();
    assert_eq!(champions, expected);
    assert_eq!(placements.iter().filter(|p| p.rank == 3).count(), 4);

    // The playoff stage reads back through the repository trait.
    assert_eq!(store.list_teams(&playoffs).unwrap(), seeded_roster);
}

#[test]
fn detached_stage_is_rejected() {
    let mut store = StateStore::open_in_memory().unwrap();
    let mut detached = stage("orphan", StageType::Swiss, 0);
    detached.tournament_id = None;
    store.put_stage(&detached).unwrap();

    let repo = store.clone();
    let err = scheduler()
        .generate(&detached, &repo, &mut store, &mut seeded(0))
        .unwrap_err();
    assert!(err.to_string().contains("not attached"));
}
