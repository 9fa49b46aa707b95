//! Store functions against a migrated in-memory SQLite database.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use chrono::Utc;
use rostersync::entity::{player, team};
use rostersync::store::{
    HistoryEntry, add_team_history_if_absent, find_team_by_abbreviation, get_players_by_external_ids,
    get_teams, history_for_player, persist_player_sync, players_on_roster, save_new_and_updated_players,
    save_new_and_updated_teams,
};
use rostersync::{Provider, connect_and_migrate};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

fn team(full_name: &str, abbreviation: &str, ids: Value) -> team::Model {
    let now = Utc::now().fixed_offset();
    team::Model {
        id: Uuid::new_v4(),
        city: None,
        name: full_name.rsplit(' ').next().unwrap_or_default().to_string(),
        full_name: full_name.to_string(),
        abbreviation: abbreviation.to_string(),
        conference: None,
        division: None,
        logo_url: None,
        nickname: None,
        external_ids: ids,
        created_at: now,
        updated_at: now,
    }
}

fn player(first: &str, last: &str, season: i32, team_id: Option<Uuid>, nba_id: i64) -> player::Model {
    let now = Utc::now().fixed_offset();
    player::Model {
        id: Uuid::new_v4(),
        provider: Provider::NbaApi,
        first_name: first.to_string(),
        last_name: last.to_string(),
        position: None,
        height: None,
        weight: None,
        jersey_number: None,
        college: None,
        country: None,
        draft_year: None,
        draft_round: None,
        draft_number: None,
        is_active: true,
        start_year: None,
        season,
        current_team_id: team_id,
        external_ids: json!({ "nba_api": { "id": nba_id } }),
        created_at: now,
        updated_at: now,
    }
}

async fn two_teams(db: &DatabaseConnection) -> (team::Model, team::Model) {
    let celtics = team("Boston Celtics", "BOS", json!({ "nba_api": { "id": 2 } }));
    let knicks = team("New York Knicks", "NYK", json!({ "nba_api": { "id": 24 } }));
    save_new_and_updated_teams(db, &[celtics.clone(), knicks.clone()], &[])
        .await
        .unwrap();
    (celtics, knicks)
}

#[tokio::test]
async fn abbreviation_lookup_ignores_case() {
    let db = setup_test_db().await;
    let (celtics, _) = two_teams(&db).await;

    let found = find_team_by_abbreviation(&db, " bos ").await.unwrap().unwrap();
    assert_eq!(found.id, celtics.id);
    assert!(find_team_by_abbreviation(&db, "XYZ").await.unwrap().is_none());
}

#[tokio::test]
async fn updated_team_keeps_its_id() {
    let db = setup_test_db().await;
    let (mut celtics, _) = two_teams(&db).await;

    celtics.external_ids = json!({ "nba_api": { "id": 2 }, "balldontlie": { "id": 2 } });
    celtics.conference = Some("East".to_string());
    save_new_and_updated_teams(&db, &[], &[celtics.clone()]).await.unwrap();

    let teams = get_teams(&db).await.unwrap();
    assert_eq!(teams.len(), 2);
    let stored = teams.iter().find(|t| t.id == celtics.id).unwrap();
    assert_eq!(stored.conference.as_deref(), Some("East"));
    assert_eq!(stored.external_ids, celtics.external_ids);
}

#[tokio::test]
async fn players_are_found_through_their_identities() {
    let db = setup_test_db().await;
    let (celtics, _) = two_teams(&db).await;

    let tatum = player("Jayson", "Tatum", 2024, Some(celtics.id), 1628369);
    let brown = player("Jaylen", "Brown", 2024, Some(celtics.id), 1627759);
    save_new_and_updated_players(&db, &[tatum.clone(), brown.clone()], &[])
        .await
        .unwrap();

    let found = get_players_by_external_ids(&db, &[1628369, 42], Provider::NbaApi).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, tatum.id);

    let other_provider = get_players_by_external_ids(&db, &[1628369], Provider::BallDontLie)
        .await
        .unwrap();
    assert!(other_provider.is_empty());
}

#[tokio::test]
async fn rewritten_identity_follows_the_player() {
    let db = setup_test_db().await;
    let mut tatum = player("Jayson", "Tatum", 2024, None, 100);
    save_new_and_updated_players(&db, &[tatum.clone()], &[]).await.unwrap();

    tatum.external_ids = json!({ "nba_api": { "id": 200 } });
    save_new_and_updated_players(&db, &[], &[tatum.clone()]).await.unwrap();

    assert!(get_players_by_external_ids(&db, &[100], Provider::NbaApi).await.unwrap().is_empty());
    let found = get_players_by_external_ids(&db, &[200], Provider::NbaApi).await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn history_rows_are_added_once() {
    let db = setup_test_db().await;
    let (celtics, _) = two_teams(&db).await;
    let tatum = player("Jayson", "Tatum", 2024, Some(celtics.id), 1628369);
    save_new_and_updated_players(&db, &[tatum.clone()], &[]).await.unwrap();

    assert!(add_team_history_if_absent(&db, tatum.id, celtics.id, 2019).await.unwrap());
    assert!(!add_team_history_if_absent(&db, tatum.id, celtics.id, 2019).await.unwrap());
    assert!(add_team_history_if_absent(&db, tatum.id, celtics.id, 2020).await.unwrap());

    let history = history_for_player(&db, tatum.id).await.unwrap();
    let seasons: Vec<i32> = history.iter().map(|h| h.season).collect();
    assert_eq!(seasons, vec![2019, 2020]);
}

#[tokio::test]
async fn persist_player_sync_counts_only_new_history() {
    let db = setup_test_db().await;
    let (celtics, knicks) = two_teams(&db).await;
    let brunson = player("Jalen", "Brunson", 2024, Some(knicks.id), 1628973);
    let entry = HistoryEntry {
        player_id: brunson.id,
        team_id: celtics.id,
        season: 2021,
    };

    let first = persist_player_sync(&db, &[brunson.clone()], &[], &[entry]).await.unwrap();
    assert_eq!((first.players, first.history_added), (1, 1));

    let second = persist_player_sync(&db, &[], &[], &[entry]).await.unwrap();
    assert_eq!((second.players, second.history_added), (0, 0));
}

#[tokio::test]
async fn roster_combines_current_players_and_history() {
    let db = setup_test_db().await;
    let (celtics, knicks) = two_teams(&db).await;

    let tatum = player("Jayson", "Tatum", 2023, Some(celtics.id), 1628369);
    let brown = player("Jaylen", "Brown", 2023, Some(celtics.id), 1627759);
    // On the Knicks now, a Celtic in 2023.
    let hart = player("Josh", "Hart", 2024, Some(knicks.id), 1628404);
    // Current team matches, season doesn't.
    let white = player("Derrick", "White", 2024, Some(celtics.id), 1628401);
    save_new_and_updated_players(&db, &[tatum, brown, hart.clone(), white], &[])
        .await
        .unwrap();
    add_team_history_if_absent(&db, hart.id, celtics.id, 2023).await.unwrap();

    let roster = players_on_roster(&db, celtics.id, 2023).await.unwrap();
    let names: Vec<&str> = roster.iter().map(|p| p.last_name.as_str()).collect();
    assert_eq!(names, vec!["Brown", "Hart", "Tatum"]);

    assert!(players_on_roster(&db, knicks.id, 2023).await.unwrap().is_empty());
}
