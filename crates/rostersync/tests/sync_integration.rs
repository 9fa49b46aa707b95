//! End-to-end sync runs against an in-memory SQLite database.
//!
//! Provider clients are faked; everything below them (team merge,
//! reconciliation, the sea-orm store and its transactions) is real.

#![cfg(all(feature = "sqlite", feature = "migrate"))]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rostersync::entity::player::Entity as Player;
use rostersync::entity::player_team_history::Entity as PlayerTeamHistory;
use rostersync::entity::team::Entity as Team;
use rostersync::provider::{self, Fetched, PlayerRecord, ProviderClient, ProviderError, TeamRecord};
use rostersync::store::{
    CATEGORY_IDENTITY, CATEGORY_TEAM_RESOLUTION, diagnostics_by_category, find_team_by_abbreviation,
    history_for_player,
};
use rostersync::sync::{ProgressCallback, SyncEngine, SyncOptions, TeamLookup};
use rostersync::{Provider, SeaOrmStore, connect_and_migrate};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::{Value, json};

/// A provider whose responses tests can change between runs.
struct ScriptedClient {
    provider: Provider,
    teams: Mutex<Vec<TeamRecord>>,
    players: Mutex<Vec<PlayerRecord>>,
    down: Mutex<bool>,
}

impl ScriptedClient {
    fn new(provider: Provider) -> Arc<Self> {
        Arc::new(Self {
            provider,
            teams: Mutex::new(Vec::new()),
            players: Mutex::new(Vec::new()),
            down: Mutex::new(false),
        })
    }

    fn set_teams(&self, teams: Vec<TeamRecord>) {
        *self.teams.lock().unwrap() = teams;
    }

    fn set_players(&self, players: Vec<PlayerRecord>) {
        *self.players.lock().unwrap() = players;
    }
}

#[async_trait]
impl ProviderClient for ScriptedClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch_teams(&self, _on_progress: Option<&ProgressCallback>) -> provider::Result<Fetched<TeamRecord>> {
        if *self.down.lock().unwrap() {
            return Err(ProviderError::api(503, "maintenance"));
        }
        Ok(Fetched {
            items: self.teams.lock().unwrap().clone(),
            ..Fetched::default()
        })
    }

    async fn fetch_players(
        &self,
        _teams: &TeamLookup,
        _on_progress: Option<&ProgressCallback>,
    ) -> provider::Result<Fetched<PlayerRecord>> {
        if *self.down.lock().unwrap() {
            return Err(ProviderError::api(503, "maintenance"));
        }
        Ok(Fetched {
            items: self.players.lock().unwrap().clone(),
            ..Fetched::default()
        })
    }
}

/// The engine's store and the assertions share one in-memory database.
async fn setup_test_db() -> Arc<DatabaseConnection> {
    let db = connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    Arc::new(db)
}

fn team(full_name: &str, city: &str, name: &str, abbreviation: &str, ids: Value) -> TeamRecord {
    TeamRecord {
        city: Some(city.to_string()),
        name: name.to_string(),
        full_name: full_name.to_string(),
        abbreviation: abbreviation.to_string(),
        external_ids: ids,
        ..TeamRecord::default()
    }
}

fn nba_player(id: i64, season: i32, team_id: Option<i64>) -> PlayerRecord {
    PlayerRecord {
        provider: Provider::NbaApi,
        first_name: "Malcolm".to_string(),
        last_name: "Brogdon".to_string(),
        position: Some("G".to_string()),
        height: Some("6-4".to_string()),
        weight: Some(229),
        jersey_number: Some("13".to_string()),
        college: Some("Virginia".to_string()),
        country: Some("USA".to_string()),
        draft_year: Some(2016),
        draft_round: Some(2),
        draft_number: Some(36),
        is_active: true,
        start_year: Some(2016),
        season,
        team_external_id: team_id,
        external_ids: json!({ "nba_api": { "id": id } }),
    }
}

/// balldontlie and nba_api each know three teams, spelled differently.
fn league_clients() -> (Arc<ScriptedClient>, Arc<ScriptedClient>) {
    let bdl = ScriptedClient::new(Provider::BallDontLie);
    bdl.set_teams(vec![
        team("Los Angeles Lakers", "Los Angeles", "Lakers", "LAL", json!({ "balldontlie": { "id": 14 } })),
        team("Boston Celtics", "Boston", "Celtics", "BOS", json!({ "balldontlie": { "id": 2 } })),
        team("Sacramento Kings", "Sacramento", "Kings", "SAC", json!({ "balldontlie": { "id": 26 } })),
    ]);

    let nba = ScriptedClient::new(Provider::NbaApi);
    nba.set_teams(vec![
        team("LA Lakers", "LA", "Lakers", "LAL", json!({ "nba_api": { "id": 17 } })),
        team("Boston Celtics", "Boston", "Celtics", "BOS", json!({ "nba_api": { "id": 2 } })),
        team("Sacramento Kings", "Sacramento", "Kings", "SAC", json!({ "nba_api": { "id": 30 } })),
        team("Team LeBron", "", "LeBron", "LBN", json!({ "nba_api": { "id": 99 } })),
    ]);
    (bdl, nba)
}

fn engine(db: &Arc<DatabaseConnection>, clients: &[Arc<ScriptedClient>], options: SyncOptions) -> SyncEngine {
    let clients = clients
        .iter()
        .map(|c| Arc::clone(c) as Arc<dyn ProviderClient>)
        .collect();
    SyncEngine::new(Arc::new(SeaOrmStore::new(Arc::clone(db))), clients, options)
}

#[tokio::test]
async fn team_sync_merges_providers_and_drops_non_franchises() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let engine = engine(&db, &[bdl, nba], SyncOptions::default());

    let result = engine.run_team_sync(None).await.unwrap();
    assert_eq!(result.added, 3);
    assert_eq!(Team::find().count(db.as_ref()).await.unwrap(), 3);

    let lakers = find_team_by_abbreviation(db.as_ref(), "lal").await.unwrap().unwrap();
    assert_eq!(lakers.full_name, "Los Angeles Lakers");
    assert_eq!(
        lakers.external_ids,
        json!({ "balldontlie": { "id": 14 }, "nba_api": { "id": 17 } })
    );

    let kings = find_team_by_abbreviation(db.as_ref(), "SAC").await.unwrap().unwrap();
    assert_eq!(
        kings.external_ids,
        json!({ "balldontlie": { "id": 26 }, "nba_api": { "id": 30 } })
    );
    assert!(find_team_by_abbreviation(db.as_ref(), "LBN").await.unwrap().is_none());
}

#[tokio::test]
async fn team_sync_rerun_creates_no_duplicates() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let engine = engine(&db, &[bdl, nba], SyncOptions::default());

    engine.run_team_sync(None).await.unwrap();
    let second = engine.run_team_sync(None).await.unwrap();

    assert_eq!((second.added, second.updated), (0, 0));
    assert_eq!(Team::find().count(db.as_ref()).await.unwrap(), 3);
}

#[tokio::test]
async fn team_sync_records_a_new_provider_id_as_update() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    *nba.down.lock().unwrap() = true;
    let engine = engine(&db, &[Arc::clone(&bdl), Arc::clone(&nba)], SyncOptions::default());

    let first = engine.run_team_sync(None).await.unwrap();
    assert_eq!(first.added, 3);
    assert_eq!(first.errors.len(), 1);

    *nba.down.lock().unwrap() = false;
    let second = engine.run_team_sync(None).await.unwrap();
    assert_eq!((second.added, second.updated), (0, 3));

    let celtics = find_team_by_abbreviation(db.as_ref(), "BOS").await.unwrap().unwrap();
    assert_eq!(
        celtics.external_ids,
        json!({ "balldontlie": { "id": 2 }, "nba_api": { "id": 2 } })
    );
}

#[tokio::test]
async fn player_sync_is_idempotent_and_tracks_history() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let clients = [Arc::clone(&bdl), Arc::clone(&nba)];
    engine(&db, &clients, SyncOptions::default())
        .run_team_sync(None)
        .await
        .unwrap();

    // 2021 with Boston, 2022 with the Lakers.
    nba.set_players(vec![nba_player(7, 2021, Some(2)), nba_player(7, 2022, Some(17))]);
    let engine = engine(&db, &clients, SyncOptions::default());

    let first = engine.run_player_sync(None).await.unwrap();
    assert_eq!((first.added, first.updated, first.history_added), (1, 0, 1));

    let players = Player::find().all(db.as_ref()).await.unwrap();
    assert_eq!(players.len(), 1);
    let lakers = find_team_by_abbreviation(db.as_ref(), "LAL").await.unwrap().unwrap();
    let celtics = find_team_by_abbreviation(db.as_ref(), "BOS").await.unwrap().unwrap();
    assert_eq!(players[0].current_team_id, Some(lakers.id));
    assert_eq!(players[0].season, 2022);

    let history = history_for_player(db.as_ref(), players[0].id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!((history[0].team_id, history[0].season), (celtics.id, 2021));

    let second = engine.run_player_sync(None).await.unwrap();
    assert_eq!((second.added, second.updated, second.history_added), (0, 0, 0));
    assert_eq!(Player::find().count(db.as_ref()).await.unwrap(), 1);
    assert_eq!(PlayerTeamHistory::find().count(db.as_ref()).await.unwrap(), 1);
}

#[tokio::test]
async fn height_change_alone_updates_the_player() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let clients = [Arc::clone(&bdl), Arc::clone(&nba)];
    let engine = engine(&db, &clients, SyncOptions::default());
    engine.run_team_sync(None).await.unwrap();

    nba.set_players(vec![nba_player(7, 2023, Some(2))]);
    engine.run_player_sync(None).await.unwrap();

    let mut taller = nba_player(7, 2023, Some(2));
    taller.height = Some("6-5".to_string());
    nba.set_players(vec![taller]);

    let result = engine.run_player_sync(None).await.unwrap();
    assert_eq!((result.added, result.updated), (0, 1));

    let players = Player::find().all(db.as_ref()).await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].height.as_deref(), Some("6-5"));
}

#[tokio::test]
async fn existence_only_leaves_known_players_alone() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let clients = [Arc::clone(&bdl), Arc::clone(&nba)];
    engine(&db, &clients, SyncOptions::default())
        .run_team_sync(None)
        .await
        .unwrap();

    nba.set_players(vec![nba_player(7, 2023, Some(2))]);
    let options = SyncOptions {
        existence_only: true,
        ..SyncOptions::default()
    };
    let engine = engine(&db, &clients, options);
    engine.run_player_sync(None).await.unwrap();

    let mut moved = nba_player(7, 2024, Some(17));
    moved.weight = Some(235);
    nba.set_players(vec![moved, nba_player(8, 2024, Some(17))]);

    let result = engine.run_player_sync(None).await.unwrap();
    assert_eq!((result.added, result.updated), (1, 0));
    assert_eq!(Player::find().count(db.as_ref()).await.unwrap(), 2);
}

#[tokio::test]
async fn unreadable_identity_is_skipped_and_logged() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let clients = [Arc::clone(&bdl), Arc::clone(&nba)];
    let engine = engine(&db, &clients, SyncOptions::default());
    engine.run_team_sync(None).await.unwrap();

    let mut broken = nba_player(9, 2024, Some(2));
    broken.external_ids = json!("nba_api:9");
    nba.set_players(vec![broken, nba_player(10, 2024, Some(2))]);

    let result = engine.run_player_sync(None).await.unwrap();
    assert_eq!((result.added, result.updated), (1, 0));

    let logged = diagnostics_by_category(db.as_ref(), CATEGORY_IDENTITY).await.unwrap();
    assert_eq!(logged.len(), 1);
    assert!(logged[0].message.contains("Brogdon"));
}

#[tokio::test]
async fn unknown_team_leaves_player_unassigned() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let clients = [Arc::clone(&bdl), Arc::clone(&nba)];
    let engine = engine(&db, &clients, SyncOptions::default());
    engine.run_team_sync(None).await.unwrap();

    nba.set_players(vec![nba_player(11, 2024, Some(12345))]);
    let result = engine.run_player_sync(None).await.unwrap();
    assert_eq!(result.added, 1);

    let players = Player::find().all(db.as_ref()).await.unwrap();
    assert_eq!(players[0].current_team_id, None);

    let logged = diagnostics_by_category(db.as_ref(), CATEGORY_TEAM_RESOLUTION).await.unwrap();
    assert_eq!(logged.len(), 1);
}

#[tokio::test]
async fn excluded_provider_still_feeds_team_sync() {
    let db = setup_test_db().await;
    let (bdl, nba) = league_clients();
    let mut bdl_player = nba_player(3, 2024, Some(14));
    bdl_player.provider = Provider::BallDontLie;
    bdl_player.external_ids = json!({ "balldontlie": { "id": 3 } });
    bdl.set_players(vec![bdl_player.clone()]);

    let clients = [Arc::clone(&bdl), Arc::clone(&nba)];
    let result = engine(&db, &clients, SyncOptions::default())
        .run_full_sync(None)
        .await
        .unwrap();
    assert_eq!(result.teams.added, 3);
    assert_eq!(result.players.added, 0);

    let included = engine(&db, &clients, SyncOptions::include_all())
        .run_player_sync(None)
        .await
        .unwrap();
    assert_eq!(included.added, 1);

    let player = Player::find().one(db.as_ref()).await.unwrap().unwrap();
    let lakers = find_team_by_abbreviation(db.as_ref(), "LAL").await.unwrap().unwrap();
    assert_eq!(player.provider, Provider::BallDontLie);
    assert_eq!(player.current_team_id, Some(lakers.id));
}
