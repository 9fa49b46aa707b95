//! `rostersync roster`: who played for a team in a season.

use clap::ValueEnum;
use serde::Serialize;
use tabled::Tabled;

use rostersync::store::{find_team_by_abbreviation, players_on_roster};
use rostersync::{PlayerModel, StoreError, db};

use crate::config::Config;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One roster line for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct RosterRow {
    #[tabled(rename = "Player")]
    pub name: String,
    #[tabled(rename = "Pos")]
    pub position: String,
    #[tabled(rename = "#")]
    pub jersey: String,
    #[tabled(rename = "Height")]
    pub height: String,
    #[tabled(rename = "Weight")]
    pub weight: String,
    #[tabled(rename = "College")]
    pub college: String,
    #[tabled(rename = "Provider")]
    pub provider: String,
}

impl From<&PlayerModel> for RosterRow {
    fn from(player: &PlayerModel) -> Self {
        let dash = || "-".to_string();
        Self {
            name: format!("{} {}", player.first_name, player.last_name),
            position: player.position.clone().unwrap_or_else(dash),
            jersey: player.jersey_number.clone().unwrap_or_else(dash),
            height: player.height.clone().unwrap_or_else(dash),
            weight: player.weight.map(|w| format!("{w} lb")).unwrap_or_else(dash),
            college: player.college.clone().unwrap_or_else(dash),
            provider: player.provider.to_string(),
        }
    }
}

pub(crate) async fn handle_roster(
    abbreviation: &str,
    season: Option<i32>,
    output: OutputFormat,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;
    let team = find_team_by_abbreviation(&db, abbreviation)
        .await?
        .ok_or_else(|| StoreError::not_found_by_abbreviation(abbreviation))?;
    let season = season.unwrap_or_else(|| config.current_season());

    let players = players_on_roster(&db, team.id, season).await?;
    let rows: Vec<RosterRow> = players.iter().map(RosterRow::from).collect();

    match output {
        OutputFormat::Table => {
            println!("{} ({season}): {} players", team.full_name, rows.len());
            if !rows.is_empty() {
                let mut table = tabled::Table::new(rows);
                table.with(tabled::settings::Style::rounded());
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
