//! Initial roster schema: teams, players, history, identities, diagnostics.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_teams(manager).await?;
        self.create_players(manager).await?;
        self.create_player_team_history(manager).await?;
        self.create_external_identities(manager).await?;
        self.create_diagnostic_log(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiagnosticLog::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExternalIdentities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlayerTeamHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_teams(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    // Display
                    .col(ColumnDef::new(Teams::City).string().null())
                    .col(ColumnDef::new(Teams::Name).string().not_null())
                    .col(ColumnDef::new(Teams::FullName).string().not_null())
                    .col(ColumnDef::new(Teams::Abbreviation).string().not_null())
                    .col(ColumnDef::new(Teams::Conference).string().null())
                    .col(ColumnDef::new(Teams::Division).string().null())
                    .col(ColumnDef::new(Teams::LogoUrl).text().null())
                    .col(ColumnDef::new(Teams::Nickname).string().null())
                    // Identity
                    .col(
                        ColumnDef::new(Teams::ExternalIds)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(Teams::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Teams::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teams_full_name")
                    .table(Teams::Table)
                    .col(Teams::FullName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teams_abbreviation")
                    .table(Teams::Table)
                    .col(Teams::Abbreviation)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_players(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Players::Provider).string().not_null())
                    // Identity
                    .col(ColumnDef::new(Players::FirstName).string().not_null())
                    .col(ColumnDef::new(Players::LastName).string().not_null())
                    .col(ColumnDef::new(Players::Position).string().null())
                    .col(ColumnDef::new(Players::Height).string().null())
                    .col(ColumnDef::new(Players::Weight).integer().null())
                    .col(ColumnDef::new(Players::JerseyNumber).string().null())
                    .col(ColumnDef::new(Players::College).string().null())
                    .col(ColumnDef::new(Players::Country).string().null())
                    // Career
                    .col(ColumnDef::new(Players::DraftYear).integer().null())
                    .col(ColumnDef::new(Players::DraftRound).integer().null())
                    .col(ColumnDef::new(Players::DraftNumber).integer().null())
                    .col(
                        ColumnDef::new(Players::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Players::StartYear).integer().null())
                    // Season
                    .col(ColumnDef::new(Players::Season).integer().not_null())
                    .col(ColumnDef::new(Players::CurrentTeamId).uuid().null())
                    .col(
                        ColumnDef::new(Players::ExternalIds)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Players::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_current_team")
                            .from(Players::Table, Players::CurrentTeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_players_team_season")
                    .table(Players::Table)
                    .col(Players::CurrentTeamId)
                    .col(Players::Season)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_player_team_history(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerTeamHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerTeamHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayerTeamHistory::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(PlayerTeamHistory::TeamId).uuid().not_null())
                    .col(ColumnDef::new(PlayerTeamHistory::Season).integer().not_null())
                    .col(
                        ColumnDef::new(PlayerTeamHistory::AcquiredAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlayerTeamHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_player")
                            .from(PlayerTeamHistory::Table, PlayerTeamHistory::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_team")
                            .from(PlayerTeamHistory::Table, PlayerTeamHistory::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (player, team, season)
        manager
            .create_index(
                Index::create()
                    .name("idx_history_player_team_season")
                    .table(PlayerTeamHistory::Table)
                    .col(PlayerTeamHistory::PlayerId)
                    .col(PlayerTeamHistory::TeamId)
                    .col(PlayerTeamHistory::Season)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_external_identities(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExternalIdentities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExternalIdentities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExternalIdentities::EntityKind)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExternalIdentities::EntityId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExternalIdentities::Provider)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExternalIdentities::ExternalId)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // A provider id belongs to exactly one team and one player
        manager
            .create_index(
                Index::create()
                    .name("idx_identities_kind_provider_external")
                    .table(ExternalIdentities::Table)
                    .col(ExternalIdentities::EntityKind)
                    .col(ExternalIdentities::Provider)
                    .col(ExternalIdentities::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_identities_entity")
                    .table(ExternalIdentities::Table)
                    .col(ExternalIdentities::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_diagnostic_log(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiagnosticLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiagnosticLog::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DiagnosticLog::LoggedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(DiagnosticLog::Category).string().not_null())
                    .col(ColumnDef::new(DiagnosticLog::Message).text().not_null())
                    .col(ColumnDef::new(DiagnosticLog::Context).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_diagnostic_log_category")
                    .table(DiagnosticLog::Table)
                    .col(DiagnosticLog::Category)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    City,
    Name,
    FullName,
    Abbreviation,
    Conference,
    Division,
    LogoUrl,
    Nickname,
    ExternalIds,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    Provider,
    FirstName,
    LastName,
    Position,
    Height,
    Weight,
    JerseyNumber,
    College,
    Country,
    DraftYear,
    DraftRound,
    DraftNumber,
    IsActive,
    StartYear,
    Season,
    CurrentTeamId,
    ExternalIds,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PlayerTeamHistory {
    Table,
    Id,
    PlayerId,
    TeamId,
    Season,
    AcquiredAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ExternalIdentities {
    Table,
    Id,
    EntityKind,
    EntityId,
    Provider,
    ExternalId,
}

#[derive(DeriveIden)]
enum DiagnosticLog {
    Table,
    Id,
    LoggedAt,
    Category,
    Message,
    Context,
}
