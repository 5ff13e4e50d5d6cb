use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_stations::Stations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StationConnectors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StationConnectors::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StationConnectors::StationId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StationConnectors::ConnectorType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StationConnectors::PowerOutput)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StationConnectors::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(StationConnectors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_station_connectors_station")
                            .from(StationConnectors::Table, StationConnectors::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_station_connectors_station")
                    .table(StationConnectors::Table)
                    .col(StationConnectors::StationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StationConnectors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum StationConnectors {
    Table,
    Id,
    StationId,
    ConnectorType,
    PowerOutput,
    Available,
    CreatedAt,
}
