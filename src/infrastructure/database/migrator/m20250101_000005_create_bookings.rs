//! Bookings table
//!
//! The unique index on (connector, date, start) rejects duplicate slot
//! claims even across server processes.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_stations::Stations;
use super::m20250101_000002_create_station_connectors::StationConnectors;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::UserId).string().not_null())
                    .col(ColumnDef::new(Bookings::StationId).string().not_null())
                    .col(ColumnDef::new(Bookings::ConnectorId).string().not_null())
                    .col(ColumnDef::new(Bookings::BookingDate).date().not_null())
                    .col(ColumnDef::new(Bookings::StartTime).string().not_null())
                    .col(ColumnDef::new(Bookings::EndTime).string().not_null())
                    .col(ColumnDef::new(Bookings::DurationHours).double().not_null())
                    .col(ColumnDef::new(Bookings::TotalPrice).double().not_null())
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::SpecialRequests).text())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_station")
                            .from(Bookings::Table, Bookings::StationId)
                            .to(Stations::Table, Stations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_connector")
                            .from(Bookings::Table, Bookings::ConnectorId)
                            .to(StationConnectors::Table, StationConnectors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_bookings_connector_slot")
                    .table(Bookings::Table)
                    .col(Bookings::ConnectorId)
                    .col(Bookings::BookingDate)
                    .col(Bookings::StartTime)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bookings {
    Table,
    Id,
    UserId,
    StationId,
    ConnectorId,
    BookingDate,
    StartTime,
    EndTime,
    DurationHours,
    TotalPrice,
    Status,
    SpecialRequests,
    CreatedAt,
    UpdatedAt,
}
