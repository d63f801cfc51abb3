use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => {
                r"
CREATE TABLE IF NOT EXISTS infos (
    id BIGSERIAL PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NULL,
    is_complete BOOLEAN NULL,
    remind_at_address TEXT NULL,
    remind_at_geo TEXT NULL,
    tag JSONB NULL
);
                "
            }
            sea_orm::DatabaseBackend::MySql => {
                r"
CREATE TABLE IF NOT EXISTS infos (
    id BIGINT PRIMARY KEY AUTO_INCREMENT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NULL,
    is_complete BOOLEAN NULL,
    remind_at_address TEXT NULL,
    remind_at_geo VARCHAR(64) NULL,
    tag JSON NULL
);
                "
            }
            sea_orm::DatabaseBackend::Sqlite => {
                r"
CREATE TABLE IF NOT EXISTS infos (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NULL,
    is_complete BOOLEAN NULL,
    remind_at_address TEXT NULL,
    remind_at_geo TEXT NULL,
    tag TEXT NULL
);
                "
            }
        };

        conn.execute_unprepared(sql).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("DROP TABLE IF EXISTS infos;").await?;
        Ok(())
    }
}
