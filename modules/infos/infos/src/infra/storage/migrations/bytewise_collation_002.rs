use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend};

/// Text columns sort and compare by code point, the same as the in-memory
/// store. `SQLite` already uses its `BINARY` collation.
#[derive(DeriveMigrationName)]
pub struct Migration;

const PG_UP: &[&str] = &[
    r#"ALTER TABLE infos ALTER COLUMN title TYPE TEXT COLLATE "C";"#,
    r#"ALTER TABLE infos ALTER COLUMN description TYPE TEXT COLLATE "C";"#,
    r#"ALTER TABLE infos ALTER COLUMN remind_at_address TYPE TEXT COLLATE "C";"#,
    r#"ALTER TABLE infos ALTER COLUMN remind_at_geo TYPE TEXT COLLATE "C";"#,
];

const PG_DOWN: &[&str] = &[
    r#"ALTER TABLE infos ALTER COLUMN title TYPE TEXT COLLATE "default";"#,
    r#"ALTER TABLE infos ALTER COLUMN description TYPE TEXT COLLATE "default";"#,
    r#"ALTER TABLE infos ALTER COLUMN remind_at_address TYPE TEXT COLLATE "default";"#,
    r#"ALTER TABLE infos ALTER COLUMN remind_at_geo TYPE TEXT COLLATE "default";"#,
];

const MYSQL_UP: &[&str] = &[
    "ALTER TABLE infos \
     MODIFY title TEXT CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL, \
     MODIFY description TEXT CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NULL, \
     MODIFY remind_at_address TEXT CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NULL, \
     MODIFY remind_at_geo VARCHAR(64) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NULL;",
];

const MYSQL_DOWN: &[&str] = &[
    "ALTER TABLE infos \
     MODIFY title TEXT NOT NULL, \
     MODIFY description TEXT NULL, \
     MODIFY remind_at_address TEXT NULL, \
     MODIFY remind_at_geo VARCHAR(64) NULL;",
];

pub(super) fn up_statements(backend: DatabaseBackend) -> &'static [&'static str] {
    match backend {
        DatabaseBackend::Postgres => PG_UP,
        DatabaseBackend::MySql => MYSQL_UP,
        DatabaseBackend::Sqlite => &[],
    }
}

pub(super) fn down_statements(backend: DatabaseBackend) -> &'static [&'static str] {
    match backend {
        DatabaseBackend::Postgres => PG_DOWN,
        DatabaseBackend::MySql => MYSQL_DOWN,
        DatabaseBackend::Sqlite => &[],
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for sql in up_statements(manager.get_database_backend()) {
            conn.execute_unprepared(sql).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for sql in down_statements(manager.get_database_backend()) {
            conn.execute_unprepared(sql).await?;
        }
        Ok(())
    }
}
