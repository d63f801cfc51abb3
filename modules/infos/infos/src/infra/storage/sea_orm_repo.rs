use async_trait::async_trait;
use infos_sdk::{Info, InfoPatch, NewInfo, WhereNode};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, SqlErr, UpdateMany,
};

use crate::domain::error::DomainError;
use crate::domain::repo::{InfoQuery, InfosRepository};
use crate::infra::storage::entity::{ActiveModel as InfoAM, Column, Entity as InfoEntity};
use crate::infra::storage::filter_mapper::{apply_order, where_to_condition};

fn db_err(e: DbErr) -> DomainError {
    DomainError::database(e.to_string())
}

fn by_id(id: i64) -> Condition {
    Condition::all().add(Expr::col(Column::Id).eq(id))
}

fn matching(filter: Option<&WhereNode>) -> Condition {
    filter.map_or_else(Condition::all, where_to_condition)
}

/// Set the columns touched by `patch`.
fn apply_patch(mut update: UpdateMany<InfoEntity>, patch: &InfoPatch) -> UpdateMany<InfoEntity> {
    if let Some(title) = &patch.title {
        update = update.col_expr(Column::Title, Expr::value(title.clone()));
    }
    if let Some(desc) = &patch.desc {
        update = update.col_expr(Column::Desc, Expr::value(desc.clone()));
    }
    if let Some(is_complete) = patch.is_complete {
        update = update.col_expr(Column::IsComplete, Expr::value(is_complete));
    }
    if let Some(address) = &patch.remind_at_address {
        update = update.col_expr(Column::RemindAtAddress, Expr::value(address.clone()));
    }
    if let Some(geo) = &patch.remind_at_geo {
        update = update.col_expr(Column::RemindAtGeo, Expr::value(geo.clone()));
    }
    if let Some(tag) = &patch.tag {
        update = update.col_expr(Column::Tag, Expr::value(tag.clone()));
    }
    update
}

/// ORM-based implementation of the `InfosRepository` trait.
#[derive(Clone)]
pub struct OrmInfosRepository {
    db: DatabaseConnection,
}

impl OrmInfosRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InfosRepository for OrmInfosRepository {
    async fn create(&self, info: NewInfo) -> Result<Info, DomainError> {
        if let Some(id) = info.id {
            if self.find_by_id(id).await?.is_some() {
                return Err(DomainError::duplicate_id(id));
            }
        }

        let m = InfoAM {
            id: info.id.map_or(ActiveValue::NotSet, Set),
            title: Set(info.title),
            desc: Set(info.desc),
            is_complete: Set(info.is_complete),
            remind_at_address: Set(info.remind_at_address),
            remind_at_geo: Set(info.remind_at_geo),
            tag: Set(info.tag),
        };

        let stored = m.insert(&self.db).await.map_err(|e| match (e.sql_err(), info.id) {
            (Some(SqlErr::UniqueConstraintViolation(_)), Some(id)) => DomainError::duplicate_id(id),
            _ => db_err(e),
        })?;
        Ok(stored.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Info>, DomainError> {
        let found = InfoEntity::find()
            .filter(by_id(id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find(&self, query: &InfoQuery) -> Result<Vec<Info>, DomainError> {
        let mut select = InfoEntity::find().filter(matching(query.where_clause.as_ref()));
        select = apply_order(select, &query.order);

        // Drivers bind LIMIT/OFFSET as i64.
        let bindable = |v: u64| v.min(i64::MAX.unsigned_abs());
        match (query.limit.map(bindable), query.offset.map(bindable)) {
            (Some(limit), offset) => {
                select = select.limit(limit).offset(offset);
            }
            // OFFSET needs a LIMIT on SQLite.
            (None, Some(offset)) => {
                select = select.limit(i64::MAX.unsigned_abs()).offset(offset);
            }
            (None, None) => {}
        }

        let rows = select.all(&self.db).await.map_err(db_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn replace(&self, info: Info) -> Result<bool, DomainError> {
        let result = InfoEntity::update_many()
            .col_expr(Column::Title, Expr::value(info.title))
            .col_expr(Column::Desc, Expr::value(info.desc))
            .col_expr(Column::IsComplete, Expr::value(info.is_complete))
            .col_expr(Column::RemindAtAddress, Expr::value(info.remind_at_address))
            .col_expr(Column::RemindAtGeo, Expr::value(info.remind_at_geo))
            .col_expr(Column::Tag, Expr::value(info.tag))
            .filter(by_id(info.id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn update(&self, id: i64, patch: &InfoPatch) -> Result<bool, DomainError> {
        if patch.is_empty() {
            return Ok(self.find_by_id(id).await?.is_some());
        }

        let result = apply_patch(InfoEntity::update_many(), patch)
            .filter(by_id(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = InfoEntity::delete_many()
            .filter(by_id(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn update_all(
        &self,
        patch: &InfoPatch,
        filter: Option<&WhereNode>,
    ) -> Result<u64, DomainError> {
        if patch.is_empty() {
            return self.count(filter).await;
        }

        let result = apply_patch(InfoEntity::update_many(), patch)
            .filter(matching(filter))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn count(&self, filter: Option<&WhereNode>) -> Result<u64, DomainError> {
        InfoEntity::find()
            .filter(matching(filter))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
