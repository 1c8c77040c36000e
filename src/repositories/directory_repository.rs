use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder,
};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::db::query_builder::{case_insensitive_like, TextMatch};
use crate::db::Pagination;
use crate::entities::NamedEntity;
use crate::errors::ServiceError;
use crate::repositories::Repository;

use super::BaseRepository;

/// Optional `name` filter on store and employee listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NameFilter {
    #[default]
    Any,
    In(Vec<String>),
    Like(String),
}

impl NameFilter {
    /// Comma-separated values are a membership test, a single value is a pattern.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.and_then(TextMatch::parse) {
            None => NameFilter::Any,
            Some(TextMatch::OneOf(names)) => NameFilter::In(names),
            Some(TextMatch::Pattern(pattern)) => NameFilter::Like(pattern),
        }
    }

    /// Stable textual form, used in cache keys
    pub fn cache_fragment(&self) -> String {
        match self {
            NameFilter::Any => "*".to_string(),
            NameFilter::In(names) => format!("in:{}", names.join(",")),
            NameFilter::Like(pattern) => format!("like:{}", pattern.to_lowercase()),
        }
    }
}

/// Listing and bulk creation for stores and employees
#[derive(Debug, Clone)]
pub struct DirectoryRepository<E> {
    base: BaseRepository,
    entity: PhantomData<E>,
}

impl<E> DirectoryRepository<E>
where
    E: NamedEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: Send,
{
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
            entity: PhantomData,
        }
    }

    /// Filter by name, then paginate, ordered by id
    pub async fn list_page(
        &self,
        pagination: Pagination,
        filter: &NameFilter,
    ) -> Result<Vec<E::Model>, ServiceError> {
        let select = match filter {
            NameFilter::Any => E::find(),
            NameFilter::In(names) => E::find().filter(E::name_column().is_in(names.iter().cloned())),
            NameFilter::Like(pattern) => {
                E::find().filter(case_insensitive_like(E::name_column(), pattern))
            }
        };
        let select = pagination.apply(select.order_by_asc(E::id_column()));

        self.base
            .access()
            .execute("directory.list_page", |db| select.all(db))
            .await
    }

    pub async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
        let found = self
            .base
            .access()
            .execute("directory.find_by_id", |db| {
                E::find().filter(E::id_column().eq(id)).one(db)
            })
            .await?;
        Ok(found.is_some())
    }

    /// Create one row per name and return the generated id for each
    pub async fn insert_names<C>(&self, conn: &C, names: &[String]) -> Result<HashMap<String, i32>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut ids = HashMap::with_capacity(names.len());
        for name in names {
            let model = E::active_from_name(name.clone()).insert(conn).await?;
            ids.insert(name.clone(), E::model_id(&model));
        }
        Ok(ids)
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}
