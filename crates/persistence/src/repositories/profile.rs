//! Profile repository.

use async_trait::async_trait;
use domain::models::Profile;
use domain::ports::{ProfileDirectory, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProfileEntity;
use crate::metrics::QueryTimer;
use crate::store_error;

/// Repository for employee profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_id");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT id, company_id, role, full_name, is_active
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }
}

#[async_trait]
impl ProfileDirectory for ProfileRepository {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        self.find_by_id(id)
            .await
            .map_err(store_error)?
            .map(Profile::try_from)
            .transpose()
    }
}
