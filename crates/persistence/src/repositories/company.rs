//! Company repository.

use async_trait::async_trait;
use domain::models::CompanyAccount;
use domain::ports::{CompanyDirectory, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CompanyAccountEntity;
use crate::metrics::QueryTimer;
use crate::store_error;

/// Repository for company billing state.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_account(
        &self,
        company_id: Uuid,
    ) -> Result<Option<CompanyAccountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_company_account");
        let result = sqlx::query_as::<_, CompanyAccountEntity>(
            r#"
            SELECT id, status, plan
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }
}

#[async_trait]
impl CompanyDirectory for CompanyRepository {
    async fn get_account(&self, company_id: Uuid) -> Result<Option<CompanyAccount>, StoreError> {
        self.find_account(company_id)
            .await
            .map_err(store_error)?
            .map(CompanyAccount::try_from)
            .transpose()
    }
}
