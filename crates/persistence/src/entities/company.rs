//! Company entity (database row mapping).

use domain::models::{AccountStatus, CompanyAccount, Plan};
use domain::ports::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Billing columns of the companies table.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyAccountEntity {
    pub id: Uuid,
    pub status: String,
    pub plan: String,
}

impl TryFrom<CompanyAccountEntity> for CompanyAccount {
    type Error = StoreError;

    fn try_from(entity: CompanyAccountEntity) -> Result<Self, Self::Error> {
        let status = AccountStatus::from_str(&entity.status).ok_or_else(|| {
            StoreError::InvalidRow(format!(
                "company {} has unknown status '{}'",
                entity.id, entity.status
            ))
        })?;

        Ok(Self {
            company_id: entity.id,
            status,
            plan: Plan::parse(&entity.plan),
        })
    }
}
