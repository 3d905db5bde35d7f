//! Profile entity (database row mapping).

use domain::models::{Profile, Role};
use domain::ports::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub role: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

impl TryFrom<ProfileEntity> for Profile {
    type Error = StoreError;

    fn try_from(entity: ProfileEntity) -> Result<Self, Self::Error> {
        let role = Role::from_str(&entity.role).ok_or_else(|| {
            StoreError::InvalidRow(format!("profile {} has unknown role '{}'", entity.id, entity.role))
        })?;

        Ok(Self {
            id: entity.id,
            company_id: entity.company_id,
            role,
            full_name: entity.full_name,
            is_active: entity.is_active,
        })
    }
}
