//! Device repository for database operations.

use async_trait::async_trait;
use domain::models::Device;
use domain::ports::{DeviceDirectory, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::DeviceEntity;
use crate::metrics::QueryTimer;
use crate::store_error;

/// Repository for registered check-in devices.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new DeviceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a device by its UUID, whether active or not.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<DeviceEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_device_by_id");
        let result = sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT id, company_id, name, latitude, longitude, active
            FROM devices
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
impl DeviceDirectory for DeviceRepository {
    async fn get_device(&self, id: Uuid) -> Result<Option<Device>, StoreError> {
        Ok(self
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .map(Device::from))
    }
}
