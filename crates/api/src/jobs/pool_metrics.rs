//! Background job to record connection pool metrics.

use sqlx::PgPool;

use super::scheduler::{Job, JobError, JobFrequency};

/// Seconds between pool gauge samples.
const SAMPLE_INTERVAL_SECS: u64 = 10;

/// Job that samples the connection pool into gauges.
pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    /// Create a job sampling `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(SAMPLE_INTERVAL_SECS)
    }

    async fn execute(&self) -> Result<(), JobError> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn test_job_metadata() {
        // connect_lazy never opens a connection
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/timeclock_test")
            .unwrap();
        let job = PoolMetricsJob::new(pool);
        assert_eq!(job.name(), "pool_metrics");
        assert_eq!(job.frequency().duration().as_secs(), SAMPLE_INTERVAL_SECS);
        assert!(job.execute().await.is_ok());
    }
}
