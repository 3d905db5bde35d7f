//! Background job scheduler and job implementations.

mod auto_close_sessions;
mod pool_metrics;
mod scheduler;

pub use auto_close_sessions::AutoCloseSessionsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobError, JobFrequency, JobScheduler};
