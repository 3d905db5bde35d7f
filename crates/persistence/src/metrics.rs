//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
///
/// `outcome` is `ok` or `error`, as set by [`QueryTimer::finish`].
pub fn record_query_duration(query_name: &'static str, outcome: &'static str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name,
        "outcome" => outcome
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
///
/// Called periodically by the pool metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository operation.
///
/// ```ignore
/// let timer = QueryTimer::new("find_open_session");
/// let result = sqlx::query_as::<_, WorkSessionEntity>(...).fetch_optional(&pool).await;
/// timer.finish(result)
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Start timing the query labelled `query_name`.
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time labelled with the result's outcome and
    /// passes the result through.
    pub fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        record_query_duration(self.query_name, outcome, self.start.elapsed().as_secs_f64());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_passes_result_through() {
        let ok: Result<i32, String> = QueryTimer::new("ok_query").finish(Ok(7));
        assert_eq!(ok, Ok(7));

        let err: Result<i32, String> = QueryTimer::new("failing_query").finish(Err("boom".into()));
        assert_eq!(err, Err("boom".to_string()));
    }

    #[test]
    fn test_timer_keeps_query_name() {
        let timer = QueryTimer::new("record_clock_event");
        assert_eq!(timer.query_name, "record_clock_event");
    }
}
