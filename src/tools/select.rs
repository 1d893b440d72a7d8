//! The guarded execution path behind the `select` tool.

use crate::constants::LOG_QUERY_PREVIEW_LEN;
use crate::database::{truncate_for_log, QueryResult, QueryRunner};
use crate::error::{log_error, ServerError};
use crate::security::QueryGuard;
use tracing::debug;

/// Validate `query` and, only if the gate admits it, hand it to `runner`.
///
/// The runner receives the original string, untrimmed and with its casing
/// intact. Rejections and driver failures are logged with their category.
pub async fn guarded_select<R: QueryRunner>(
    guard: &QueryGuard,
    runner: &R,
    query: &str,
) -> Result<QueryResult, ServerError> {
    let admitted = match guard.admit(query) {
        Ok(q) => q,
        Err(rejection) => {
            let err = ServerError::from(rejection);
            debug!(
                "Rejected query: {}",
                truncate_for_log(query, LOG_QUERY_PREVIEW_LEN)
            );
            log_error(&err);
            return Err(err);
        }
    };

    runner.execute_query(admitted).await.inspect_err(log_error)
}
