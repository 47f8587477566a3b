use std::{future::Future, time::Duration};

use tokio::time::timeout;

use crate::errors::{AppError, AppResult};

/// Runs one store call under `deadline`. Expiry is reported as
/// [`AppError::Timeout`]; storage failures get the operation and entity id
/// attached.
pub async fn bounded<T, F>(
    deadline: Duration,
    operation: &str,
    entity_id: &str,
    fut: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            let err = err.context(operation, entity_id);
            if matches!(err, AppError::DatabaseError(_) | AppError::InternalError(_)) {
                log::error!("{}", err);
            }
            Err(err)
        }
        Err(_) => {
            log::error!(
                "{} [{}] did not complete within {} ms",
                operation,
                entity_id,
                deadline.as_millis()
            );
            Err(AppError::Timeout(format!(
                "{} [{}] exceeded {} ms",
                operation,
                entity_id,
                deadline.as_millis()
            )))
        }
    }
}
