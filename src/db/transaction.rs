/*!
 * Transaction helper
 *
 * Runs a closure inside a database transaction, committing on success and
 * rolling back on any error.
 */

use crate::errors::ServiceError;
use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute a function within a database transaction
///
/// The `operation` label is attached to logs and metrics.
///
/// # Example
///
/// ```rust,ignore
/// let removed = run_in_transaction(&db, "delete_week", move |txn| {
///     Box::pin(async move {
///         let res = DailyEmployeeHours::delete_many().exec(txn).await?;
///         Ok(res.rows_affected)
///     })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<F, T>(
    db: &DatabaseConnection,
    operation: &'static str,
    f: F,
) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    let transaction_id = Uuid::new_v4();
    let start = Instant::now();

    debug!(transaction_id = %transaction_id, operation, "Starting database transaction");
    counter!("shopfloor_db.transaction.started", 1);

    let result = db.transaction::<_, T, ServiceError>(f).await;

    let elapsed = start.elapsed();
    histogram!("shopfloor_db.transaction.duration", elapsed);

    match &result {
        Ok(_) => {
            counter!("shopfloor_db.transaction.committed", 1);
            debug!(transaction_id = %transaction_id, operation, "Transaction committed in {:?}", elapsed);
        }
        Err(_) => {
            counter!("shopfloor_db.transaction.rolled_back", 1);
            warn!(transaction_id = %transaction_id, operation, "Transaction rolled back after {:?}", elapsed);
        }
    }

    result.map_err(|e| match e {
        TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
        TransactionError::Transaction(err) => err,
    })
}
