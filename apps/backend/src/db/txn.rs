use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::txn_policy;
use crate::errors::domain::DomainError;

/// Boxed future tied to the lifetime of the transaction it borrows.
pub type TxnFuture<'t, R> = Pin<Box<dyn Future<Output = Result<R, DomainError>> + Send + 't>>;

/// Execute a function within a database transaction.
///
/// Begins a transaction, runs the closure, then applies the process-wide
/// policy on Ok (commit by default, rollback under test isolation) and rolls
/// back on Err. A failure anywhere inside the closure therefore leaves no
/// partial state visible to other readers. Dropping the returned future
/// before completion also rolls the transaction back.
pub async fn with_txn<R, F>(db: &DatabaseConnection, f: F) -> Result<R, DomainError>
where
    F: for<'t> FnOnce(&'t DatabaseTransaction) -> TxnFuture<'t, R>,
{
    let txn = db.begin().await?;
    let out = f(&txn).await;

    match out {
        Ok(val) => match txn_policy::current() {
            txn_policy::TxnPolicy::CommitOnOk => {
                txn.commit().await?;
                Ok(val)
            }
            txn_policy::TxnPolicy::RollbackOnOk => {
                txn.rollback().await?;
                Ok(val)
            }
        },
        Err(err) => {
            // Best-effort rollback; preserve original error
            let _ = txn.rollback().await;
            Err(err)
        }
    }
}
