//! Transaction business logic - Recording payments and the paged transaction query.
//!
//! A transaction is written once and never changed: this module has no update or delete
//! function, and the data sources expose no [`crate::core::source::Mutator`] for transactions.

use crate::{
    core::{
        filters::TransactionFilters,
        pagination::{Page, PageQuery},
        query::{order_select, paginate, search_condition},
    },
    entities::{
        AdminUser, PaymentMethod, Transaction, TransactionColumn, TransactionModel,
        TransactionStatus, transaction,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for recording a payment
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Paying account
    pub user_id: i64,
    /// Payment reference shown to the investor
    pub reference: String,
    pub amount: f64,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
}

/// Checks an amount: it must be a finite number greater than zero.
pub fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation(
            "amount",
            format!("{amount} is not a positive amount"),
        ));
    }
    Ok(amount)
}

/// Records a payment for an existing account.
///
/// The reference is trimmed; blank references, non-positive amounts and unknown accounts are
/// rejected before anything is written.
#[instrument(skip(db))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<TransactionModel> {
    let amount = validate_amount(new.amount)?;
    let reference = new.reference.trim();
    if reference.is_empty() {
        return Err(Error::validation("reference", "Reference cannot be empty"));
    }
    if AdminUser::find_by_id(new.user_id).one(db).await?.is_none() {
        return Err(Error::NotFound {
            entity: "user",
            id: new.user_id,
        });
    }

    let transaction = transaction::ActiveModel {
        user_id: Set(new.user_id),
        reference: Set(reference.to_string()),
        amount: Set(amount),
        status: Set(new.status),
        payment_method: Set(new.payment_method),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let transaction = transaction.insert(db).await?;
    info!(
        "Recorded transaction {} ({}) of {:.2} for user {}",
        transaction.id, transaction.reference, transaction.amount, transaction.user_id
    );
    Ok(transaction)
}

/// Finds a transaction by id.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<TransactionModel>> {
    Transaction::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Every transaction of one account, newest first.
pub async fn get_transactions_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<TransactionModel>> {
    Transaction::find()
        .filter(TransactionColumn::UserId.eq(user_id))
        .order_by_desc(TransactionColumn::CreatedAt)
        .order_by_desc(TransactionColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

fn sort_column(field: &str) -> Option<TransactionColumn> {
    match field {
        "createdAt" => Some(TransactionColumn::CreatedAt),
        "amount" => Some(TransactionColumn::Amount),
        "reference" => Some(TransactionColumn::Reference),
        "status" => Some(TransactionColumn::Status),
        _ => None,
    }
}

/// Answers a page query for the admin transactions list.
pub async fn find_transactions_page(
    db: &DatabaseConnection,
    query: &PageQuery<TransactionFilters>,
) -> Result<Page<TransactionModel>> {
    let filters = &query.filters;
    let mut select = Transaction::find();
    if let Some(status) = filters.status.selected() {
        select = select.filter(TransactionColumn::Status.eq(*status));
    }
    if let Some(method) = filters.payment_method.selected() {
        select = select.filter(TransactionColumn::PaymentMethod.eq(*method));
    }
    if let Some(from) = filters.created.from {
        select = select.filter(TransactionColumn::CreatedAt.gte(from));
    }
    if let Some(to) = filters.created.to {
        select = select.filter(TransactionColumn::CreatedAt.lte(to));
    }
    if let Some(condition) =
        search_condition(query.search.as_deref(), &[TransactionColumn::Reference])
    {
        select = select.filter(condition);
    }
    let select = order_select(
        select,
        query.sort.as_ref(),
        sort_column,
        TransactionColumn::Id,
    );
    paginate(db, select, query).await
}
