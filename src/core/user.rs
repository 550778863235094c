//! Admin user business logic - Validation, CRUD, KYC transitions and the paged user query.
//!
//! KYC status is decided by the backend's reviewers. The admin dashboard can only *request* a
//! transition, and only along the edges of the review workflow:
//!
//! ```text
//! pending ──► approved
//!    │
//!    └──────► rejected ──► pending (resubmission)
//! ```

use crate::{
    core::{
        filters::UserFilters,
        pagination::{Page, PageQuery},
        query::{order_select, paginate, search_condition},
    },
    entities::{
        AdminUser, AdminUserColumn, AdminUserModel, KycStatus, Transaction, admin_user,
        transaction,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use regex::Regex;
use sea_orm::{ActiveEnum, PaginatorTrait, QueryFilter, Set, prelude::*};
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

static EMAIL_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$"));

/// Input for creating an account from the admin dashboard
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

/// Partial update of an account; `None` fields are left alone.
///
/// KYC status is not patchable; use [`request_kyc_transition`].
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Checks an email address and returns it trimmed and lowercased.
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let re = EMAIL_RE.as_ref().map_err(|e| Error::Config {
        message: format!("Email pattern failed to compile: {e}"),
    })?;
    if !re.is_match(&email) {
        return Err(Error::validation("email", format!("'{email}' is not an email address")));
    }
    Ok(email)
}

/// Checks a display name and returns it trimmed.
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "Name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Whether moving from `from` to `to` is allowed.
///
/// Returns `Ok(false)` when nothing would change, `Ok(true)` for a real transition.
pub fn check_kyc_transition(from: KycStatus, to: KycStatus) -> Result<bool> {
    use KycStatus::{Approved, Pending, Rejected};
    match (from, to) {
        _ if from == to => Ok(false),
        (Pending, Approved | Rejected) | (Rejected, Pending) => Ok(true),
        _ => Err(Error::InvalidTransition {
            from: from.to_value(),
            to: to.to_value(),
        }),
    }
}

/// Creates an account in the `pending` KYC state.
#[instrument(skip(db))]
pub async fn create_user(db: &DatabaseConnection, new: NewUser) -> Result<AdminUserModel> {
    let email = validate_email(&new.email)?;
    let name = validate_name(&new.name)?;

    let user = admin_user::ActiveModel {
        email: Set(email),
        name: Set(name),
        kyc_status: Set(KycStatus::Pending),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let user = user.insert(db).await?;
    info!("Created user {} <{}>", user.id, user.email);
    Ok(user)
}

/// Finds an account by id.
pub async fn get_user_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<AdminUserModel>> {
    AdminUser::find_by_id(id).one(db).await.map_err(Into::into)
}

async fn require_user(db: &DatabaseConnection, id: i64) -> Result<AdminUserModel> {
    get_user_by_id(db, id)
        .await?
        .ok_or(Error::NotFound { entity: "user", id })
}

/// Applies a partial update. Every provided field is validated before anything is written.
#[instrument(skip(db))]
pub async fn update_user(
    db: &DatabaseConnection,
    id: i64,
    patch: UserPatch,
) -> Result<AdminUserModel> {
    let email = patch.email.as_deref().map(validate_email).transpose()?;
    let name = patch.name.as_deref().map(validate_name).transpose()?;

    let mut user: admin_user::ActiveModel = require_user(db, id).await?.into();
    if let Some(email) = email {
        user.email = Set(email);
    }
    if let Some(name) = name {
        user.name = Set(name);
    }
    if let Some(is_active) = patch.is_active {
        user.is_active = Set(is_active);
    }
    user.update(db).await.map_err(Into::into)
}

/// Deletes an account.
///
/// Accounts with transactions cannot be deleted since transactions are permanent; deactivate
/// them instead.
#[instrument(skip(db))]
pub async fn delete_user(db: &DatabaseConnection, id: i64) -> Result<()> {
    let user = require_user(db, id).await?;
    let transactions = Transaction::find()
        .filter(transaction::Column::UserId.eq(id))
        .count(db)
        .await?;
    if transactions > 0 {
        return Err(Error::validation(
            "id",
            format!("user {id} has {transactions} transactions and cannot be deleted"),
        ));
    }
    AdminUser::delete_by_id(user.id).exec(db).await?;
    info!("Deleted user {}", id);
    Ok(())
}

/// Requests a KYC transition and returns the account as stored afterwards.
///
/// Same-state requests succeed without writing.
#[instrument(skip(db))]
pub async fn request_kyc_transition(
    db: &DatabaseConnection,
    id: i64,
    to: KycStatus,
) -> Result<AdminUserModel> {
    let user = require_user(db, id).await?;
    if !check_kyc_transition(user.kyc_status, to)? {
        debug!("User {} already {}", id, to.to_value());
        return Ok(user);
    }
    let from = user.kyc_status;
    let mut user: admin_user::ActiveModel = user.into();
    user.kyc_status = Set(to);
    let user = user.update(db).await?;
    info!("User {} KYC {} -> {}", id, from.to_value(), to.to_value());
    Ok(user)
}

fn sort_column(field: &str) -> Option<AdminUserColumn> {
    match field {
        "email" => Some(AdminUserColumn::Email),
        "name" => Some(AdminUserColumn::Name),
        "kycStatus" => Some(AdminUserColumn::KycStatus),
        "createdAt" => Some(AdminUserColumn::CreatedAt),
        _ => None,
    }
}

/// Answers a page query for the admin users list.
pub async fn find_users_page(
    db: &DatabaseConnection,
    query: &PageQuery<UserFilters>,
) -> Result<Page<AdminUserModel>> {
    let mut select = AdminUser::find();
    if let Some(status) = query.filters.kyc_status.selected() {
        select = select.filter(AdminUserColumn::KycStatus.eq(*status));
    }
    if let Some(active) = query.filters.active.selected() {
        select = select.filter(AdminUserColumn::IsActive.eq(*active));
    }
    if let Some(condition) = search_condition(
        query.search.as_deref(),
        &[AdminUserColumn::Email, AdminUserColumn::Name],
    ) {
        select = select.filter(condition);
    }
    let select = order_select(select, query.sort.as_ref(), sort_column, AdminUserColumn::Id);
    paginate(db, select, query).await
}
