//! Admin user entity - Investor accounts as seen from the admin dashboard.
//!
//! KYC status is owned by the backend; the client only ever requests a transition
//! (see [`crate::core::user::request_kyc_transition`]).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Know-your-customer review state of an account
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// Documents submitted, awaiting review
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Identity verified
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Review failed; the investor may resubmit
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Admin user database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login email, unique across accounts
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    /// Current KYC review state
    pub kyc_status: KycStatus,
    /// Whether the account may sign in
    pub is_active: bool,
    /// When the account was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `AdminUser` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Record for Model {
    fn record_id(&self) -> i64 {
        self.id
    }
}
