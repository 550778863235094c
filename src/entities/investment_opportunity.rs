//! Investment opportunity entity - Bond offerings listed in the investor portal.
//!
//! `current_funding` and `max_investment` drive the funding progress bar. Nothing keeps
//! `current_funding` below `max_investment`; oversubscribed offerings are valid data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an offering
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "paused")]
    Paused,
}

/// Issuer-assigned risk band
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

/// Investment opportunity database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investment_opportunities")]
pub struct Model {
    /// Unique identifier for the opportunity
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Offering title
    pub title: String,
    /// Issuing company
    pub issuer: String,
    /// Annual coupon rate in percent
    pub rate: f64,
    /// Smallest accepted ticket
    pub min_investment: f64,
    /// Funding target, also the largest accepted ticket
    pub max_investment: f64,
    /// Amount raised so far
    pub current_funding: f64,
    /// Lifecycle state
    pub status: OpportunityStatus,
    /// Risk band
    pub risk_level: RiskLevel,
    /// Bond term in months
    pub term_months: i32,
    /// When the offering was listed
    pub created_at: DateTimeUtc,
}

/// `InvestmentOpportunity` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::Record for Model {
    fn record_id(&self) -> i64 {
        self.id
    }
}
