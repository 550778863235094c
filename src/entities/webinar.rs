//! Webinar entity - Scheduled and recorded investor education sessions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a webinar is in its lifecycle
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum WebinarStatus {
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    #[sea_orm(string_value = "live")]
    Live,
    #[sea_orm(string_value = "recorded")]
    Recorded,
}

/// Webinar database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "webinars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    /// Presenter name
    pub host: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: WebinarStatus,
    pub scheduled_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::Record for Model {
    fn record_id(&self) -> i64 {
        self.id
    }
}
