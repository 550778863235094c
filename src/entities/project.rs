//! Project entity - Infrastructure projects financed by the listed bonds.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery stage of a project
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "planning")]
    Planning,
    #[sea_orm(string_value = "funding")]
    Funding,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Project database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub location: String,
    /// Industry sector (e.g. `"solar"`, `"water"`)
    pub sector: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: ProjectStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::Record for Model {
    fn record_id(&self) -> i64 {
        self.id
    }
}
