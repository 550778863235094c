//! Document entity - Downloadable files (prospectuses, term sheets, reports).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    /// Free-form category (e.g. `"prospectus"`, `"report"`)
    pub category: String,
    /// Location of the file as served by the backend
    pub file_url: String,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::Record for Model {
    fn record_id(&self) -> i64 {
        self.id
    }
}
