//! Post entity - Articles managed in the admin dashboard and shown on the public blog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Post database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    /// Short teaser shown on cards
    pub excerpt: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    /// Free-form category (e.g. `"market-news"`, `"guides"`)
    pub category: String,
    pub author: String,
    /// Drafts are only visible in the admin list
    pub published: bool,
    pub published_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl super::Record for Model {
    fn record_id(&self) -> i64 {
        self.id
    }
}
