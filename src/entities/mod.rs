//! Entity module - Contains all SeaORM entity definitions for the platform's records.
//! Each entity has a Model struct for data and an Entity struct for operations.
//! Models double as the item type of the list controllers.

pub mod admin_user;
pub mod document;
pub mod investment_opportunity;
pub mod post;
pub mod project;
pub mod transaction;
pub mod webinar;

// Re-export specific types to avoid conflicts
pub use admin_user::{
    Column as AdminUserColumn, Entity as AdminUser, KycStatus, Model as AdminUserModel,
};
pub use document::{Column as DocumentColumn, Entity as Document, Model as DocumentModel};
pub use investment_opportunity::{
    Column as OpportunityColumn, Entity as InvestmentOpportunity, Model as OpportunityModel,
    OpportunityStatus, RiskLevel,
};
pub use post::{Column as PostColumn, Entity as Post, Model as PostModel};
pub use project::{Column as ProjectColumn, Entity as Project, Model as ProjectModel, ProjectStatus};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel, PaymentMethod,
    TransactionStatus,
};
pub use webinar::{Column as WebinarColumn, Entity as Webinar, Model as WebinarModel, WebinarStatus};

/// A record with a stable numeric identity, used by list controllers to locate rows.
pub trait Record {
    /// Primary key of the record
    fn record_id(&self) -> i64;
}
