//! Shared test utilities for the bond portal.
//!
//! This module provides common helper functions for setting up test databases,
//! building plain records for the in-memory source, and creating stored entities
//! with sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    config::settings::OpportunitySeed,
    core::{
        document::{self, NewDocument},
        opportunity::{self, NewOpportunity},
        post::{self, NewPost},
        project::{self, NewProject},
        transaction::{self, NewTransaction},
        user::{self, NewUser},
        webinar::{self, NewWebinar},
    },
    entities::{
        AdminUserModel, DocumentModel, KycStatus, OpportunityModel, OpportunityStatus,
        PaymentMethod, PostModel, ProjectModel, ProjectStatus, RiskLevel, TransactionModel,
        TransactionStatus, WebinarModel, WebinarStatus,
    },
    errors::Result,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness; `RUST_LOG` picks the level.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed point in time that record builders count from
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Plain records (no database)
// ---------------------------------------------------------------------------

/// Builds a user record without touching the database.
pub fn user_record(
    id: i64,
    email: &str,
    name: &str,
    kyc_status: KycStatus,
    is_active: bool,
) -> AdminUserModel {
    AdminUserModel {
        id,
        email: email.to_string(),
        name: name.to_string(),
        kyc_status,
        is_active,
        created_at: base_time() + Duration::hours(id),
    }
}

/// Users `1..=count`; KYC status cycles pending/approved/rejected, every fourth is inactive.
pub fn numbered_users(count: i64) -> Vec<AdminUserModel> {
    (1..=count)
        .map(|i| {
            let kyc = match i % 3 {
                0 => KycStatus::Rejected,
                1 => KycStatus::Pending,
                _ => KycStatus::Approved,
            };
            user_record(
                i,
                &format!("user{i}@example.com"),
                &format!("User {i}"),
                kyc,
                i % 4 != 0,
            )
        })
        .collect()
}

/// Transactions `1..=count` of user 1; status cycles through all four states.
pub fn numbered_transactions(count: i64) -> Vec<TransactionModel> {
    let statuses = [
        TransactionStatus::Pending,
        TransactionStatus::Confirmed,
        TransactionStatus::Failed,
        TransactionStatus::Refunded,
    ];
    let methods = [
        PaymentMethod::BankTransfer,
        PaymentMethod::Card,
        PaymentMethod::Crypto,
    ];
    (1..=count)
        .map(|i| {
            let index = usize::try_from(i).unwrap();
            TransactionModel {
                id: i,
                user_id: 1,
                reference: format!("TX-{i:04}"),
                amount: 100.0 * i as f64,
                status: statuses[index % statuses.len()],
                payment_method: methods[index % methods.len()],
                created_at: base_time() + Duration::hours(i),
            }
        })
        .collect()
}

/// Builds a document record without touching the database.
pub fn document_record(id: i64, title: &str, category: &str) -> DocumentModel {
    DocumentModel {
        id,
        title: title.to_string(),
        category: category.to_string(),
        file_url: format!("/files/document-{id}.pdf"),
        uploaded_at: base_time() + Duration::days(id),
    }
}

/// Documents `1..=count`; every third is a `"report"`, the rest are `"prospectus"`.
pub fn numbered_documents(count: i64) -> Vec<DocumentModel> {
    (1..=count)
        .map(|i| {
            let category = if i % 3 == 0 { "report" } else { "prospectus" };
            document_record(i, &format!("Document {i}"), category)
        })
        .collect()
}

/// Webinars `1..=count`; status cycles upcoming/live/recorded.
pub fn numbered_webinars(count: i64) -> Vec<WebinarModel> {
    (1..=count)
        .map(|i| WebinarModel {
            id: i,
            title: format!("Webinar {i}"),
            host: format!("Host {i}"),
            description: String::new(),
            status: match i % 3 {
                0 => WebinarStatus::Recorded,
                1 => WebinarStatus::Upcoming,
                _ => WebinarStatus::Live,
            },
            scheduled_at: base_time() + Duration::days(i),
        })
        .collect()
}

/// Builds an opportunity record without touching the database.
pub fn opportunity_record(id: i64, title: &str, status: OpportunityStatus) -> OpportunityModel {
    OpportunityModel {
        id,
        title: title.to_string(),
        issuer: "Test Issuer".to_string(),
        rate: 5.0,
        min_investment: 1_000.0,
        max_investment: 100_000.0,
        current_funding: 0.0,
        status,
        risk_level: RiskLevel::Medium,
        term_months: 24,
        created_at: base_time() + Duration::days(id),
    }
}

/// Valid opportunity input with the given ticket bounds.
///
/// # Defaults
/// * `issuer`: "Test Issuer"
/// * `rate`: 5.0
/// * `current_funding`: 0.0
/// * `status`: active, `risk_level`: medium
/// * `term_months`: 24
pub fn new_opportunity(title: &str, min_investment: f64, max_investment: f64) -> NewOpportunity {
    NewOpportunity {
        title: title.to_string(),
        issuer: "Test Issuer".to_string(),
        rate: 5.0,
        min_investment,
        max_investment,
        current_funding: 0.0,
        status: OpportunityStatus::Active,
        risk_level: RiskLevel::Medium,
        term_months: 24,
    }
}

/// Seed entry as it would come from config.toml.
pub fn opportunity_seed(title: &str, status: OpportunityStatus) -> OpportunitySeed {
    OpportunitySeed {
        title: title.to_string(),
        issuer: "Seed Issuer".to_string(),
        rate: 4.5,
        min_investment: 500.0,
        max_investment: 250_000.0,
        current_funding: 10_000.0,
        status,
        risk_level: RiskLevel::Low,
        term_months: 36,
    }
}

// ---------------------------------------------------------------------------
// Stored entities
// ---------------------------------------------------------------------------

/// Creates a pending, active user.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
) -> Result<AdminUserModel> {
    user::create_user(
        db,
        NewUser {
            email: email.to_string(),
            name: name.to_string(),
        },
    )
    .await
}

/// Records a pending card payment.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    reference: &str,
    amount: f64,
) -> Result<TransactionModel> {
    transaction::create_transaction(
        db,
        NewTransaction {
            user_id,
            reference: reference.to_string(),
            amount,
            status: TransactionStatus::Pending,
            payment_method: PaymentMethod::Card,
        },
    )
    .await
}

/// Records a 100.0 bank transfer with the given status.
pub async fn create_transaction_with_status(
    db: &DatabaseConnection,
    user_id: i64,
    reference: &str,
    status: TransactionStatus,
) -> Result<TransactionModel> {
    transaction::create_transaction(
        db,
        NewTransaction {
            user_id,
            reference: reference.to_string(),
            amount: 100.0,
            status,
            payment_method: PaymentMethod::BankTransfer,
        },
    )
    .await
}

/// Lists an opportunity with [`new_opportunity`] defaults.
pub async fn create_test_opportunity(
    db: &DatabaseConnection,
    title: &str,
    status: OpportunityStatus,
) -> Result<OpportunityModel> {
    let mut new = new_opportunity(title, 1_000.0, 100_000.0);
    new.status = status;
    opportunity::create_opportunity(db, new).await
}

pub async fn create_test_post(
    db: &DatabaseConnection,
    title: &str,
    category: &str,
    published: bool,
) -> Result<PostModel> {
    post::create_post(
        db,
        NewPost {
            title: title.to_string(),
            excerpt: format!("About {title}"),
            body: "Body".to_string(),
            category: category.to_string(),
            author: "Editor".to_string(),
            published,
        },
    )
    .await
}

pub async fn create_test_webinar(
    db: &DatabaseConnection,
    title: &str,
    scheduled_at: DateTime<Utc>,
) -> Result<WebinarModel> {
    webinar::create_webinar(
        db,
        NewWebinar {
            title: title.to_string(),
            host: "Host".to_string(),
            description: String::new(),
            status: WebinarStatus::Upcoming,
            scheduled_at,
        },
    )
    .await
}

pub async fn create_test_document(
    db: &DatabaseConnection,
    title: &str,
    category: &str,
) -> Result<DocumentModel> {
    document::create_document(
        db,
        NewDocument {
            title: title.to_string(),
            category: category.to_string(),
            file_url: format!("/files/{}.pdf", title.to_lowercase().replace(' ', "-")),
        },
    )
    .await
}

pub async fn create_test_project(
    db: &DatabaseConnection,
    name: &str,
    sector: &str,
) -> Result<ProjectModel> {
    project::create_project(
        db,
        NewProject {
            name: name.to_string(),
            location: "Lisbon".to_string(),
            sector: sector.to_string(),
            description: String::new(),
            status: ProjectStatus::Planning,
        },
    )
    .await
}
