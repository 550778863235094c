//! Investment opportunity business logic - Funding progress, validation, CRUD, seeding and the
//! paged opportunity query.

use crate::{
    config::settings::OpportunitySeed,
    core::{
        filters::OpportunityFilters,
        pagination::{Page, PageQuery},
        query::{order_select, paginate, search_condition},
    },
    entities::{
        InvestmentOpportunity, OpportunityColumn, OpportunityModel, OpportunityStatus, RiskLevel,
        investment_opportunity,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Share of the funding target raised so far, in percent, clamped to `0..=100`.
///
/// Over-funded offerings are allowed to exist; they just show as full. A zero target shows as
/// empty.
pub fn funding_progress(opportunity: &OpportunityModel) -> f64 {
    if opportunity.max_investment <= 0.0 {
        return 0.0;
    }
    let progress = opportunity.current_funding / opportunity.max_investment * 100.0;
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 100.0)
    }
}

/// Input for listing a new offering
#[derive(Debug, Clone)]
pub struct NewOpportunity {
    pub title: String,
    pub issuer: String,
    pub rate: f64,
    pub min_investment: f64,
    pub max_investment: f64,
    pub current_funding: f64,
    pub status: OpportunityStatus,
    pub risk_level: RiskLevel,
    pub term_months: i32,
}

/// Partial update of an offering; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct OpportunityPatch {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub rate: Option<f64>,
    pub min_investment: Option<f64>,
    pub max_investment: Option<f64>,
    pub current_funding: Option<f64>,
    pub status: Option<OpportunityStatus>,
    pub risk_level: Option<RiskLevel>,
    pub term_months: Option<i32>,
}

impl From<&OpportunitySeed> for NewOpportunity {
    fn from(seed: &OpportunitySeed) -> Self {
        Self {
            title: seed.title.clone(),
            issuer: seed.issuer.clone(),
            rate: seed.rate,
            min_investment: seed.min_investment,
            max_investment: seed.max_investment,
            current_funding: seed.current_funding,
            status: seed.status,
            risk_level: seed.risk_level,
            term_months: seed.term_months,
        }
    }
}

/// Validates a complete offering and returns it with trimmed title and issuer.
pub fn validate_opportunity(mut new: NewOpportunity) -> Result<NewOpportunity> {
    new.title = new.title.trim().to_string();
    new.issuer = new.issuer.trim().to_string();
    if new.title.is_empty() {
        return Err(Error::validation("title", "Title cannot be empty"));
    }
    if new.issuer.is_empty() {
        return Err(Error::validation("issuer", "Issuer cannot be empty"));
    }
    if !new.rate.is_finite() || new.rate < 0.0 {
        return Err(Error::validation("rate", format!("{} is not a valid rate", new.rate)));
    }
    if !new.min_investment.is_finite() || new.min_investment <= 0.0 {
        return Err(Error::validation(
            "min_investment",
            "Minimum investment must be greater than zero",
        ));
    }
    if !new.max_investment.is_finite() || new.min_investment > new.max_investment {
        return Err(Error::validation(
            "max_investment",
            "Maximum investment cannot be below the minimum",
        ));
    }
    if !new.current_funding.is_finite() || new.current_funding < 0.0 {
        return Err(Error::validation(
            "current_funding",
            "Current funding cannot be negative",
        ));
    }
    if new.term_months <= 0 {
        return Err(Error::validation("term_months", "Term must be at least one month"));
    }
    Ok(new)
}

/// Lists a new offering.
#[instrument(skip(db), fields(title = %new.title))]
pub async fn create_opportunity<C>(db: &C, new: NewOpportunity) -> Result<OpportunityModel>
where
    C: ConnectionTrait,
{
    let new = validate_opportunity(new)?;
    let opportunity = investment_opportunity::ActiveModel {
        title: Set(new.title),
        issuer: Set(new.issuer),
        rate: Set(new.rate),
        min_investment: Set(new.min_investment),
        max_investment: Set(new.max_investment),
        current_funding: Set(new.current_funding),
        status: Set(new.status),
        risk_level: Set(new.risk_level),
        term_months: Set(new.term_months),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let opportunity = opportunity.insert(db).await?;
    info!("Listed opportunity {} ({})", opportunity.id, opportunity.title);
    Ok(opportunity)
}

/// Finds an offering by id.
pub async fn get_opportunity_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<OpportunityModel>> {
    InvestmentOpportunity::find_by_id(id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update. The merged offering must still pass [`validate_opportunity`].
#[instrument(skip(db))]
pub async fn update_opportunity(
    db: &DatabaseConnection,
    id: i64,
    patch: OpportunityPatch,
) -> Result<OpportunityModel> {
    let current = get_opportunity_by_id(db, id)
        .await?
        .ok_or(Error::NotFound {
            entity: "opportunity",
            id,
        })?;
    let merged = validate_opportunity(NewOpportunity {
        title: patch.title.unwrap_or_else(|| current.title.clone()),
        issuer: patch.issuer.unwrap_or_else(|| current.issuer.clone()),
        rate: patch.rate.unwrap_or(current.rate),
        min_investment: patch.min_investment.unwrap_or(current.min_investment),
        max_investment: patch.max_investment.unwrap_or(current.max_investment),
        current_funding: patch.current_funding.unwrap_or(current.current_funding),
        status: patch.status.unwrap_or(current.status),
        risk_level: patch.risk_level.unwrap_or(current.risk_level),
        term_months: patch.term_months.unwrap_or(current.term_months),
    })?;

    let mut opportunity: investment_opportunity::ActiveModel = current.into();
    opportunity.title = Set(merged.title);
    opportunity.issuer = Set(merged.issuer);
    opportunity.rate = Set(merged.rate);
    opportunity.min_investment = Set(merged.min_investment);
    opportunity.max_investment = Set(merged.max_investment);
    opportunity.current_funding = Set(merged.current_funding);
    opportunity.status = Set(merged.status);
    opportunity.risk_level = Set(merged.risk_level);
    opportunity.term_months = Set(merged.term_months);
    opportunity.update(db).await.map_err(Into::into)
}

/// Removes an offering.
#[instrument(skip(db))]
pub async fn delete_opportunity(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = InvestmentOpportunity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "opportunity",
            id,
        });
    }
    info!("Deleted opportunity {}", id);
    Ok(())
}

/// Lists the configured offerings if the table is still empty.
///
/// Returns how many were inserted. All seeds are inserted in one database transaction, so one
/// invalid seed leaves the table empty.
#[instrument(skip_all, fields(seeds = seeds.len()))]
pub async fn seed_opportunities(db: &DatabaseConnection, seeds: &[OpportunitySeed]) -> Result<usize> {
    let existing = InvestmentOpportunity::find().count(db).await?;
    if existing > 0 {
        info!("{} opportunities already listed, skipping seed", existing);
        return Ok(0);
    }
    if seeds.is_empty() {
        warn!("No opportunities configured to seed");
        return Ok(0);
    }

    let txn = db.begin().await?;
    for seed in seeds {
        create_opportunity(&txn, NewOpportunity::from(seed)).await?;
    }
    txn.commit().await?;
    info!("Seeded {} opportunities", seeds.len());
    Ok(seeds.len())
}

fn sort_column(field: &str) -> Option<OpportunityColumn> {
    match field {
        "createdAt" => Some(OpportunityColumn::CreatedAt),
        "rate" => Some(OpportunityColumn::Rate),
        "title" => Some(OpportunityColumn::Title),
        "termMonths" => Some(OpportunityColumn::TermMonths),
        "minInvestment" => Some(OpportunityColumn::MinInvestment),
        "currentFunding" => Some(OpportunityColumn::CurrentFunding),
        _ => None,
    }
}

/// Answers a page query for the investment opportunities list.
pub async fn find_opportunities_page(
    db: &DatabaseConnection,
    query: &PageQuery<OpportunityFilters>,
) -> Result<Page<OpportunityModel>> {
    let mut select = InvestmentOpportunity::find();
    if let Some(status) = query.filters.status.selected() {
        select = select.filter(OpportunityColumn::Status.eq(*status));
    }
    if let Some(risk) = query.filters.risk_level.selected() {
        select = select.filter(OpportunityColumn::RiskLevel.eq(*risk));
    }
    if let Some(condition) = search_condition(
        query.search.as_deref(),
        &[OpportunityColumn::Title, OpportunityColumn::Issuer],
    ) {
        select = select.filter(condition);
    }
    let select = order_select(select, query.sort.as_ref(), sort_column, OpportunityColumn::Id);
    paginate(db, select, query).await
}
