//! Typed filter records for every list in the platform.
//!
//! Each list has one record with one field per filter dimension. A dimension is a
//! [`FilterValue`], where [`FilterValue::All`] is the `"all"` sentinel of the select boxes and
//! means the predicate is not applied. Records know three things about their items: whether an
//! item passes the active dimensions, which text fields free-text search looks at, and how the
//! active dimensions are spelled as query parameters for a server-side source.

use crate::entities::{
    AdminUserModel, DocumentModel, KycStatus, OpportunityModel, OpportunityStatus, PaymentMethod,
    PostModel, ProjectModel, ProjectStatus, RiskLevel, TransactionModel, TransactionStatus,
    WebinarModel, WebinarStatus,
};
use chrono::{DateTime, Utc};
use sea_orm::ActiveEnum;
use std::fmt::Debug;

/// Query-parameter spelling of the sentinel that disables a filter dimension.
pub const ALL: &str = "all";

/// Values that can be carried in a query string.
pub trait FilterParam: Sized {
    /// Query-parameter spelling of the value
    fn to_param(&self) -> String;
    /// Parses the query-parameter spelling, `None` when unrecognised
    fn from_param(raw: &str) -> Option<Self>;
}

impl FilterParam for bool {
    fn to_param(&self) -> String {
        self.to_string()
    }

    fn from_param(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl FilterParam for String {
    fn to_param(&self) -> String {
        self.clone()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FilterParam for KycStatus {
    fn to_param(&self) -> String {
        self.to_value()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }
}

impl FilterParam for TransactionStatus {
    fn to_param(&self) -> String {
        self.to_value()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }
}

impl FilterParam for PaymentMethod {
    fn to_param(&self) -> String {
        self.to_value()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }
}

impl FilterParam for OpportunityStatus {
    fn to_param(&self) -> String {
        self.to_value()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }
}

impl FilterParam for RiskLevel {
    fn to_param(&self) -> String {
        self.to_value()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }
}

impl FilterParam for WebinarStatus {
    fn to_param(&self) -> String {
        self.to_value()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }
}

impl FilterParam for ProjectStatus {
    fn to_param(&self) -> String {
        self.to_value()
    }

    fn from_param(raw: &str) -> Option<Self> {
        Self::try_from_value(&raw.to_string()).ok()
    }
}

/// One filter dimension: either disabled (`All`) or an equality predicate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterValue<T> {
    /// Predicate not applied
    #[default]
    All,
    /// Only items whose field equals this value
    Only(T),
}

impl<T: PartialEq> FilterValue<T> {
    /// Whether `value` passes this dimension.
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }

    /// The selected value, `None` for `All`.
    pub const fn selected(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }
}

impl<T: FilterParam> FilterValue<T> {
    /// Parses a select-box value; `"all"` and unrecognised values disable the dimension.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case(ALL) {
            return Self::All;
        }
        T::from_param(raw).map_or(Self::All, Self::Only)
    }

    fn push_param(&self, key: &'static str, params: &mut Vec<(&'static str, String)>) {
        if let Self::Only(value) = self {
            params.push((key, value.to_param()));
        }
    }
}

/// Inclusive date window; a missing bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Whether `at` falls inside the window, bounds included.
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| *at >= from) && self.to.is_none_or(|to| *at <= to)
    }

    /// Whether neither bound is set.
    pub const fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Filter record of one list.
///
/// Implementations are plain data; equality is what lets a server-side list tell a response
/// for the current state from a stale one.
pub trait ListFilter: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Record type the filter applies to
    type Item: Clone + Debug + Send + Sync + 'static;

    /// Whether `item` satisfies every active dimension (search is handled separately).
    fn matches(&self, item: &Self::Item) -> bool;

    /// Text fields free-text search compares against.
    fn search_fields(item: &Self::Item) -> Vec<&str>;

    /// Active dimensions as query parameters, in a stable order.
    fn params(&self) -> Vec<(&'static str, String)>;
}

/// Case-insensitive substring search over `fields`. A blank query matches everything.
pub fn matches_search(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Filters of the admin users table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFilters {
    pub kyc_status: FilterValue<KycStatus>,
    pub active: FilterValue<bool>,
}

impl ListFilter for UserFilters {
    type Item = AdminUserModel;

    fn matches(&self, item: &Self::Item) -> bool {
        self.kyc_status.accepts(&item.kyc_status) && self.active.accepts(&item.is_active)
    }

    fn search_fields(item: &Self::Item) -> Vec<&str> {
        vec![item.email.as_str(), item.name.as_str()]
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.kyc_status.push_param("kycStatus", &mut params);
        self.active.push_param("isActive", &mut params);
        params
    }
}

/// Filters of the admin transactions table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionFilters {
    pub status: FilterValue<TransactionStatus>,
    pub payment_method: FilterValue<PaymentMethod>,
    pub created: DateRange,
}

impl ListFilter for TransactionFilters {
    type Item = TransactionModel;

    fn matches(&self, item: &Self::Item) -> bool {
        self.status.accepts(&item.status)
            && self.payment_method.accepts(&item.payment_method)
            && self.created.contains(&item.created_at)
    }

    fn search_fields(item: &Self::Item) -> Vec<&str> {
        vec![item.reference.as_str()]
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.status.push_param("status", &mut params);
        self.payment_method.push_param("paymentMethod", &mut params);
        if let Some(from) = self.created.from {
            params.push(("from", from.to_rfc3339()));
        }
        if let Some(to) = self.created.to {
            params.push(("to", to.to_rfc3339()));
        }
        params
    }
}

/// Filters of the investment opportunities grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpportunityFilters {
    pub status: FilterValue<OpportunityStatus>,
    pub risk_level: FilterValue<RiskLevel>,
}

impl ListFilter for OpportunityFilters {
    type Item = OpportunityModel;

    fn matches(&self, item: &Self::Item) -> bool {
        self.status.accepts(&item.status) && self.risk_level.accepts(&item.risk_level)
    }

    fn search_fields(item: &Self::Item) -> Vec<&str> {
        vec![item.title.as_str(), item.issuer.as_str()]
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.status.push_param("status", &mut params);
        self.risk_level.push_param("riskLevel", &mut params);
        params
    }
}

/// Filters shared by the admin posts table and the public blog
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostFilters {
    pub category: FilterValue<String>,
    pub published: FilterValue<bool>,
}

impl ListFilter for PostFilters {
    type Item = PostModel;

    fn matches(&self, item: &Self::Item) -> bool {
        self.category.accepts(&item.category) && self.published.accepts(&item.published)
    }

    fn search_fields(item: &Self::Item) -> Vec<&str> {
        vec![item.title.as_str(), item.excerpt.as_str(), item.author.as_str()]
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.category.push_param("category", &mut params);
        self.published.push_param("published", &mut params);
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebinarFilters {
    pub status: FilterValue<WebinarStatus>,
}

impl ListFilter for WebinarFilters {
    type Item = WebinarModel;

    fn matches(&self, item: &Self::Item) -> bool {
        self.status.accepts(&item.status)
    }

    fn search_fields(item: &Self::Item) -> Vec<&str> {
        vec![item.title.as_str(), item.host.as_str()]
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.status.push_param("status", &mut params);
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentFilters {
    pub category: FilterValue<String>,
}

impl ListFilter for DocumentFilters {
    type Item = DocumentModel;

    fn matches(&self, item: &Self::Item) -> bool {
        self.category.accepts(&item.category)
    }

    fn search_fields(item: &Self::Item) -> Vec<&str> {
        vec![item.title.as_str()]
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.category.push_param("category", &mut params);
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectFilters {
    pub status: FilterValue<ProjectStatus>,
    pub sector: FilterValue<String>,
}

impl ListFilter for ProjectFilters {
    type Item = ProjectModel;

    fn matches(&self, item: &Self::Item) -> bool {
        self.status.accepts(&item.status) && self.sector.accepts(&item.sector)
    }

    fn search_fields(item: &Self::Item) -> Vec<&str> {
        vec![item.name.as_str(), item.location.as_str()]
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        self.status.push_param("status", &mut params);
        self.sector.push_param("sector", &mut params);
        params
    }
}
