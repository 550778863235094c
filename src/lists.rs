//! The platform's list catalog.
//!
//! Each list has one fixed sourcing strategy. Large or growing collections (users, transactions,
//! opportunities, admin posts) are paged by the source; small public collections are fetched
//! whole and filtered locally. Page sizes come from [`ListsConfig`].

use crate::{
    config::settings::ListsConfig,
    core::{
        client_list::ClientSideList,
        filters::{
            DocumentFilters, OpportunityFilters, PostFilters, ProjectFilters, TransactionFilters,
            UserFilters, WebinarFilters,
        },
        pagination::Sort,
        server_list::ServerSideList,
    },
};

/// Admin dashboard users, newest accounts first
pub fn admin_users(config: &ListsConfig) -> ServerSideList<UserFilters> {
    ServerSideList::new(config.users).with_sort(Sort::desc("createdAt"))
}

/// Admin dashboard transactions, newest first
pub fn admin_transactions(config: &ListsConfig) -> ServerSideList<TransactionFilters> {
    ServerSideList::new(config.transactions).with_sort(Sort::desc("createdAt"))
}

/// Investor portal opportunities, newest listings first
pub fn investment_opportunities(config: &ListsConfig) -> ServerSideList<OpportunityFilters> {
    ServerSideList::new(config.opportunities).with_sort(Sort::desc("createdAt"))
}

/// Admin dashboard posts, drafts included
pub fn admin_posts(config: &ListsConfig) -> ServerSideList<PostFilters> {
    ServerSideList::new(config.admin_posts).with_sort(Sort::desc("publishedAt"))
}

/// Public blog; the source only serves published posts
pub fn public_blog(config: &ListsConfig) -> ClientSideList<PostFilters> {
    ClientSideList::new(config.blog)
}

pub fn webinars(config: &ListsConfig) -> ClientSideList<WebinarFilters> {
    ClientSideList::new(config.webinars)
}

pub fn documents(config: &ListsConfig) -> ClientSideList<DocumentFilters> {
    ClientSideList::new(config.documents)
}

pub fn projects(config: &ListsConfig) -> ClientSideList<ProjectFilters> {
    ClientSideList::new(config.projects)
}
