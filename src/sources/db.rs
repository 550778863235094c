//! Database-backed data source.
//!
//! [`DbSource`] answers list queries the way the platform backend does, by delegating to the
//! record modules in [`crate::core`]. It implements [`PageSource`] for the server-side lists,
//! [`CollectionSource`] for the client-side ones, and [`Mutator`] for every record type that
//! can be changed. Transactions get no `Mutator`.

use crate::{
    core::{
        document::{self, DocumentPatch, NewDocument},
        filters::{OpportunityFilters, PostFilters, TransactionFilters, UserFilters},
        opportunity::{self, NewOpportunity, OpportunityPatch},
        pagination::{Page, PageQuery},
        post::{self, NewPost, PostPatch},
        project::{self, NewProject, ProjectPatch},
        source::{CollectionSource, Mutator, PageSource},
        transaction,
        user::{self, NewUser, UserPatch},
        webinar::{self, NewWebinar, WebinarPatch},
    },
    entities::{
        AdminUserModel, DocumentModel, KycStatus, OpportunityModel, PostModel, ProjectModel,
        TransactionModel, WebinarModel,
    },
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

/// Record source over a SeaORM connection
#[derive(Debug, Clone)]
pub struct DbSource {
    db: DatabaseConnection,
}

impl DbSource {
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Asks for a KYC transition. Server-side user lists should refresh afterwards.
    pub async fn request_kyc_transition(&self, id: i64, to: KycStatus) -> Result<AdminUserModel> {
        user::request_kyc_transition(&self.db, id, to).await
    }
}

#[async_trait]
impl PageSource<UserFilters> for DbSource {
    async fn fetch_page(&self, query: &PageQuery<UserFilters>) -> Result<Page<AdminUserModel>> {
        user::find_users_page(&self.db, query).await
    }
}

#[async_trait]
impl PageSource<TransactionFilters> for DbSource {
    async fn fetch_page(
        &self,
        query: &PageQuery<TransactionFilters>,
    ) -> Result<Page<TransactionModel>> {
        transaction::find_transactions_page(&self.db, query).await
    }
}

#[async_trait]
impl PageSource<OpportunityFilters> for DbSource {
    async fn fetch_page(
        &self,
        query: &PageQuery<OpportunityFilters>,
    ) -> Result<Page<OpportunityModel>> {
        opportunity::find_opportunities_page(&self.db, query).await
    }
}

#[async_trait]
impl PageSource<PostFilters> for DbSource {
    async fn fetch_page(&self, query: &PageQuery<PostFilters>) -> Result<Page<PostModel>> {
        post::find_posts_page(&self.db, query).await
    }
}

/// The public blog: published posts only.
#[async_trait]
impl CollectionSource<PostModel> for DbSource {
    async fn fetch_all(&self) -> Result<Vec<PostModel>> {
        post::get_published_posts(&self.db).await
    }
}

#[async_trait]
impl CollectionSource<WebinarModel> for DbSource {
    async fn fetch_all(&self) -> Result<Vec<WebinarModel>> {
        webinar::get_all_webinars(&self.db).await
    }
}

#[async_trait]
impl CollectionSource<DocumentModel> for DbSource {
    async fn fetch_all(&self) -> Result<Vec<DocumentModel>> {
        document::get_all_documents(&self.db).await
    }
}

#[async_trait]
impl CollectionSource<ProjectModel> for DbSource {
    async fn fetch_all(&self) -> Result<Vec<ProjectModel>> {
        project::get_all_projects(&self.db).await
    }
}

#[async_trait]
impl Mutator<AdminUserModel> for DbSource {
    type Draft = NewUser;
    type Patch = UserPatch;

    async fn create(&self, draft: NewUser) -> Result<AdminUserModel> {
        user::create_user(&self.db, draft).await
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<AdminUserModel> {
        user::update_user(&self.db, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        user::delete_user(&self.db, id).await
    }
}

#[async_trait]
impl Mutator<OpportunityModel> for DbSource {
    type Draft = NewOpportunity;
    type Patch = OpportunityPatch;

    async fn create(&self, draft: NewOpportunity) -> Result<OpportunityModel> {
        opportunity::create_opportunity(&self.db, draft).await
    }

    async fn update(&self, id: i64, patch: OpportunityPatch) -> Result<OpportunityModel> {
        opportunity::update_opportunity(&self.db, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        opportunity::delete_opportunity(&self.db, id).await
    }
}

#[async_trait]
impl Mutator<PostModel> for DbSource {
    type Draft = NewPost;
    type Patch = PostPatch;

    async fn create(&self, draft: NewPost) -> Result<PostModel> {
        post::create_post(&self.db, draft).await
    }

    async fn update(&self, id: i64, patch: PostPatch) -> Result<PostModel> {
        post::update_post(&self.db, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        post::delete_post(&self.db, id).await
    }
}

#[async_trait]
impl Mutator<WebinarModel> for DbSource {
    type Draft = NewWebinar;
    type Patch = WebinarPatch;

    async fn create(&self, draft: NewWebinar) -> Result<WebinarModel> {
        webinar::create_webinar(&self.db, draft).await
    }

    async fn update(&self, id: i64, patch: WebinarPatch) -> Result<WebinarModel> {
        webinar::update_webinar(&self.db, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        webinar::delete_webinar(&self.db, id).await
    }
}

#[async_trait]
impl Mutator<DocumentModel> for DbSource {
    type Draft = NewDocument;
    type Patch = DocumentPatch;

    async fn create(&self, draft: NewDocument) -> Result<DocumentModel> {
        document::create_document(&self.db, draft).await
    }

    async fn update(&self, id: i64, patch: DocumentPatch) -> Result<DocumentModel> {
        document::update_document(&self.db, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        document::delete_document(&self.db, id).await
    }
}

#[async_trait]
impl Mutator<ProjectModel> for DbSource {
    type Draft = NewProject;
    type Patch = ProjectPatch;

    async fn create(&self, draft: NewProject) -> Result<ProjectModel> {
        project::create_project(&self.db, draft).await
    }

    async fn update(&self, id: i64, patch: ProjectPatch) -> Result<ProjectModel> {
        project::update_project(&self.db, id, patch).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        project::delete_project(&self.db, id).await
    }
}
