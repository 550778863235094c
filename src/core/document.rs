//! Document business logic - Uploaded files offered for download.

use crate::{
    core::post::validate_title,
    entities::{Document, DocumentColumn, DocumentModel, document},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for registering an uploaded file
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub category: String,
    pub file_url: String,
}

/// Partial update of a document; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub file_url: Option<String>,
}

fn validate_file_url(file_url: &str) -> Result<String> {
    let file_url = file_url.trim();
    if file_url.is_empty() {
        return Err(Error::validation("file_url", "File URL cannot be empty"));
    }
    Ok(file_url.to_string())
}

/// Registers a document, stamping the upload time.
#[instrument(skip(db, new), fields(title = %new.title))]
pub async fn create_document(db: &DatabaseConnection, new: NewDocument) -> Result<DocumentModel> {
    let document = document::ActiveModel {
        title: Set(validate_title(&new.title)?),
        category: Set(new.category.trim().to_string()),
        file_url: Set(validate_file_url(&new.file_url)?),
        uploaded_at: Set(Utc::now()),
        ..Default::default()
    };
    let document = document.insert(db).await?;
    info!("Registered document {} ({})", document.id, document.title);
    Ok(document)
}

/// Applies a partial update; the title and URL keep their non-blank rule.
#[instrument(skip(db, patch))]
pub async fn update_document(
    db: &DatabaseConnection,
    id: i64,
    patch: DocumentPatch,
) -> Result<DocumentModel> {
    let title = patch.title.as_deref().map(validate_title).transpose()?;
    let file_url = patch.file_url.as_deref().map(validate_file_url).transpose()?;
    let mut document: document::ActiveModel = Document::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "document",
            id,
        })?
        .into();
    if let Some(title) = title {
        document.title = Set(title);
    }
    if let Some(category) = patch.category {
        document.category = Set(category.trim().to_string());
    }
    if let Some(file_url) = file_url {
        document.file_url = Set(file_url);
    }
    document.update(db).await.map_err(Into::into)
}

/// Removes a document record.
#[instrument(skip(db))]
pub async fn delete_document(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Document::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "document",
            id,
        });
    }
    info!("Deleted document {}", id);
    Ok(())
}

/// Every document, most recently uploaded first.
pub async fn get_all_documents(db: &DatabaseConnection) -> Result<Vec<DocumentModel>> {
    Document::find()
        .order_by_desc(DocumentColumn::UploadedAt)
        .order_by_desc(DocumentColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
