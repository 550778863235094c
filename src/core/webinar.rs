//! Webinar business logic.

use crate::{
    core::post::validate_title,
    entities::{Webinar, WebinarColumn, WebinarModel, WebinarStatus, webinar},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct NewWebinar {
    pub title: String,
    pub host: String,
    pub description: String,
    pub status: WebinarStatus,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct WebinarPatch {
    pub title: Option<String>,
    pub host: Option<String>,
    pub description: Option<String>,
    pub status: Option<WebinarStatus>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[instrument(skip(db, new), fields(title = %new.title))]
pub async fn create_webinar(db: &DatabaseConnection, new: NewWebinar) -> Result<WebinarModel> {
    let webinar = webinar::ActiveModel {
        title: Set(validate_title(&new.title)?),
        host: Set(new.host.trim().to_string()),
        description: Set(new.description),
        status: Set(new.status),
        scheduled_at: Set(new.scheduled_at),
        ..Default::default()
    };
    let webinar = webinar.insert(db).await?;
    info!("Scheduled webinar {} ({})", webinar.id, webinar.title);
    Ok(webinar)
}

#[instrument(skip(db, patch))]
pub async fn update_webinar(
    db: &DatabaseConnection,
    id: i64,
    patch: WebinarPatch,
) -> Result<WebinarModel> {
    let title = patch.title.as_deref().map(validate_title).transpose()?;
    let mut webinar: webinar::ActiveModel = Webinar::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "webinar",
            id,
        })?
        .into();
    if let Some(title) = title {
        webinar.title = Set(title);
    }
    if let Some(host) = patch.host {
        webinar.host = Set(host.trim().to_string());
    }
    if let Some(description) = patch.description {
        webinar.description = Set(description);
    }
    if let Some(status) = patch.status {
        webinar.status = Set(status);
    }
    if let Some(scheduled_at) = patch.scheduled_at {
        webinar.scheduled_at = Set(scheduled_at);
    }
    webinar.update(db).await.map_err(Into::into)
}

#[instrument(skip(db))]
pub async fn delete_webinar(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Webinar::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "webinar",
            id,
        });
    }
    Ok(())
}

/// Every webinar, soonest first.
pub async fn get_all_webinars(db: &DatabaseConnection) -> Result<Vec<WebinarModel>> {
    Webinar::find()
        .order_by_asc(WebinarColumn::ScheduledAt)
        .order_by_asc(WebinarColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
