//! Post business logic - Admin CRUD, the public blog collection and the paged admin query.

use crate::{
    core::{
        filters::PostFilters,
        pagination::{Page, PageQuery},
        query::{order_select, paginate, search_condition},
    },
    entities::{Post, PostColumn, PostModel, post},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Input for writing a post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub category: String,
    pub author: String,
    pub published: bool,
}

/// Partial update of a post; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub published: Option<bool>,
}

/// Trims a title and rejects blank ones.
pub fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("title", "Title cannot be empty"));
    }
    Ok(title.to_string())
}

/// Writes a post. Publishing stamps `published_at` with the current time.
#[instrument(skip(db, new), fields(title = %new.title))]
pub async fn create_post(db: &DatabaseConnection, new: NewPost) -> Result<PostModel> {
    let title = validate_title(&new.title)?;
    let post = post::ActiveModel {
        title: Set(title),
        excerpt: Set(new.excerpt.trim().to_string()),
        body: Set(new.body),
        category: Set(new.category.trim().to_string()),
        author: Set(new.author.trim().to_string()),
        published: Set(new.published),
        published_at: Set(new.published.then(Utc::now)),
        ..Default::default()
    };
    let post = post.insert(db).await?;
    info!("Created post {} ({})", post.id, post.title);
    Ok(post)
}

/// Finds a post by id.
pub async fn get_post_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<PostModel>> {
    Post::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Applies a partial update.
///
/// Publishing a draft stamps `published_at`; unpublishing clears it.
#[instrument(skip(db, patch))]
pub async fn update_post(db: &DatabaseConnection, id: i64, patch: PostPatch) -> Result<PostModel> {
    let title = patch.title.as_deref().map(validate_title).transpose()?;
    let current = get_post_by_id(db, id)
        .await?
        .ok_or(Error::NotFound { entity: "post", id })?;
    let was_published = current.published;

    let mut post: post::ActiveModel = current.into();
    if let Some(title) = title {
        post.title = Set(title);
    }
    if let Some(excerpt) = patch.excerpt {
        post.excerpt = Set(excerpt.trim().to_string());
    }
    if let Some(body) = patch.body {
        post.body = Set(body);
    }
    if let Some(category) = patch.category {
        post.category = Set(category.trim().to_string());
    }
    if let Some(author) = patch.author {
        post.author = Set(author.trim().to_string());
    }
    match patch.published {
        Some(true) if !was_published => {
            post.published = Set(true);
            post.published_at = Set(Some(Utc::now()));
        }
        Some(false) if was_published => {
            post.published = Set(false);
            post.published_at = Set(None);
        }
        _ => {}
    }
    post.update(db).await.map_err(Into::into)
}

/// Removes a post.
#[instrument(skip(db))]
pub async fn delete_post(db: &DatabaseConnection, id: i64) -> Result<()> {
    let result = Post::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound { entity: "post", id });
    }
    info!("Deleted post {}", id);
    Ok(())
}

/// Every published post, newest first; the public blog's whole collection.
pub async fn get_published_posts(db: &DatabaseConnection) -> Result<Vec<PostModel>> {
    Post::find()
        .filter(PostColumn::Published.eq(true))
        .order_by_desc(PostColumn::PublishedAt)
        .order_by_desc(PostColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

fn sort_column(field: &str) -> Option<PostColumn> {
    match field {
        "title" => Some(PostColumn::Title),
        "author" => Some(PostColumn::Author),
        "category" => Some(PostColumn::Category),
        "publishedAt" => Some(PostColumn::PublishedAt),
        _ => None,
    }
}

/// Answers a page query for the admin posts list (drafts included).
pub async fn find_posts_page(
    db: &DatabaseConnection,
    query: &PageQuery<PostFilters>,
) -> Result<Page<PostModel>> {
    let mut select = Post::find();
    if let Some(category) = query.filters.category.selected() {
        select = select.filter(PostColumn::Category.eq(category.as_str()));
    }
    if let Some(published) = query.filters.published.selected() {
        select = select.filter(PostColumn::Published.eq(*published));
    }
    if let Some(condition) = search_condition(
        query.search.as_deref(),
        &[PostColumn::Title, PostColumn::Excerpt, PostColumn::Author],
    ) {
        select = select.filter(condition);
    }
    let select = order_select(select, query.sort.as_ref(), sort_column, PostColumn::Id);
    paginate(db, select, query).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::filters::FilterValue;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_publish_and_unpublish_stamps() -> Result<()> {
        let db = setup_test_db().await?;
        let draft = create_test_post(&db, "Bond basics", "guides", false).await?;
        assert!(draft.published_at.is_none());
        assert!(get_published_posts(&db).await?.is_empty());

        let published = update_post(
            &db,
            draft.id,
            PostPatch {
                published: Some(true),
                ..PostPatch::default()
            },
        )
        .await?;
        assert!(published.published_at.is_some());
        assert_eq!(get_published_posts(&db).await?.len(), 1);

        let hidden = update_post(
            &db,
            draft.id,
            PostPatch {
                published: Some(false),
                ..PostPatch::default()
            },
        )
        .await?;
        assert!(hidden.published_at.is_none());

        let blank = update_post(
            &db,
            draft.id,
            PostPatch {
                title: Some("  ".to_string()),
                ..PostPatch::default()
            },
        )
        .await;
        assert!(matches!(blank, Err(Error::Validation { field: "title", .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_find_posts_page_filters_by_category() -> Result<()> {
        let db = setup_test_db().await?;
        for i in 0..6 {
            let category = if i % 2 == 0 { "guides" } else { "market-news" };
            create_test_post(&db, &format!("Post {i}"), category, i < 4).await?;
        }

        let query = PageQuery {
            search: None,
            filters: PostFilters {
                category: FilterValue::Only("guides".to_string()),
                published: FilterValue::Only(true),
            },
            page: 1,
            page_size: 10,
            sort: None,
        };
        let page = find_posts_page(&db, &query).await?;
        let titles: Vec<&str> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Post 0", "Post 2"]);

        delete_post(&db, page.items[0].id).await?;
        assert_eq!(find_posts_page(&db, &query).await?.items.len(), 1);
        Ok(())
    }
}
