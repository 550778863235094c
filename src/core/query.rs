//! SeaORM helpers shared by the page queries of the record modules.
//!
//! These answer a [`PageQuery`] the way the platform backend does: filters become `WHERE`
//! clauses, the page becomes `LIMIT/OFFSET`, and the page count comes from a `COUNT(*)` over
//! the same filtered select.
//!
//! Search is a case-insensitive substring match, the same as client-side lists apply. `SQLite`
//! only folds ASCII case in `LIKE`, so terms with other characters are matched in Rust over the
//! filtered rows instead of in SQL.

use crate::{
    core::{
        filters::{ListFilter, matches_search},
        pagination::{Page, PageQuery, Sort, SortOrder, page_slice, total_pages},
    },
    errors::Result,
};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder,
    Select, sea_query::LikeExpr,
};
use tracing::trace;

/// Runs `select` for the 1-indexed page of `query`.
///
/// `select` carries the filters and, for ASCII terms, the [`search_condition`]. Other terms
/// are applied here over `F::search_fields`.
pub async fn paginate<E, F>(
    db: &DatabaseConnection,
    select: Select<E>,
    query: &PageQuery<F>,
) -> Result<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
    F: ListFilter<Item = E::Model>,
{
    let page_size = query.page_size.max(1);
    if let Some(term) = query.search.as_deref().filter(|term| !is_sql_searchable(term)) {
        let matching: Vec<E::Model> = select
            .all(db)
            .await?
            .into_iter()
            .filter(|item| matches_search(term, &F::search_fields(item)))
            .collect();
        trace!("{} rows match {:?}", matching.len(), term);
        return Ok(Page {
            items: page_slice(&matching, query.page, page_size).to_vec(),
            total_pages: total_pages(matching.len() as u64, page_size),
        });
    }
    let paginator = select.paginate(db, page_size);
    let count = paginator.num_items().await?;
    let items = paginator.fetch_page(query.page.max(1) - 1).await?;
    trace!("Page {} holds {} of {} rows", query.page, items.len(), count);
    Ok(Page {
        items,
        total_pages: total_pages(count, page_size),
    })
}

/// Orders `select` by the requested sort, with `id` as the tie breaker.
///
/// Fields `column_for` does not know fall back to plain id order.
pub fn order_select<E, C>(
    select: Select<E>,
    sort: Option<&Sort>,
    column_for: impl Fn(&str) -> Option<C>,
    id: C,
) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let ordered = match sort.and_then(|s| column_for(&s.field).map(|column| (column, s.order))) {
        Some((column, SortOrder::Asc)) => select.order_by(column, Order::Asc),
        Some((column, SortOrder::Desc)) => select.order_by(column, Order::Desc),
        None => select,
    };
    ordered.order_by(id, Order::Asc)
}

/// Whether `LIKE` matches `term` the way [`matches_search`] does.
fn is_sql_searchable(term: &str) -> bool {
    term.trim().is_ascii()
}

/// `%term%` with the `LIKE` wildcards and the escape character escaped by `\`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `LIKE` match of the search term against any of `columns`.
///
/// `None` when there is no term, or when the term is not ASCII and [`paginate`] matches it
/// itself.
pub fn search_condition<C: ColumnTrait>(search: Option<&str>, columns: &[C]) -> Option<Condition> {
    let term = search
        .map(str::trim)
        .filter(|term| !term.is_empty() && is_sql_searchable(term))?;
    let pattern = contains_pattern(term);
    Some(
        columns
            .iter()
            .fold(Condition::any(), |condition, column| {
                condition.add(column.like(LikeExpr::new(pattern.as_str()).escape('\\')))
            }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("bond"), "%bond%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn test_non_ascii_terms_are_not_sent_to_sql() {
        use crate::entities::AdminUserColumn;
        assert!(search_condition(Some("ann"), &[AdminUserColumn::Email]).is_some());
        assert!(search_condition(Some("ÉLO"), &[AdminUserColumn::Email]).is_none());
        assert!(search_condition(Some("   "), &[AdminUserColumn::Email]).is_none());
    }
}
