use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    CursorError, Gid, InvalidReason, KeysetCursor, PageError, PageInfo, PageLimits, PageParams,
    PageResponse,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Product {
    id: u64,
    created_at: DateTime<Utc>,
    title: String,
}

impl Product {
    fn cursor(&self) -> KeysetCursor {
        KeysetCursor::new(self.created_at, self.id)
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_564_800 + secs, 0).unwrap()
}

/// Five products; two share a creation time so the id breaks the tie.
fn catalog() -> Vec<Product> {
    [(1, 0), (2, 10), (3, 10), (4, 20), (5, 30)]
        .into_iter()
        .map(|(id, secs)| Product {
            id,
            created_at: at(secs),
            title: format!("product {id}"),
        })
        .collect()
}

/// Stand-in for `ORDER BY created_at DESC, id DESC LIMIT fetch` with an
/// optional `WHERE (created_at, id) < (cursor.created_at, cursor.id)`.
fn query(rows: &[Product], after: Option<&KeysetCursor>, fetch: usize) -> Vec<Product> {
    let mut matched: Vec<_> = rows
        .iter()
        .filter(|p| after.is_none_or(|c| c.precedes(&p.created_at, &p.id)))
        .cloned()
        .collect();
    matched.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    matched.truncate(fetch);
    matched
}

fn list(rows: &[Product], limit: &str, cursor: &str) -> Result<PageResponse<Product>, crate::Error> {
    let params = PageParams::from_query(Some(limit), Some(cursor), PageLimits::default())?;
    let codec = KeysetCursor::codec();
    let after = params.decode_cursor(&codec)?;
    let fetched = query(rows, after.as_ref(), params.fetch_limit());
    Ok(PageResponse::from_rows(fetched, params.limit, &codec, Product::cursor)?)
}

#[test]
fn walks_every_row_once_in_descending_order() {
    let rows = catalog();
    let mut seen = Vec::new();
    let mut shape = Vec::new();
    let mut cursor = String::new();

    loop {
        let page = list(&rows, "2", &cursor).unwrap();
        shape.push((page.data.len(), page.page.has_more));
        seen.extend(page.data.iter().map(|p| p.id));
        if !page.page.has_more {
            assert_eq!(page.page.next_cursor, "");
            break;
        }
        cursor = page.page.next_cursor;
    }

    assert_eq!(shape, [(2, true), (2, true), (1, false)]);
    assert_eq!(seen, [5, 4, 3, 2, 1]);
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), rows.len());
}

#[test]
fn cursor_survives_inserts_at_the_head() {
    let mut rows = catalog();
    let first = list(&rows, "2", "").unwrap();
    assert_eq!(first.data.iter().map(|p| p.id).collect::<Vec<_>>(), [5, 4]);

    rows.push(Product {
        id: 6,
        created_at: at(40),
        title: "late arrival".into(),
    });
    let second = list(&rows, "2", &first.page.next_cursor).unwrap();
    assert_eq!(second.data.iter().map(|p| p.id).collect::<Vec<_>>(), [3, 2]);
}

#[test]
fn single_page_has_no_cursor() {
    let page = list(&catalog(), "", "").unwrap();
    assert_eq!(page.data.len(), 5);
    assert_eq!(page.page, PageInfo::last(50));
}

#[test]
fn exact_fit_has_no_more() {
    let page = list(&catalog(), "5", "").unwrap();
    assert_eq!(page.data.len(), 5);
    assert!(!page.page.has_more);
}

#[test]
fn empty_collection() {
    let page = list(&[], "10", "").unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.page, PageInfo::last(10));
}

#[test]
fn garbage_cursor_is_rejected() {
    let err = list(&catalog(), "2", "not-a-cursor!").unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Cursor(CursorError::InvalidCursor {
            reason: InvalidReason::Encoding
        })
    ));
}

#[test]
fn response_json_shape() {
    let page = list(&catalog(), "4", "").unwrap();
    let next = page.page.next_cursor.clone();
    let value = serde_json::to_value(page.map(|p| p.id)).unwrap();
    assert_eq!(
        value,
        json!({
            "data": [5, 4, 3, 2],
            "page": {"limit": 4, "has_more": true, "next_cursor": next},
        })
    );

    let decoded = KeysetCursor::<u64>::codec().decode(&next).unwrap();
    assert_eq!(decoded, Some(KeysetCursor::new(at(10), 2)));
}

#[test]
fn gid_keyed_cursor() {
    let codec = KeysetCursor::codec();
    let rows = vec![Gid::store(3), Gid::store(2), Gid::store(1)];
    let page = PageResponse::from_rows(rows, 2, &codec, |gid| KeysetCursor::new(at(0), *gid))
        .unwrap();
    let next = codec.decode(&page.page.next_cursor).unwrap().unwrap();
    assert_eq!(next.id, Gid::store(2));
}

#[test]
fn limit_defaults_and_clamps() {
    let limits = PageLimits::default();
    let limit = |raw: Option<&str>| PageParams::from_query(raw, None, limits).map(|p| p.limit);

    assert_eq!(limit(None), Ok(50));
    assert_eq!(limit(Some("")), Ok(50));
    assert_eq!(limit(Some("1")), Ok(1));
    assert_eq!(limit(Some("100")), Ok(100));
    assert_eq!(limit(Some("101")), Ok(100));
    assert_eq!(limit(Some("9223372036854775807")), Ok(100));
}

#[test]
fn limit_rejects_non_positive_and_non_integer() {
    for raw in ["0", "-1", "abc", "1.5", " 2", "99999999999999999999"] {
        assert_eq!(
            PageParams::from_query(Some(raw), None, PageLimits::default()),
            Err(PageError::InvalidLimit { value: raw.into() }),
            "{raw}"
        );
    }
}

#[test]
fn custom_limits() {
    let params = PageParams::from_query(None, Some("abc"), PageLimits::new(10, 20)).unwrap();
    assert_eq!(params.limit, 10);
    assert_eq!(params.fetch_limit(), 11);
    assert_eq!(params.cursor, "abc");

    let params = PageParams::from_query(Some("25"), None, PageLimits::new(10, 20)).unwrap();
    assert_eq!(params.limit, 20);
    assert_eq!(params.cursor, "");
}
