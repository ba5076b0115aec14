//! Cursor-driven pagination
//!
//! List endpoints return a page of items and, while more remain, an opaque
//! `offset` token. [`collect_all`] keeps fetching until a page comes back
//! without one. No page limit is enforced here: a server that always
//! returns a cursor keeps the loop running. Capping the number of records
//! is done through the request parameters (`max_records`).

use std::future::Future;

use crate::error::Result;

/// One page of a list response
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` on the last page
    pub offset: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, offset: Option<String>) -> Self {
        Self { items, offset }
    }

    pub fn is_last(&self) -> bool {
        self.offset.is_none()
    }
}

/// Fetch every page, starting without a cursor, and concatenate the items
pub async fn collect_all<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(cursor.take()).await?;
        pages += 1;
        tracing::debug!(page = pages, items = page.items.len(), more = !page.is_last(), "Fetched page");

        items.extend(page.items);
        match page.offset {
            Some(offset) => cursor = Some(offset),
            None => return Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    #[tokio::test]
    async fn test_follows_cursors_until_absent() {
        let mut seen = Vec::new();

        let items = collect_all(|cursor: Option<String>| {
            seen.push(cursor.clone());
            async move {
                Ok(match cursor.as_deref() {
                    None => Page::new(vec![1, 2], Some("a".to_string())),
                    Some("a") => Page::new(vec![3], Some("b".to_string())),
                    _ => Page::new(vec![4, 5], None),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            seen,
            vec![None, Some("a".to_string()), Some("b".to_string())]
        );
    }

    #[tokio::test]
    async fn test_single_page() {
        let mut calls = 0;
        let items: Vec<u8> = collect_all(|_| {
            calls += 1;
            async { Ok(Page::new(Vec::new(), None)) }
        })
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_error_stops_pagination() {
        let mut calls = 0;
        let result: Result<Vec<u8>> = collect_all(|cursor| {
            calls += 1;
            async move {
                match cursor {
                    None => Ok(Page::new(vec![1], Some("next".into()))),
                    Some(_) => Err(Error::api(ErrorKind::InvalidRequest, "LIST_RECORDS_ITERATOR_NOT_AVAILABLE")),
                }
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
