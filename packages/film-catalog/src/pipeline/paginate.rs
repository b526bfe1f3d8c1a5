//! Paginated collection.
//!
//! The collector reads page 1 to learn how many pages exist, trims that to
//! the requested window, and walks the window in bounded batches. Pages are
//! awaited one after another; the batch size caps how many pages of records
//! are buffered before they are folded into the output.

use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::traits::source::PageSource;
use crate::types::config::{CollectRequest, PaginationConfig};
use crate::types::page::PageResult;

/// Drives a [`PageSource`] across a window of pages.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Number of pages the source currently reports (fetches page 1).
    pub async fn total_pages<S: PageSource + ?Sized>(&self, source: &S) -> Result<u32> {
        let first = fetch(source, 1).await?;
        Ok(first.resolved_total_pages(source.page_size()))
    }

    /// Collect the records of every page in the requested window, in page
    /// order.
    ///
    /// A start page past the last available page yields an empty result. Any
    /// failed page aborts the run with [`CatalogError::CollectionAborted`].
    pub async fn collect<S: PageSource + ?Sized>(
        &self,
        source: &S,
        request: &CollectRequest,
    ) -> Result<Vec<S::Item>> {
        request.validate()?;

        let first = fetch(source, 1).await?;
        let total_pages = first.resolved_total_pages(source.page_size());
        let available = available_pages(total_pages, request.percent_cap);

        if request.start_page > available {
            debug!(
                source = %source.describe(),
                start_page = request.start_page,
                available,
                "Start page beyond available pages"
            );
            return Ok(Vec::new());
        }

        let end = match request.page_limit {
            Some(limit) => request.start_page.saturating_add(limit).min(available + 1),
            None => available + 1,
        };

        let mut first = Some(first);
        let mut records = Vec::new();
        let mut page = request.start_page;
        let mut pages_read = 0u32;

        'batches: while page < end {
            let batch_end = page.saturating_add(self.config.batch_size.max(1)).min(end);
            debug!(
                source = %source.describe(),
                from = page,
                to = batch_end - 1,
                "Fetching page batch"
            );

            let mut batch = Vec::new();
            for index in page..batch_end {
                let result = match (index, first.take()) {
                    (1, Some(first)) => first,
                    _ => fetch(source, index).await?,
                };
                pages_read += 1;

                if reports_totals(&result) {
                    let reported = result.resolved_total_pages(source.page_size());
                    if reported != total_pages {
                        warn!(
                            source = %source.describe(),
                            page = index,
                            expected = total_pages,
                            reported,
                            "Page count changed during collection"
                        );
                    }
                }
                batch.extend(result.records);

                if let Some(limit) = request.item_limit {
                    if records.len() + batch.len() >= limit {
                        records.append(&mut batch);
                        records.truncate(limit);
                        break 'batches;
                    }
                }
            }
            records.append(&mut batch);
            page = batch_end;
        }

        info!(
            source = %source.describe(),
            records = records.len(),
            pages = pages_read,
            "Collected records"
        );
        Ok(records)
    }
}

async fn fetch<S: PageSource + ?Sized>(source: &S, page: u32) -> Result<PageResult<S::Item>> {
    source
        .fetch_page(page)
        .await
        .map_err(|source| CatalogError::CollectionAborted { page, source })
}

fn reports_totals<T>(page: &PageResult<T>) -> bool {
    page.total_pages.is_some() || page.total_count.is_some()
}

/// `ceil(total * percent / 100)`, never more than `total`.
fn available_pages(total: u32, percent_cap: f64) -> u32 {
    if percent_cap >= 100.0 {
        return total;
    }
    let capped = (f64::from(total) * percent_cap / 100.0).ceil();
    (capped as u32).min(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::StaticPages;
    use proptest::prelude::*;

    fn numbered(pages: u32, per_page: u32) -> StaticPages<u32> {
        StaticPages::new(
            (0..pages)
                .map(|p| (0..per_page).map(|i| p * per_page + i).collect())
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_collects_everything_in_order() {
        let source = numbered(4, 3);
        let records = Paginator::default()
            .collect(&source, &CollectRequest::all())
            .await
            .unwrap();
        assert_eq!(records, (0..12).collect::<Vec<_>>());
        // page 1 is reused, not refetched
        assert_eq!(source.fetched_pages(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_start_beyond_available_is_empty() {
        let source = numbered(3, 2);
        let records = Paginator::default()
            .collect(&source, &CollectRequest::all().starting_at(5))
            .await
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(source.fetched_pages(), vec![1]);
    }

    #[tokio::test]
    async fn test_page_limit() {
        let source = numbered(10, 2);
        let records = Paginator::default()
            .collect(&source, &CollectRequest::all().with_page_limit(2))
            .await
            .unwrap();
        assert_eq!(records, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_window_from_later_start() {
        let source = numbered(10, 2);
        let records = Paginator::default()
            .collect(&source, &CollectRequest::all().starting_at(9).with_page_limit(5))
            .await
            .unwrap();
        assert_eq!(records, vec![16, 17, 18, 19]);
        assert_eq!(source.fetched_pages(), vec![1, 9, 10]);
    }

    #[tokio::test]
    async fn test_percent_cap_rounds_up() {
        let source = numbered(10, 1);
        let records = Paginator::default()
            .collect(&source, &CollectRequest::all().with_percent_cap(25.0))
            .await
            .unwrap();
        assert_eq!(records, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_item_limit_cuts_last_page() {
        let source = numbered(5, 18);
        let records = Paginator::default()
            .collect(&source, &CollectRequest::all().with_item_limit(40))
            .await
            .unwrap();
        assert_eq!(records.len(), 40);
        assert_eq!(records.last(), Some(&39));
        assert_eq!(source.fetched_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_total_from_item_count() {
        let source = numbered(3, 2).reporting_count(6, 2);
        let paginator = Paginator::default();
        assert_eq!(paginator.total_pages(&source).await.unwrap(), 3);
        let records = paginator.collect(&source, &CollectRequest::all()).await.unwrap();
        assert_eq!(records.len(), 6);
    }

    #[tokio::test]
    async fn test_page_without_paginator_is_single_page() {
        let source = numbered(3, 2).without_totals();
        let records = Paginator::default()
            .collect(&source, &CollectRequest::all())
            .await
            .unwrap();
        assert_eq!(records, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_failure_aborts_with_page() {
        let source = numbered(5, 2).failing_at(3);
        let err = Paginator::default()
            .collect(&source, &CollectRequest::all())
            .await
            .unwrap_err();
        match err {
            CatalogError::CollectionAborted { page, source } => {
                assert_eq!(page, 3);
                assert!(matches!(source, ClientError::Site { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_batches_cover_every_page() {
        let source = numbered(7, 1);
        let paginator = Paginator::new(PaginationConfig::new().with_batch_size(3));
        let records = paginator.collect(&source, &CollectRequest::all()).await.unwrap();
        assert_eq!(records, (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_calls() {
        let source = numbered(2, 2);
        let err = Paginator::default()
            .collect(&source, &CollectRequest::all().starting_at(0))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidParameter { name: "start_page", .. }));
        assert!(source.fetched_pages().is_empty());
    }

    #[test]
    fn test_available_pages() {
        assert_eq!(available_pages(10, 100.0), 10);
        assert_eq!(available_pages(10, 50.0), 5);
        assert_eq!(available_pages(10, 1.0), 1);
        assert_eq!(available_pages(0, 50.0), 0);
    }

    proptest! {
        #[test]
        fn prop_page_limit_window(
            pages in 1u32..30,
            per_page in 1u32..5,
            start in 1u32..35,
            limit in 1u32..10,
            batch in 1u32..6,
        ) {
            let source = numbered(pages, per_page);
            let paginator = Paginator::new(PaginationConfig::new().with_batch_size(batch));
            let request = CollectRequest::all().starting_at(start).with_page_limit(limit);
            let records = tokio_test::block_on(paginator.collect(&source, &request)).unwrap();

            let last = (start + limit).min(pages + 1);
            let expected: Vec<u32> = if start > pages {
                Vec::new()
            } else {
                ((start - 1) * per_page..(last - 1) * per_page).collect()
            };
            prop_assert_eq!(records, expected);
        }
    }
}
