//! Integration tests across the collector, set algebra, statistics and the
//! master-list engine.
//!
//! These tests drive the public API only:
//! 1. Collect pages through the paginator
//! 2. Combine record sets
//! 3. Label rating histograms
//! 4. Rebuild and edit lists through a mock session

use std::collections::BTreeSet;

use film_catalog::{
    difference, merge,
    testing::{MockCatalog, MockCatalogCall, StaticPages, StaticSource},
    CatalogError, ChildList, CollectRequest, FilmId, FilmRecord, ListDetails, MasterList,
    MasterListConfig, NewList, OwnedList, Paginator, RatingConfig, RatingHistogram, SourceKind,
};
use proptest::prelude::*;

/// Respects RUST_LOG; run with `RUST_LOG=debug cargo test -- --nocapture`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ids(raw: &[u64]) -> Vec<FilmId> {
    raw.iter().copied().map(FilmId).collect()
}

fn numbered_pages(pages: u32, per_page: u32) -> Vec<Vec<u32>> {
    (0..pages)
        .map(|p| (p * per_page..(p + 1) * per_page).collect())
        .collect()
}

#[tokio::test]
async fn test_start_page_beyond_available_is_empty() {
    let source = StaticPages::new(numbered_pages(3, 4));
    let records = Paginator::default()
        .collect(&source, &CollectRequest::all().starting_at(5))
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_page_limit_takes_leading_pages_in_order() {
    let source = StaticPages::new(numbered_pages(10, 3));
    let records = Paginator::default()
        .collect(&source, &CollectRequest::all().with_page_limit(2))
        .await
        .unwrap();
    assert_eq!(records, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(source.fetched_pages(), vec![1, 2]);
}

#[tokio::test]
async fn test_failed_page_aborts_without_partial_results() {
    init_tracing();
    let source = StaticPages::new(numbered_pages(4, 2)).failing_at(3);
    let err = Paginator::default()
        .collect(&source, &CollectRequest::all())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::CollectionAborted { page: 3, .. }));
}

#[test]
fn test_set_algebra_examples() {
    let first = ids(&[1, 2, 3]);
    let second = ids(&[3, 4]);
    assert_eq!(merge([&first, &second]), ids(&[1, 2, 3, 4]));
    assert_eq!(difference(&ids(&[1, 2, 3]), &ids(&[2])), ids(&[1, 3]));
}

#[test]
fn test_histogram_labels() {
    let ironic = RatingHistogram::from_scores([(1, 20), (10, 20)]).unwrap();
    assert!(ironic.is_ironic());

    let not_ironic = RatingHistogram::from_scores([(1, 20), (10, 5), (2, 20)]).unwrap();
    assert!(!not_ironic.is_ironic());

    let config = RatingConfig::default();
    let sparse = RatingHistogram::from_scores([(10, 4)]).unwrap();
    assert_eq!(
        sparse.slanted_mean(config.slanted_fallback, config.slanted_min_count),
        config.slanted_fallback
    );
    assert_eq!(RatingHistogram::default().bayesian_estimate(9.0, 2.75), 2.75);
    assert!(matches!(
        RatingHistogram::from_buckets(&[1; 9]),
        Err(CatalogError::MalformedHistogram { buckets: 9 })
    ));
}

proptest! {
    #[test]
    fn prop_single_source_round_trips(raw in prop::collection::vec(1u64..500, 0..60)) {
        let client = MockCatalog::new("me");
        let master = MasterList::new(MasterListConfig::default())
            .with_source(StaticSource::new(SourceKind::List, "Only", &raw));

        let entries = tokio_test::block_on(master.gather(&client)).unwrap();

        let expected: BTreeSet<FilmId> = raw.iter().copied().map(FilmId).collect();
        let got: BTreeSet<FilmId> = entries.iter().copied().collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(entries.len(), raw.iter().collect::<BTreeSet<_>>().len());
        prop_assert!(entries.windows(2).all(|w| w[0] > w[1]));
    }
}

#[tokio::test]
async fn test_master_list_lifecycle() {
    init_tracing();
    let client = MockCatalog::new("me")
        .with_generated_summaries(1..=40)
        .with_list(
            "kasey",
            ListDetails {
                id: 10,
                name: "Nightmare List".into(),
                tags: vec![],
                ranked: false,
                public: true,
                description: String::new(),
                entry_count: 0,
            },
            ids(&[5, 6, 7]).into_iter().map(FilmRecord::from).collect(),
        )
        .with_display_name("kasey", "Kasey");

    let mut list = OwnedList::create(
        &client,
        NewList::new("Everything Scary").with_description("Scary films I know about."),
    )
    .await
    .unwrap();

    let master = MasterList::new(MasterListConfig::default())
        .with_source(ChildList::new("kasey", "Nightmare List"))
        .with_source(StaticSource::new(SourceKind::Studio, "Blumhouse", &[7, 30]))
        .excluding_ids(ids(&[6]));

    let first = list.master_update(&master).await.unwrap();
    assert!(first.updated);
    assert_eq!(first.entries, ids(&[30, 7, 5]));
    assert_eq!(list.entry_ids(), ids(&[30, 7, 5]));
    assert!(first
        .description
        .starts_with("Scary films I know about.\n\n===============\n\n<strong>-- Lists --</strong>"));
    assert!(first.description.contains("( by Kasey )"));

    // nothing changed, nothing sent
    client.clear_calls();
    let second = list.master_update(&master).await.unwrap();
    assert!(!second.updated);
    assert!(!client
        .calls()
        .iter()
        .any(|c| matches!(c, MockCatalogCall::SubmitListUpdate { .. })));

    // user edits survive a later run
    list.set_description(
        second
            .description
            .replacen("Scary films I know about.", "Now with a new intro.", 1),
    )
    .await
    .unwrap();
    list.reload().await.unwrap();
    let master = master.excluding_ids(ids(&[5]));
    let third = list.master_update(&master).await.unwrap();
    assert!(third.updated);
    assert_eq!(third.diff.removed, ids(&[5]));
    assert!(third.description.starts_with("Now with a new intro."));
    assert!(third.description.contains("<strong>Last Removed</strong>:\n<a href=\"https://letterboxd.com/film/film-5/\">Film 5</a>"));
}

#[tokio::test]
async fn test_list_edits_resend_full_attribute_set() {
    let client = MockCatalog::new("me").with_generated_summaries(1..=10);
    let mut list = OwnedList::create(&client, NewList::new("Posters").with_tags(["art"]))
        .await
        .unwrap();

    list.append(ids(&[1, 2]), false).await.unwrap();
    list.set_ranked(true).await.unwrap();

    let last = client.updates().pop().unwrap();
    assert_eq!(last.list_id, Some(list.id()));
    assert_eq!(last.name, "Posters");
    assert_eq!(last.tags, vec!["art".to_string()]);
    assert!(last.ranked);
    assert_eq!(last.entry_ids(), ids(&[1, 2]));
}
