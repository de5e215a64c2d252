//! End-to-end behaviour of the three search projections

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]


use futures::StreamExt;
use futures::stream::FusedStream;
use std::sync::Arc;
use test_utils::{Doc, docs, ids, query_generator, store_with, text_search};
use textsearch::{
    JsonStringMapper, TextSearch, TextSearchFilter, TextSearchOptions, TextSearchResult,
    VectorStoreTextSearch,
};
use textsearch_config::SearchConfig;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_skip_and_top_select_ranked_window() {
    test_utils::init_test_tracing();
    let store = store_with(docs(10), 10).without_total_count();
    let search = text_search(&store, &query_generator());

    let options = TextSearchOptions::new().with_top(2).with_skip(2);
    let mut results = search
        .search_as_string("test", Some(options), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.total_count(), None);
    assert_eq!(results.next().await.unwrap().unwrap(), "Body of document 3");
    assert_eq!(results.next().await.unwrap().unwrap(), "Body of document 4");
    assert!(results.next().await.is_none());
}

#[tokio::test]
async fn test_results_are_single_pass() {
    let store = store_with(docs(3), 10);
    let search = text_search(&store, &query_generator());

    let mut results = search
        .search_as_string("query", None, &CancellationToken::new())
        .await
        .unwrap();

    let mut seen = Vec::new();
    while let Some(item) = results.next().await {
        seen.push(item.unwrap());
    }
    assert_eq!(seen.len(), 3);

    // A second pass yields nothing and does not search again
    assert!(results.is_terminated());
    assert!(results.next().await.is_none());
    assert_eq!(store.search_count(), 1);
}

#[tokio::test]
async fn test_pages_are_fetched_lazily() {
    let store = store_with(docs(12), 2);
    let search = text_search(&store, &query_generator());

    let options = TextSearchOptions::new().with_top(5);
    let mut results = search
        .search_as_record("query", Some(options), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(store.page_fetch_count(), 0);
    results.next().await.unwrap().unwrap();
    assert_eq!(store.page_fetch_count(), 1);

    let rest = results.try_collect_all().await.unwrap();
    assert_eq!(rest.len(), 4);
    // ceil(5 / 2)
    assert_eq!(store.page_fetch_count(), 3);
}

#[tokio::test]
async fn test_projections_agree() {
    let store = store_with(docs(4), 3);
    let search = text_search(&store, &query_generator());
    let options = TextSearchOptions::new().with_top(4);
    let token = CancellationToken::new();

    let records = search
        .search_as_record("query", Some(options.clone()), &token)
        .await
        .unwrap()
        .try_collect_all()
        .await
        .unwrap();
    let normalized = search
        .search_as_text_result("query", Some(options.clone()), &token)
        .await
        .unwrap()
        .try_collect_all()
        .await
        .unwrap();
    let strings = search
        .search_as_string("query", Some(options), &token)
        .await
        .unwrap()
        .try_collect_all()
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    for ((record, result), string) in records.iter().zip(&normalized).zip(&strings) {
        assert_eq!(result.inner_content, *record);
        assert_eq!(result.name.as_deref(), Some(record.title.as_str()));
        assert_eq!(Some(&result.value), record.body.as_ref());
        assert_eq!(
            result.link.as_deref(),
            Some(format!("https://docs.example.com/{}", record.id).as_str())
        );
        assert_eq!(Some(string), record.body.as_ref());
    }
}

#[tokio::test]
async fn test_json_string_mapper() {
    let store = store_with(docs(1), 10);
    let search = VectorStoreTextSearch::<Doc>::from_vectorized_search(
        Arc::new(store.clone()),
        query_generator(),
    )
    .with_string_mapper(JsonStringMapper);

    let strings = search
        .search_as_string("query", None, &CancellationToken::new())
        .await
        .unwrap()
        .try_collect_all()
        .await
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&strings[0]).unwrap();
    assert_eq!(parsed["id"], "R1");
    assert_eq!(parsed["tags"], serde_json::json!(["t1"]));
}

#[tokio::test]
async fn test_closure_result_mapper() {
    let store = store_with(docs(2), 10);
    let search = VectorStoreTextSearch::<Doc>::from_vectorized_search(
        Arc::new(store.clone()),
        query_generator(),
    )
    .with_result_mapper(|doc: Doc| -> anyhow::Result<TextSearchResult<Doc>> {
        Ok(TextSearchResult::new(doc.title.to_uppercase(), doc))
    });

    let results = search
        .search_as_text_result("query", None, &CancellationToken::new())
        .await
        .unwrap()
        .try_collect_all()
        .await
        .unwrap();

    let values: Vec<&str> = results.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["TITLE 1", "TITLE 2"]);
    assert_eq!(results[0].name, None);
}

#[tokio::test]
async fn test_empty_index() {
    let store = store_with(Vec::new(), 10);
    let generator = query_generator();
    let search = text_search(&store, &generator);

    let options = TextSearchOptions::new().with_total_count();
    let results = search
        .search_as_record("anything", Some(options), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.total_count(), Some(0));
    assert!(results.try_collect_all().await.unwrap().is_empty());
    assert_eq!(generator.call_count(), 1);
    assert_eq!(store.page_fetch_count(), 0);
}

#[tokio::test]
async fn test_filter_and_total_count() {
    let store = store_with(docs(9), 10);
    let search = text_search(&store, &query_generator());

    let options = TextSearchOptions::new()
        .with_top(10)
        .with_total_count()
        .with_filter(
            TextSearchFilter::new()
                .equal_to("category", "even")
                .any_tag_equal_to("tags", "t1"),
        );
    let results = search
        .search_as_record("query", Some(options), &CancellationToken::new())
        .await
        .unwrap();

    // n even and n % 3 == 1
    assert_eq!(results.total_count(), Some(1));
    let records = results.try_collect_all().await.unwrap();
    assert_eq!(ids(&records), vec!["R4"]);
}

#[tokio::test]
async fn test_backend_metadata_passes_through() {
    let store = store_with(docs(3), 10);
    let search = text_search(&store, &query_generator());

    let results = search
        .search_as_string("query", None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        results.metadata().get("scanned_count"),
        Some(&serde_json::json!(3))
    );
}

#[tokio::test]
async fn test_default_options_come_from_config() {
    let store = store_with(docs(10), 10);
    let search = text_search(&store, &query_generator()).with_config(SearchConfig {
        default_top: 3,
        include_total_count: true,
        ..SearchConfig::default()
    });

    let results = search
        .search_as_record("query", None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(results.total_count(), Some(10));
    assert_eq!(results.try_collect_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_vectorizable_backend_embeds_query_itself() {
    let generator = query_generator();
    let store = store_with(docs(4), 10).with_embedding_generator(
        Arc::clone(&generator) as Arc<dyn textsearch_embeddings::EmbeddingGenerator>
    );
    let search = VectorStoreTextSearch::<Doc>::from_vectorizable_text_search(Arc::new(store))
        .with_property_mappers();

    let options = TextSearchOptions::new().with_top(2);
    let records = search
        .search_as_record("query", Some(options), &CancellationToken::new())
        .await
        .unwrap()
        .try_collect_all()
        .await
        .unwrap();

    assert_eq!(ids(&records), vec!["R1", "R2"]);
    assert_eq!(generator.call_count(), 1);
}

#[tokio::test]
async fn test_concurrent_searches_are_independent() {
    let store = store_with(docs(6), 2);
    let search = Arc::new(text_search(&store, &query_generator()));

    let handles: Vec<_> = (0..4)
        .map(|skip| {
            let search = Arc::clone(&search);
            tokio::spawn(async move {
                let options = TextSearchOptions::new().with_top(2).with_skip(skip);
                let records = search
                    .search_as_record("query", Some(options), &CancellationToken::new())
                    .await
                    .unwrap()
                    .try_collect_all()
                    .await
                    .unwrap();
                records.into_iter().map(|doc| doc.id).collect::<Vec<_>>()
            })
        })
        .collect();

    let mut windows = Vec::new();
    for handle in handles {
        windows.push(handle.await.unwrap());
    }

    assert_eq!(windows[0], vec!["R1", "R2"]);
    assert_eq!(windows[3], vec!["R4", "R5"]);
    assert_eq!(store.search_count(), 4);
}
