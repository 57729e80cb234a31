//! Resolution pipeline tests.
//!
//! These tests drive the full strategy chain against the scripted
//! in-memory provider.

use std::sync::Arc;
use std::time::Duration;

use feed_resolver::provider::memory::ProviderCall;
use feed_resolver::{
    AccountLink, CredentialContext, FailureKind, InMemoryContentProvider, MediaType, PageRef,
    PipelineConfig, ProviderError, ResolutionPipeline, StrategyKind,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn ctx() -> CredentialContext {
    CredentialContext::new("test-token", "u1", 10).unwrap()
}

fn record(id: &str, media_type: &str) -> Value {
    json!({
        "id": id,
        "caption": format!("caption {}", id),
        "media_type": media_type,
        "media_url": format!("https://cdn.example.test/{}.mp4", id),
        "permalink": format!("https://example.test/p/{}", id),
        "timestamp": "2024-05-01T09:00:00+0000",
        "username": "creator"
    })
}

fn linked_record(id: &str, media_type: &str, product: &str) -> Value {
    json!({
        "id": id,
        "media_type": media_type,
        "media_product_type": product,
        "permalink": format!("https://example.test/reel/{}", id),
        "timestamp": "2024-05-01T09:00:00+0000",
        "children": {"data": []}
    })
}

fn rejected() -> ProviderError {
    ProviderError::Unauthorized {
        status: 401,
        message: "Invalid OAuth access token".to_string(),
    }
}

fn unavailable() -> ProviderError {
    ProviderError::Network("connection refused".to_string())
}

fn run(provider: InMemoryContentProvider) -> (Arc<InMemoryContentProvider>, ResolutionPipeline<InMemoryContentProvider>) {
    let provider = Arc::new(provider);
    let pipeline = ResolutionPipeline::new(Arc::clone(&provider), PipelineConfig::default());
    (provider, pipeline)
}

// ─────────────────────────────────────────────────────────────────────────────
// Direct probe
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_direct_listing_is_success_without_fallback() {
    let (provider, pipeline) = run(InMemoryContentProvider::new()
        .with_direct_media(Ok(vec![]))
        .with_pages(Ok(vec![PageRef::new("p1")]))
        .with_page_link("p1", Ok(Some("ig1".to_string()))));

    let outcome = pipeline.resolve(&ctx()).await;

    assert!(outcome.success);
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.strategy_used, Some(StrategyKind::Direct));
    assert_eq!(provider.calls(), vec![ProviderCall::DirectMedia]);
}

#[tokio::test]
async fn direct_listing_keeps_only_video() {
    let (_, pipeline) = run(InMemoryContentProvider::new().with_direct_media(Ok(vec![
        record("v1", "VIDEO"),
        record("i1", "IMAGE"),
        record("v2", "VIDEO"),
    ])));

    let outcome = pipeline.resolve(&ctx()).await;

    let ids: Vec<_> = outcome.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2"]);
    assert!(outcome.items.iter().all(|i| i.media_type == MediaType::Video));
}

// ─────────────────────────────────────────────────────────────────────────────
// Linked-account discovery
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rejected_direct_probe_falls_through_to_linked() {
    let (provider, pipeline) = run(InMemoryContentProvider::new()
        .with_direct_media(Err(rejected()))
        .with_pages(Ok(vec![PageRef::new("p1")]))
        .with_page_link("p1", Ok(Some("ig1".to_string())))
        .with_account_media("ig1", Ok(vec![
            linked_record("r1", "VIDEO", "REELS"),
            linked_record("f1", "IMAGE", "FEED"),
        ])));

    let outcome = pipeline.resolve(&ctx()).await;

    assert!(outcome.success);
    assert_eq!(outcome.strategy_used, Some(StrategyKind::Linked));
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].id, "r1");
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].failure, FailureKind::CredentialInvalid);
    assert!(provider.calls().contains(&ProviderCall::AccountMedia("ig1".to_string())));
    assert!(!provider.calls().contains(&ProviderCall::AggregateLinks));
}

#[tokio::test]
async fn only_third_page_linked_still_resolves() {
    let (provider, pipeline) = run(InMemoryContentProvider::new()
        .with_direct_media(Err(rejected()))
        .with_pages(Ok(vec![PageRef::new("p1"), PageRef::new("p2"), PageRef::new("p3")]))
        .with_page_link("p1", Ok(None))
        .with_page_link("p2", Ok(None))
        .with_page_link("p3", Ok(Some("ig3".to_string())))
        .with_account_media("ig3", Ok(vec![record("v3", "VIDEO")])));

    let outcome = pipeline.resolve(&ctx()).await;

    assert!(outcome.success);
    assert_eq!(outcome.strategy_used, Some(StrategyKind::Linked));
    assert_eq!(outcome.items[0].id, "v3");
    assert_eq!(
        provider.calls(),
        vec![
            ProviderCall::DirectMedia,
            ProviderCall::ListPages,
            ProviderCall::LinkedAccount("p1".to_string()),
            ProviderCall::LinkedAccount("p2".to_string()),
            ProviderCall::LinkedAccount("p3".to_string()),
            ProviderCall::AccountMedia("ig3".to_string()),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregated scan
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_enumeration_failure_falls_through_to_aggregate() {
    let (_, pipeline) = run(InMemoryContentProvider::new()
        .with_direct_media(Err(rejected()))
        .with_pages(Err(unavailable()))
        .with_aggregate(Ok(vec![AccountLink::unlinked("p1"), AccountLink::linked("p2", "ig2")]))
        .with_account_media("ig2", Ok(vec![record("v1", "VIDEO")])));

    let outcome = pipeline.resolve(&ctx()).await;

    assert!(outcome.success);
    assert_eq!(outcome.strategy_used, Some(StrategyKind::Aggregated));
    assert_eq!(outcome.attempts.len(), 2);
}

#[tokio::test]
async fn zero_pages_still_attempts_aggregate() {
    let (provider, pipeline) = run(InMemoryContentProvider::new()
        .with_direct_media(Err(rejected()))
        .with_pages(Ok(vec![]))
        .with_aggregate(Ok(vec![AccountLink::linked("p9", "ig9")]))
        .with_account_media("ig9", Ok(vec![])));

    let outcome = pipeline.resolve(&ctx()).await;

    assert!(outcome.success);
    assert_eq!(outcome.strategy_used, Some(StrategyKind::Aggregated));
    assert_eq!(outcome.attempts[1].failure, FailureKind::NoLinkedAccount);
    assert!(provider.calls().contains(&ProviderCall::AggregateLinks));
}

// ─────────────────────────────────────────────────────────────────────────────
// Total failure
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn last_failure_is_surfaced_as_no_linked_account() {
    let (_, pipeline) = run(InMemoryContentProvider::new()
        .with_direct_media(Err(rejected()))
        .with_pages(Err(unavailable()))
        .with_aggregate(Ok(vec![AccountLink::unlinked("p1")])));

    let outcome = pipeline.resolve(&ctx()).await;

    assert!(!outcome.success);
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.failure, Some(FailureKind::NoLinkedAccount));
    assert!(outcome.diagnostic.unwrap().contains("aggregate scan"));
    assert_eq!(outcome.attempts.len(), 3);
}

#[tokio::test]
async fn last_failure_is_surfaced_as_upstream_unavailable() {
    let (_, pipeline) = run(InMemoryContentProvider::new()
        .with_direct_media(Err(unavailable()))
        .with_pages(Err(unavailable()))
        .with_aggregate(Err(unavailable())));

    let outcome = pipeline.resolve(&ctx()).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failure, Some(FailureKind::UpstreamUnavailable));
    assert_eq!(outcome.strategy_used, None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cancellation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancellation_aborts_in_flight_hop() {
    let provider = Arc::new(
        InMemoryContentProvider::new()
            .with_direct_media(Ok(vec![record("v1", "VIDEO")]))
            .with_latency(Duration::from_secs(30)),
    );
    let pipeline = ResolutionPipeline::new(Arc::clone(&provider), PipelineConfig::default());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.resolve_with_cancel(&ctx(), &cancel),
    )
    .await
    .expect("cancellation should return promptly");

    assert!(!outcome.success);
    assert_eq!(outcome.failure, Some(FailureKind::Cancelled));
    assert_eq!(provider.calls(), vec![ProviderCall::DirectMedia]);
}
