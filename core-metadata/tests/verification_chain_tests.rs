//! Integration tests for the verification chain
//!
//! These tests verify:
//! - The studio/unspecified existence rule on the primary source
//! - Keyword confirmation from disambiguation text
//! - Fallback to Discogs on primary miss, primary error, and retry
//!   exhaustion
//! - Credential errors are never retried but still trigger fallback
//! - A negative verdict is an outcome, not an error

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use bytes::Bytes;
use core_metadata::{
    DiscogsClient, MetadataVerifier, MusicBrainzClient, VerificationSource, VersionTag,
    VersionVerifier,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Routes scripted responses by target host and counts calls per host.
struct RoutedHttpClient {
    musicbrainz: Mutex<Vec<HttpResponse>>,
    discogs: Mutex<Vec<HttpResponse>>,
    musicbrainz_calls: AtomicU32,
    discogs_calls: AtomicU32,
}

impl RoutedHttpClient {
    fn new(musicbrainz: Vec<HttpResponse>, discogs: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            musicbrainz: Mutex::new(musicbrainz),
            discogs: Mutex::new(discogs),
            musicbrainz_calls: AtomicU32::new(0),
            discogs_calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl HttpClient for RoutedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let (queue, counter) = if request.url.contains("musicbrainz.org") {
            (&self.musicbrainz, &self.musicbrainz_calls)
        } else {
            (&self.discogs, &self.discogs_calls)
        };
        counter.fetch_add(1, Ordering::SeqCst);

        let mut responses = queue.lock().await;
        assert!(
            !responses.is_empty(),
            "unexpected request to {}",
            request.url
        );
        Ok(responses.remove(0))
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn mb_recordings(body: &str) -> HttpResponse {
    response(200, body)
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
        use_exponential_backoff: false,
    }
}

fn verifier(http: Arc<RoutedHttpClient>) -> MetadataVerifier {
    let musicbrainz =
        MusicBrainzClient::new(http.clone(), "psc-tests/0.1.0 (tests@example.com)".to_string())
            .with_retry_policy(fast_policy());
    let discogs = DiscogsClient::new(http, "pat-token".to_string(), "psc-tests/0.1.0".to_string())
        .with_retry_policy(fast_policy());
    MetadataVerifier::new(musicbrainz).with_discogs(discogs)
}

#[tokio::test(start_paused = true)]
async fn studio_claim_confirmed_by_mere_existence() {
    let http = RoutedHttpClient::new(
        vec![mb_recordings(r#"{"recordings": [{"title": "Target Song"}]}"#)],
        vec![],
    );
    let chain = verifier(http.clone());

    let verdict = chain
        .verify("Target Artist", "Target Song", Some(VersionTag::Studio))
        .await
        .unwrap();

    assert!(verdict.confirmed);
    assert_eq!(verdict.source, Some(VerificationSource::MusicBrainz));
    assert_eq!(http.discogs_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn live_claim_confirmed_from_disambiguation() {
    let http = RoutedHttpClient::new(
        vec![mb_recordings(
            r#"{"recordings": [
                {"title": "Target Song"},
                {"title": "Target Song", "disambiguation": "live, 1994-07-02: Sheffield"}
            ]}"#,
        )],
        vec![],
    );
    let chain = verifier(http);

    let verdict = chain
        .verify("Target Artist", "Target Song", Some(VersionTag::Live))
        .await
        .unwrap();

    assert!(verdict.confirmed);
    assert_eq!(verdict.source, Some(VerificationSource::MusicBrainz));
}

#[tokio::test(start_paused = true)]
async fn falls_back_to_discogs_when_primary_has_no_match() {
    let http = RoutedHttpClient::new(
        vec![mb_recordings(r#"{"recordings": [{"title": "Target Song"}]}"#)],
        vec![response(
            200,
            r#"{"results": [{"id": 1, "title": "Target Artist - Target Song (Live)", "type": "master"}]}"#,
        )],
    );
    let chain = verifier(http.clone());

    let verdict = chain
        .verify("Target Artist", "Target Song", Some(VersionTag::Live))
        .await
        .unwrap();

    assert!(verdict.confirmed);
    assert_eq!(verdict.source, Some(VerificationSource::Discogs));
    assert_eq!(http.musicbrainz_calls.load(Ordering::SeqCst), 1);
    assert_eq!(http.discogs_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn primary_outage_is_retried_then_falls_back() {
    let http = RoutedHttpClient::new(
        vec![
            response(503, "unavailable"),
            response(503, "unavailable"),
            response(503, "unavailable"),
        ],
        vec![response(
            200,
            r#"{"results": [{"id": 1, "title": "Target Artist - Target Song (Remix)", "type": "master"}]}"#,
        )],
    );
    let chain = verifier(http.clone());

    let verdict = chain
        .verify("Target Artist", "Target Song", Some(VersionTag::Remix))
        .await
        .unwrap();

    // All three attempts spent against the primary before falling back.
    assert_eq!(http.musicbrainz_calls.load(Ordering::SeqCst), 3);
    assert!(verdict.confirmed);
    assert_eq!(verdict.source, Some(VerificationSource::Discogs));
}

#[tokio::test(start_paused = true)]
async fn primary_credential_error_skips_retries_but_still_falls_back() {
    let http = RoutedHttpClient::new(
        vec![response(401, r#"{"error": "unauthorized"}"#)],
        vec![response(
            200,
            r#"{"results": [{"id": 5, "title": "Target Artist - Target Song (Live)", "type": "master"}]}"#,
        )],
    );
    let chain = verifier(http.clone());

    let verdict = chain
        .verify("Target Artist", "Target Song", Some(VersionTag::Live))
        .await
        .unwrap();

    // Credential errors do not self-heal: one primary attempt, no retries,
    // straight to the secondary.
    assert_eq!(http.musicbrainz_calls.load(Ordering::SeqCst), 1);
    assert!(verdict.confirmed);
    assert_eq!(verdict.source, Some(VerificationSource::Discogs));
}

#[tokio::test(start_paused = true)]
async fn secondary_credential_error_is_not_retried() {
    let http = RoutedHttpClient::new(
        vec![mb_recordings(r#"{"recordings": []}"#)],
        vec![response(401, r#"{"message": "invalid token"}"#)],
    );
    let chain = verifier(http.clone());

    let verdict = chain
        .verify("Target Artist", "Target Song", Some(VersionTag::Remaster))
        .await
        .unwrap();

    assert!(!verdict.confirmed);
    // 401 aborts the secondary after a single attempt.
    assert_eq!(http.discogs_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_sources_yield_negative_verdict_not_error() {
    let http = RoutedHttpClient::new(
        vec![mb_recordings(r#"{"recordings": []}"#)],
        vec![response(200, r#"{"results": []}"#)],
    );
    let chain = verifier(http);

    let verdict = chain
        .verify("Unknown Artist", "Unknown Song", Some(VersionTag::Live))
        .await
        .unwrap();

    assert!(!verdict.confirmed);
    assert!(verdict.source.is_none());
}

#[tokio::test(start_paused = true)]
async fn remaster_claim_rejected_when_only_plain_records_exist() {
    let http = RoutedHttpClient::new(
        vec![mb_recordings(
            r#"{"recordings": [{"title": "Target Song"}, {"title": "Target Song", "disambiguation": "album version"}]}"#,
        )],
        vec![response(
            200,
            r#"{"results": [{"id": 9, "title": "Target Artist - Target Song", "type": "master"}]}"#,
        )],
    );
    let chain = verifier(http);

    let verdict = chain
        .verify("Target Artist", "Target Song", Some(VersionTag::Remaster))
        .await
        .unwrap();

    assert!(!verdict.confirmed);
}
