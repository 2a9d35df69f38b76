//! Integration tests for the caching, rate-limited client
mod common;

use std::time::Duration;

use tokio::time::{self, Instant};

use common::{available, client, client_with, default_buckets, FakeRemote, SESSION_ID};
use lobbywatch::client::CallType;
use lobbywatch::error::LobbyError;
use lobbywatch::lobby::LobbyParameters;
use lobbywatch::remote::LobbyEvent;
use lobbywatch::settings::{BucketSettings, RateLimitSettings};

#[tokio::test(start_paused = true)]
async fn member_detail_cached_within_ttl() {
    let remote = FakeRemote::new();
    let client = client_with(&remote, &default_buckets(), Duration::from_secs(60));

    let first = client.get_member_detail("abc").await.unwrap();
    time::sleep(Duration::from_secs(30)).await;
    let second = client.get_member_detail("abc").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(FakeRemote::calls(&remote.member_calls), 1);
}

#[tokio::test(start_paused = true)]
async fn member_detail_refetched_after_ttl() {
    let remote = FakeRemote::new();
    let client = client_with(&remote, &default_buckets(), Duration::from_secs(60));

    client.get_member_detail("abc").await.unwrap();
    time::sleep(Duration::from_secs(61)).await;
    client.get_member_detail("abc").await.unwrap();

    assert_eq!(FakeRemote::calls(&remote.member_calls), 2);
}

#[tokio::test(start_paused = true)]
async fn cache_hit_skips_rate_limiter() {
    let remote = FakeRemote::new();
    let client = client(&remote);

    client.get_member_detail("abc").await.unwrap();
    let before = available(&client, "app-short");
    client.get_member_detail("abc").await.unwrap();

    assert_eq!(available(&client, "app-short"), before);
    assert_eq!(FakeRemote::calls(&remote.member_calls), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_lookup_leaves_no_cache_entry() {
    let remote = FakeRemote::new();
    let client = client(&remote);

    remote.fail_member("abc");
    let result = client.get_member_detail("abc").await;
    assert!(matches!(result, Err(LobbyError::Remote(_))));
    assert!(client.member_cache().is_empty().unwrap());

    remote.heal_member("abc");
    client.get_member_detail("abc").await.unwrap();
    assert_eq!(FakeRemote::calls(&remote.member_calls), 2);
}

#[tokio::test(start_paused = true)]
async fn each_call_type_spends_its_own_buckets() {
    let remote = FakeRemote::new();
    let client = client(&remote);

    client
        .generate_code(SESSION_ID, &LobbyParameters::default().code_parameters())
        .await
        .unwrap();
    assert_eq!(available(&client, "generateCode-short"), 9);
    assert_eq!(available(&client, "generateCode-long"), 499);
    assert_eq!(available(&client, "app-short"), 19);
    assert_eq!(available(&client, "app-long"), 99);
    assert_eq!(available(&client, "getEventLog-short"), 10);

    client.get_member_detail("abc").await.unwrap();
    assert_eq!(available(&client, "app-short"), 18);
    assert_eq!(available(&client, "generateCode-short"), 9);
}

#[test]
fn call_types_share_application_buckets() {
    for call in [
        CallType::RegisterProvider,
        CallType::RegisterSession,
        CallType::GenerateCode,
        CallType::GetEventLog,
        CallType::GetMemberDetail,
    ] {
        let buckets = call.buckets();
        assert!(buckets.contains(&"app-short"));
        assert!(buckets.contains(&"app-long"));
    }
    assert_eq!(CallType::GetMemberDetail.buckets().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unconfigured_bucket_is_config_error() {
    let remote = FakeRemote::new();
    let buckets: Vec<BucketSettings> = default_buckets()
        .into_iter()
        .filter(|bucket| !bucket.name.starts_with("getEventLog"))
        .collect();
    let client = client_with(&remote, &buckets, Duration::from_secs(60));

    let result = client.get_event_log("CODE-0").await;
    assert!(matches!(result, Err(LobbyError::Config(_))));
    assert_eq!(FakeRemote::calls(&remote.event_log_calls), 0);
    // the shared buckets were not touched either
    assert_eq!(available(&client, "app-short"), 20);
}

#[tokio::test(start_paused = true)]
async fn calls_queue_behind_exhausted_method_quota() {
    let remote = FakeRemote::new();
    remote.set_event_log("CODE-0", vec![LobbyEvent::joined("abc")]);
    let mut buckets = default_buckets();
    for bucket in buckets.iter_mut() {
        if bucket.name == "getEventLog-short" {
            bucket.limit = RateLimitSettings {
                max_calls: 1,
                interval_seconds: 10,
            };
        }
    }
    let client = client_with(&remote, &buckets, Duration::from_secs(60));

    let start = Instant::now();
    client.get_event_log("CODE-0").await.unwrap();
    let events = client.get_event_log("CODE-0").await.unwrap();

    assert!(start.elapsed() >= Duration::from_secs(10));
    assert_eq!(events, vec![LobbyEvent::joined("abc")]);
    assert_eq!(FakeRemote::calls(&remote.event_log_calls), 2);
}

#[tokio::test(start_paused = true)]
async fn empty_code_list_is_remote_error() {
    let remote = FakeRemote::new();
    remote
        .no_codes
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let client = client(&remote);

    let result = client
        .generate_code(SESSION_ID, &LobbyParameters::default().code_parameters())
        .await;
    assert!(matches!(result, Err(LobbyError::Remote(_))));
}

#[tokio::test(start_paused = true)]
async fn remote_failures_propagate_unchanged() {
    let remote = FakeRemote::new();
    remote.fail_member("abc");
    let client = client(&remote);

    match client.get_member_detail("abc").await {
        Err(LobbyError::Remote(err)) => {
            assert_eq!(err.status, Some(500));
            assert_eq!(err.message, "member lookup failed");
        }
        other => panic!("expected remote error, got {:?}", other),
    }
    // no retry
    assert_eq!(FakeRemote::calls(&remote.member_calls), 1);
}
