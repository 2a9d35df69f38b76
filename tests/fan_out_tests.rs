mod common;

use std::time::Duration;

use tokio::time::Instant;

use common::{client, member, FakeRemote};
use lobbywatch::error::LobbyError;
use lobbywatch::lobby::resolve_all;

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn empty_input_makes_no_calls() {
    let remote = FakeRemote::new();
    let client = client(&remote);

    let resolved = resolve_all(&client, &[]).await.unwrap();
    assert!(resolved.is_empty());
    assert_eq!(FakeRemote::calls(&remote.member_calls), 0);
}

#[tokio::test(start_paused = true)]
async fn output_follows_input_order() {
    let remote = FakeRemote::new();
    remote.delay_member("first", Duration::from_secs(3));
    remote.delay_member("second", Duration::from_secs(1));
    let client = client(&remote);

    let resolved = resolve_all(&client, &ids(&["first", "second", "third"]))
        .await
        .unwrap();
    assert_eq!(
        resolved,
        vec![member("first"), member("second"), member("third")]
    );
}

#[tokio::test(start_paused = true)]
async fn lookups_run_concurrently() {
    let remote = FakeRemote::new();
    for id in ["a", "b", "c", "d"] {
        remote.delay_member(id, Duration::from_secs(2));
    }
    let client = client(&remote);

    let start = Instant::now();
    resolve_all(&client, &ids(&["a", "b", "c", "d"]))
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_secs(4));
    assert_eq!(client.member_cache().len().unwrap(), 4);
}

#[tokio::test(start_paused = true)]
async fn first_failure_fails_the_batch() {
    let remote = FakeRemote::new();
    remote.delay_member("slow", Duration::from_secs(5));
    remote.fail_member("broken");
    let client = client(&remote);

    let start = Instant::now();
    let result = resolve_all(&client, &ids(&["slow", "fine", "broken"])).await;

    assert!(matches!(result, Err(LobbyError::Remote(_))));
    assert!(start.elapsed() < Duration::from_secs(5));
    // the lookup that did succeed is not cached either
    assert!(client.member_cache().is_empty().unwrap());
}

#[tokio::test(start_paused = true)]
async fn cached_members_skip_the_remote() {
    let remote = FakeRemote::new();
    let client = client(&remote);

    client.get_member_detail("known").await.unwrap();
    let resolved = resolve_all(&client, &ids(&["known", "new"])).await.unwrap();

    assert_eq!(resolved, vec![member("known"), member("new")]);
    assert_eq!(FakeRemote::calls(&remote.member_calls), 2);
}

#[tokio::test(start_paused = true)]
async fn order_holds_under_random_latency() {
    use rand::Rng;

    let remote = FakeRemote::new();
    let mut rng = rand::thread_rng();
    let members: Vec<String> = (0..10).map(|n| format!("member-{}", n)).collect();
    for id in &members {
        remote.delay_member(id, Duration::from_millis(rng.gen_range(0..2_000)));
    }
    let client = client(&remote);

    let resolved = resolve_all(&client, &members).await.unwrap();
    let expected: Vec<_> = members.iter().map(|id| member(id)).collect();
    assert_eq!(resolved, expected);
}
