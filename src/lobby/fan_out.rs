use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::client::{CachingClient, MemberLookup};
use crate::concurrency_error;
use crate::error::Result;
use crate::remote::MemberDetail;

/// Resolve every id concurrently; output order matches `ids`.
///
/// Fails on the first lookup error, cancelling the rest. Fresh results are
/// only cached once every lookup succeeded, so a failed batch leaves the
/// cache as it found it.
pub async fn resolve_all(client: &CachingClient, ids: &[String]) -> Result<Vec<MemberDetail>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut join_set: JoinSet<(usize, Result<MemberLookup>)> = JoinSet::new();
    for (idx, id) in ids.iter().enumerate() {
        let client = client.clone();
        let id = id.clone();
        join_set.spawn(async move { (idx, client.lookup_member_detail(&id).await) });
    }

    let mut slots: Vec<Option<MemberLookup>> = vec![None; ids.len()];
    while let Some(joined) = join_set.join_next().await {
        let (idx, result) = joined.map_err(|e| {
            concurrency_error!("Member lookup task failed to complete: {}", e)
        })?;
        match result {
            Ok(lookup) => slots[idx] = Some(lookup),
            Err(err) => {
                error!("Lookup for member {} failed: {}", ids[idx], err);
                join_set.abort_all();
                return Err(err);
            }
        }
    }

    let lookups = slots
        .into_iter()
        .collect::<Option<Vec<MemberLookup>>>()
        .ok_or_else(|| concurrency_error!("Member lookup finished without a result"))?;
    client.commit_member_details(&lookups)?;
    debug!("Resolved {} members", lookups.len());
    Ok(lookups.into_iter().map(|lookup| lookup.detail).collect())
}
