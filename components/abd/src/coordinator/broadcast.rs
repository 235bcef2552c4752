use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;

use crate::quorums::ReplicaSet;
use crate::replica::ReplicaClient;
use crate::ReplicaError;

pub type Peer = Arc<dyn ReplicaClient>;

/// bcast sends one request to every targeted replica concurrently and waits for all of them.
///
/// Each call runs in its own task and is bounded by `per_call`. A replica that does not reply
/// in time gets a `ReplicaError::Timeout`. The returned replies are ordered by replica index.
pub async fn bcast<T, F, Fut>(
    peers: &[Peer],
    targets: &ReplicaSet,
    per_call: Duration,
    f: F,
) -> Vec<(usize, Result<T, ReplicaError>)>
where
    T: Send + 'static,
    F: Fn(Peer) -> Fut,
    Fut: Future<Output = Result<T, ReplicaError>> + Send + 'static,
{
    let mut idxs = Vec::with_capacity(peers.len());
    let mut handles = Vec::with_capacity(peers.len());

    for (i, p) in peers.iter().enumerate() {
        if !targets.contains(i) {
            continue;
        }

        let fut = f(p.clone());
        let h = tokio::spawn(async move {
            match timeout(per_call, fut).await {
                Ok(rst) => rst,
                Err(_) => Err(ReplicaError::Timeout(per_call)),
            }
        });

        idxs.push(i);
        handles.push(h);
    }

    let joined = join_all(handles).await;

    idxs.into_iter()
        .zip(joined.into_iter())
        .map(|(i, j)| match j {
            Ok(rst) => (i, rst),
            Err(e) => (i, Err(ReplicaError::Internal(format!("{}", e)))),
        })
        .collect()
}

/// oks keeps only the successful replies.
pub fn oks<T>(replies: Vec<(usize, Result<T, ReplicaError>)>) -> Vec<(usize, T)> {
    replies
        .into_iter()
        .filter_map(|(i, r)| r.ok().map(|v| (i, v)))
        .collect()
}
