use std::sync::{Arc, PoisonError};

use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{error::Result, models::quotes::Quote, remote::RemoteClient, store::QuoteStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Fetching,
    Merging,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub added: usize,
    pub replaced: usize,
    pub total: usize,
}

#[derive(Clone, Debug)]
pub struct SyncAttempt {
    pub at: OffsetDateTime,
    /// the report, or the error rendered for display.
    pub outcome: std::result::Result<SyncReport, String>,
}

#[derive(Clone, Debug, Default)]
pub struct SyncStatus {
    pub state: SyncState,
    pub last_attempt: Option<SyncAttempt>,
}

/// merges `remote` into a copy of `local`.
///
/// a remote record replaces the first record with the same `(origin, id)`
/// only when its text is strictly longer; unmatched records are appended in
/// remote order. positions of existing records never change.
pub fn merge(local: &[Quote], remote: &[Quote]) -> Vec<Quote> {
    let mut merged = local.to_vec();

    for record in remote {
        match merged
            .iter()
            .position(|existing| existing.key() == record.key())
        {
            Some(idx) => {
                if record.text_len() > merged[idx].text_len() {
                    merged[idx] = record.clone();
                }
            }
            None => merged.push(record.clone()),
        }
    }

    merged
}

/// runs fetch-merge-persist cycles against the remote source.
///
/// at most one cycle is in flight; a trigger that arrives while another cycle
/// runs waits for it and then runs on its own. the store is only locked for
/// the merge, so adds keep working while a fetch is pending.
pub struct Reconciler {
    remote: RemoteClient,
    store: Arc<Mutex<QuoteStore>>,
    in_flight: Mutex<()>,
    status: std::sync::Mutex<SyncStatus>,
}

impl Reconciler {
    pub fn new(remote: RemoteClient, store: Arc<Mutex<QuoteStore>>) -> Self {
        Reconciler {
            remote,
            store,
            in_flight: Mutex::new(()),
            status: std::sync::Mutex::default(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn reconcile(&self) -> Result<SyncReport> {
        let _guard = self.in_flight.lock().await;

        self.set_state(SyncState::Fetching);
        let result = self.run().await;

        let outcome = match &result {
            Ok(report) => {
                tracing::info!(
                    fetched = report.fetched,
                    added = report.added,
                    replaced = report.replaced,
                    total = report.total,
                    "finished syncing quotes with remote"
                );
                Ok(*report)
            }
            Err(e) => {
                tracing::warn!(err = ?e, "quote sync failed, keeping local quotes");
                Err(e.to_string())
            }
        };

        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        status.state = SyncState::Idle;
        status.last_attempt = Some(SyncAttempt {
            at: OffsetDateTime::now_utc(),
            outcome,
        });

        result
    }

    async fn run(&self) -> Result<SyncReport> {
        let remote = self.remote.fetch_quotes().await?;

        self.set_state(SyncState::Merging);
        let mut store = self.store.lock().await;
        store.merge_remote(&remote).await
    }

    pub fn status(&self) -> SyncStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, state: SyncState) {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state = state;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::{
        error::QuoteError,
        remote::tests::{client_for, start_server, FakeRemote},
        storage::Storage,
        store::default_quotes,
    };

    #[test]
    fn merge_keeps_longer_local_text_and_appends_new_ids() {
        let local = vec![Quote::remote(1, "ab", "x"), Quote::remote(2, "xyz", "x")];
        let remote = vec![Quote::remote(1, "a", "y"), Quote::remote(3, "q", "y")];

        assert_eq!(
            merge(&local, &remote),
            vec![
                Quote::remote(1, "ab", "x"),
                Quote::remote(2, "xyz", "x"),
                Quote::remote(3, "q", "y"),
            ]
        );
    }

    #[test]
    fn merge_replaces_in_place_when_remote_is_longer() {
        let local = vec![
            Quote::remote(1, "short", "x"),
            Quote::local(1, "mine", "me"),
        ];
        let remote = vec![Quote::remote(1, "much longer", "y")];

        assert_eq!(
            merge(&local, &remote),
            vec![
                Quote::remote(1, "much longer", "y"),
                Quote::local(1, "mine", "me"),
            ]
        );
    }

    #[test]
    fn merge_equal_length_is_not_a_replacement() {
        let local = vec![Quote::remote(1, "abc", "x")];
        let remote = vec![Quote::remote(1, "xyz", "y")];

        assert_eq!(merge(&local, &remote), local);
    }

    #[test]
    fn merge_does_not_match_across_origins() {
        let local = vec![Quote::local(1, "a", "me")];
        let remote = vec![Quote::remote(1, "a much longer remote quote", "User 1")];

        assert_eq!(
            merge(&local, &remote),
            vec![
                Quote::local(1, "a", "me"),
                Quote::remote(1, "a much longer remote quote", "User 1"),
            ]
        );
    }

    #[test]
    fn merge_matches_records_appended_earlier_in_the_same_pass() {
        let remote = vec![Quote::remote(7, "a", "x"), Quote::remote(7, "abc", "x")];

        assert_eq!(merge(&[], &remote), vec![Quote::remote(7, "abc", "x")]);
    }

    #[test]
    fn merge_is_idempotent() {
        let local = vec![
            Quote::remote(1, "ab", "x"),
            Quote::remote(2, "xyz", "x"),
            Quote::local(1, "l", "me"),
        ];
        let remote = vec![
            Quote::remote(1, "a", "y"),
            Quote::remote(2, "longer text", "y"),
            Quote::remote(3, "q", "y"),
        ];

        let once = merge(&local, &remote);

        assert_eq!(merge(&once, &remote), once);
    }

    async fn reconciler_for(remote: FakeRemote) -> (Reconciler, Arc<Mutex<QuoteStore>>) {
        let endpoint = start_server(remote).await;
        let store = QuoteStore::load(Storage::in_memory().await).await.unwrap();
        let store = Arc::new(Mutex::new(store));

        (Reconciler::new(client_for(endpoint), store.clone()), store)
    }

    #[tokio::test]
    async fn reconcile_merges_and_persists() {
        let remote = FakeRemote::serving(json!({
            "quotes": [
                {"id": 1, "quote": "remote one", "author": "A"},
                {"id": 2, "quote": "remote two", "author": "B"},
            ],
        }));
        let (reconciler, store) = reconciler_for(remote).await;

        let report = reconciler.reconcile().await.unwrap();

        assert_eq!(
            report,
            SyncReport {
                fetched: 2,
                added: 2,
                replaced: 0,
                total: 5,
            }
        );

        let store = store.lock().await;
        assert_eq!(&store.quotes()[..3], default_quotes().as_slice());
        assert_eq!(store.quotes()[3], Quote::remote(1, "remote one", "A"));

        let status = reconciler.status();
        assert_eq!(status.state, SyncState::Idle);
        assert_eq!(status.last_attempt.unwrap().outcome, Ok(report));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_store_unchanged() {
        let mut remote = FakeRemote::serving(json!({"quotes": []}));
        remote.delay = Duration::from_secs(5);
        let (reconciler, store) = reconciler_for(remote).await;

        let result = reconciler.reconcile().await;

        assert!(matches!(result, Err(QuoteError::Transport(_))));
        assert_eq!(store.lock().await.quotes(), default_quotes().as_slice());

        let status = reconciler.status();
        assert_eq!(status.state, SyncState::Idle);
        assert!(status.last_attempt.unwrap().outcome.is_err());
    }

    #[tokio::test]
    async fn overlapping_triggers_serialize() {
        let mut remote = FakeRemote::serving(json!([
            {"id": 10, "quote": "ten", "author": "A"},
        ]));
        remote.delay = Duration::from_millis(100);
        let gets = remote.gets.clone();
        let (reconciler, store) = reconciler_for(remote).await;

        let (first, second) = tokio::join!(reconciler.reconcile(), reconciler.reconcile());

        let (first, second) = (first.unwrap(), second.unwrap());
        assert_eq!(first.added + second.added, 1);
        assert_eq!(gets.load(Ordering::SeqCst), 2);
        assert_eq!(store.lock().await.len(), 4);
    }

    #[tokio::test]
    async fn adds_during_a_fetch_are_not_lost() {
        let mut remote = FakeRemote::serving(json!([
            {"id": 10, "quote": "ten", "author": "A"},
        ]));
        remote.delay = Duration::from_millis(200);
        let (reconciler, store) = reconciler_for(remote).await;

        let add = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            store.lock().await.add("added meanwhile", "me").await.unwrap()
        };
        let (report, added) = tokio::join!(reconciler.reconcile(), add);

        assert_eq!(report.unwrap().total, 5);
        let store = store.lock().await;
        assert_eq!(store.quotes()[3], added);
        assert_eq!(store.quotes()[4], Quote::remote(10, "ten", "A"));
    }
}
