use rand::seq::SliceRandom;

use crate::{
    category,
    constants::quotes::{DEFAULT_QUOTES, QUOTES_KEY},
    error::{QuoteError, Result},
    models::quotes::{Origin, Quote},
    storage::Storage,
    sync::{self, SyncReport},
};

/// the in-memory quote collection and its persisted snapshot.
///
/// every mutation goes through this type and is written back to storage
/// before it becomes visible; a failed write leaves the collection untouched.
#[derive(Debug)]
pub struct QuoteStore {
    storage: Storage,
    quotes: Vec<Quote>,
}

pub fn default_quotes() -> Vec<Quote> {
    DEFAULT_QUOTES
        .iter()
        .zip(1..)
        .map(|((text, category), id)| Quote::local(id, *text, *category))
        .collect()
}

impl QuoteStore {
    /// loads the persisted snapshot, or seeds and persists the defaults when
    /// there is none or it cannot be decoded.
    #[tracing::instrument(skip_all)]
    pub async fn load(storage: Storage) -> Result<Self> {
        let snapshot = match storage.get(QUOTES_KEY).await? {
            Some(raw) => match serde_json::from_str::<Vec<Quote>>(&raw) {
                Ok(quotes) => Some(quotes),
                Err(e) => {
                    tracing::error!(err = ?e, "persisted quotes are corrupt, falling back to defaults");
                    None
                }
            },
            None => None,
        };

        match snapshot {
            Some(quotes) => {
                tracing::info!(count = quotes.len(), "loaded persisted quotes");

                Ok(QuoteStore { storage, quotes })
            }
            None => {
                tracing::info!("seeding default quotes");
                let store = QuoteStore {
                    storage,
                    quotes: default_quotes(),
                };
                store.save().await?;

                Ok(store)
            }
        }
    }

    pub async fn save(&self) -> Result<()> {
        persist(&self.storage, &self.quotes).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn add(&mut self, text: &str, category: &str) -> Result<Quote> {
        let (text, category) = (text.trim(), category.trim());

        if text.is_empty() || category.is_empty() {
            return Err(QuoteError::Validation(
                "please enter both quote text and category".to_string(),
            ));
        }

        let quote = Quote::local(self.next_local_id(), text, category);

        self.quotes.push(quote.clone());
        if let Err(e) = self.save().await {
            self.quotes.pop();
            return Err(e);
        }

        tracing::info!(id = quote.id, category = %quote.category, "added quote");

        Ok(quote)
    }

    /// one past the highest local id, so imported records never get shadowed.
    fn next_local_id(&self) -> i64 {
        self.quotes
            .iter()
            .filter(|quote| quote.origin == Origin::Local)
            .map(|quote| quote.id)
            .max()
            .map_or(1, |id| id + 1)
    }

    /// merges a freshly fetched remote collection into the current one.
    #[tracing::instrument(skip_all, fields(remote = remote.len()))]
    pub async fn merge_remote(&mut self, remote: &[Quote]) -> Result<SyncReport> {
        let merged = sync::merge(&self.quotes, remote);

        // merge keeps positions, so any differing prefix entry was replaced.
        let replaced = self
            .quotes
            .iter()
            .zip(&merged)
            .filter(|(before, after)| before != after)
            .count();
        let added = merged.len() - self.quotes.len();

        persist(&self.storage, &merged).await?;
        self.quotes = merged;

        Ok(SyncReport {
            fetched: remote.len(),
            added,
            replaced,
            total: self.quotes.len(),
        })
    }

    /// appends every imported record as-is. importing the same file twice
    /// yields every record twice.
    #[tracing::instrument(skip_all, fields(imported = imported.len()))]
    pub async fn import(&mut self, imported: Vec<Quote>) -> Result<usize> {
        let previous_len = self.quotes.len();
        let count = imported.len();

        self.quotes.extend(imported);
        if let Err(e) = self.save().await {
            self.quotes.truncate(previous_len);
            return Err(e);
        }

        tracing::info!(count, total = self.quotes.len(), "imported quotes");

        Ok(count)
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        category::derive(&self.quotes)
    }

    pub fn filtered(&self, label: &str) -> Vec<&Quote> {
        category::filter(&self.quotes, label)
    }

    pub fn random(&self, label: &str) -> Option<Quote> {
        self.filtered(label)
            .choose(&mut rand::thread_rng())
            .map(|quote| (*quote).clone())
    }
}

async fn persist(storage: &Storage, quotes: &[Quote]) -> Result<()> {
    let raw = serde_json::to_string(quotes)?;
    storage.set(QUOTES_KEY, &raw).await
}
