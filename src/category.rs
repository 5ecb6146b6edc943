use crate::{
    constants::quotes::{ALL_CATEGORIES, LAST_CATEGORY_KEY},
    error::{QuoteError, Result},
    models::quotes::Quote,
    storage::Storage,
};

/// `"all"` followed by every distinct label, in first-seen order.
pub fn derive(quotes: &[Quote]) -> Vec<String> {
    let mut labels = vec![ALL_CATEGORIES.to_string()];

    for quote in quotes {
        if !labels[1..].contains(&quote.category) {
            labels.push(quote.category.clone());
        }
    }

    labels
}

pub fn filter<'a>(quotes: &'a [Quote], label: &str) -> Vec<&'a Quote> {
    if label == ALL_CATEGORIES {
        return quotes.iter().collect();
    }

    quotes.iter().filter(|quote| quote.category == label).collect()
}

pub async fn restore_selection(storage: &Storage) -> Result<String> {
    let selection = storage.get(LAST_CATEGORY_KEY).await?;

    Ok(selection.unwrap_or_else(|| ALL_CATEGORIES.to_string()))
}

#[tracing::instrument(skip(storage, quotes))]
pub async fn persist_selection(storage: &Storage, quotes: &[Quote], label: &str) -> Result<()> {
    if !derive(quotes).iter().any(|known| known == label) {
        return Err(QuoteError::Validation(format!(
            "there are no quotes in category \"{label}\""
        )));
    }

    storage.set(LAST_CATEGORY_KEY, label).await?;
    tracing::info!(label = %label, "persisted category selection");

    Ok(())
}
