use crate::{error::Result, models::quotes::Quote};

pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// the whole collection as a pretty-printed json array.
pub fn export(quotes: &[Quote]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(quotes)?)
}

/// parses an exported file. records are not checked against the current
/// collection; the store appends them as they are.
pub fn import(bytes: &[u8]) -> Result<Vec<Quote>> {
    Ok(serde_json::from_slice(bytes)?)
}
