use serde::{Deserialize, Serialize};

/// where a quote was first numbered.
///
/// local and remote ids are counted independently, so a quote is identified
/// by the pair `(origin, id)` rather than by `id` alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    #[default]
    Local,
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quote {
    #[serde(default)]
    pub origin: Origin,
    pub id: i64,
    #[serde(alias = "quote", alias = "body")]
    pub text: String,
    #[serde(alias = "author")]
    pub category: String,
}

impl Quote {
    pub fn local(id: i64, text: impl Into<String>, category: impl Into<String>) -> Self {
        Quote {
            origin: Origin::Local,
            id,
            text: text.into(),
            category: category.into(),
        }
    }

    pub fn remote(id: i64, text: impl Into<String>, category: impl Into<String>) -> Self {
        Quote {
            origin: Origin::Remote,
            id,
            text: text.into(),
            category: category.into(),
        }
    }

    pub fn key(&self) -> (Origin, i64) {
        (self.origin, self.id)
    }

    /// length used by the merge tie-break, counted in characters.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// a quote-like record as served by the remote endpoint.
///
/// dummyjson serves `{ id, quote, author }`, jsonplaceholder-style endpoints
/// serve `{ id, body, userId }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQuote {
    pub id: i64,
    #[serde(alias = "quote", alias = "body")]
    pub text: String,
    #[serde(alias = "category")]
    pub author: Option<String>,
    pub user_id: Option<i64>,
}

impl From<RemoteQuote> for Quote {
    fn from(remote: RemoteQuote) -> Self {
        let category = match (remote.author, remote.user_id) {
            (Some(author), _) => author,
            (None, Some(user_id)) => format!("User {user_id}"),
            (None, None) => String::new(),
        };

        Quote::remote(remote.id, remote.text, category)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RemoteResponse {
    Bare(Vec<RemoteQuote>),
    Wrapped { quotes: Vec<RemoteQuote> },
}

impl RemoteResponse {
    pub fn into_quotes(self) -> Vec<Quote> {
        let records = match self {
            RemoteResponse::Bare(records) => records,
            RemoteResponse::Wrapped { quotes } => quotes,
        };

        records.into_iter().map(Quote::from).collect()
    }
}

/// body sent when creating a quote on the remote endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingQuote<'a> {
    pub quote: &'a str,
    pub author: &'a str,
    pub body: &'a str,
}

impl<'a> From<&'a Quote> for OutgoingQuote<'a> {
    fn from(quote: &'a Quote) -> Self {
        OutgoingQuote {
            quote: &quote.text,
            author: &quote.category,
            body: &quote.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_variant_field_names() {
        let quotes: Vec<Quote> = serde_json::from_str(
            r#"[
                {"id": 1, "quote": "a", "author": "x"},
                {"id": 2, "body": "b", "category": "y"},
                {"origin": "remote", "id": 3, "text": "c", "category": "z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            quotes,
            vec![
                Quote::local(1, "a", "x"),
                Quote::local(2, "b", "y"),
                Quote::remote(3, "c", "z"),
            ]
        );
    }

    #[test]
    fn remote_user_id_becomes_label() {
        let remote: RemoteQuote =
            serde_json::from_str(r#"{"userId": 4, "id": 31, "title": "t", "body": "hello"}"#)
                .unwrap();

        assert_eq!(Quote::from(remote), Quote::remote(31, "hello", "User 4"));
    }

    #[test]
    fn remote_response_accepts_both_shapes() {
        let bare: RemoteResponse =
            serde_json::from_str(r#"[{"id": 1, "quote": "a", "author": "x"}]"#).unwrap();
        let wrapped: RemoteResponse = serde_json::from_str(
            r#"{"quotes": [{"id": 1, "quote": "a", "author": "x"}], "total": 1, "skip": 0, "limit": 100}"#,
        )
        .unwrap();

        assert_eq!(bare.into_quotes(), vec![Quote::remote(1, "a", "x")]);
        assert_eq!(wrapped.into_quotes(), vec![Quote::remote(1, "a", "x")]);
    }

    #[test]
    fn text_len_counts_characters() {
        assert_eq!(Quote::local(1, "héllo", "x").text_len(), 5);
    }
}
