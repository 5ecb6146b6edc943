use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

use crate::{
    constants::quotes::{DEFAULT_API_LIMIT, DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL},
    error::Result,
    models::quotes::{OutgoingQuote, Quote, RemoteResponse},
};

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub limit: u32,
    pub timeout: Duration,
    /// post locally added quotes back to the endpoint.
    pub push: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            endpoint: DEFAULT_API_URL.to_string(),
            limit: DEFAULT_API_LIMIT,
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            push: false,
        }
    }
}

/// client for the remote quote endpoint.
#[derive(Clone, Debug)]
pub struct RemoteClient {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("quotekeeper/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(RemoteClient { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn push_enabled(&self) -> bool {
        self.config.push
    }

    /// `GET <endpoint>?limit=n&_limit=n`; dummyjson reads `limit`,
    /// jsonplaceholder reads `_limit`.
    #[tracing::instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        let limit = self.config.limit.to_string();

        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&[("limit", limit.as_str()), ("_limit", limit.as_str())])
            .send()
            .await
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when fetching quotes from remote"),
            )?
            .error_for_status()
            .inspect_err(
                |e| tracing::error!(err = ?e, "remote answered the quotes request with an error"),
            )?;

        let text = resp.text().await.inspect_err(
            |e| tracing::error!(err = ?e, "an error occurred when receiving response text"),
        )?;

        let quotes = decode_quotes(&text).inspect_err(
            |e| tracing::error!(err = ?e, text = %text, "an error occurred when parsing response body"),
        )?;

        tracing::info!(count = quotes.len(), "fetched quotes from remote");

        Ok(quotes)
    }

    /// `POST <endpoint>` with the quote as json. the response body is ignored.
    #[tracing::instrument(skip_all, fields(endpoint = %self.config.endpoint, id = quote.id))]
    pub async fn publish(&self, quote: &Quote) -> Result<()> {
        let resp = self
            .client
            .post(&self.config.endpoint)
            .json(&OutgoingQuote::from(quote))
            .send()
            .await
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when posting quote to remote"),
            )?;

        tracing::info!(status = %resp.status(), "posted quote to remote");

        Ok(())
    }
}

/// accepts both a bare array of records and an object with a `quotes` array.
pub fn decode_quotes(text: &str) -> Result<Vec<Quote>> {
    let body: RemoteResponse = serde_json::from_str(text)?;

    Ok(body.into_quotes())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::error::QuoteError;

    #[derive(Clone)]
    pub(crate) struct FakeRemote {
        pub body: Value,
        pub status: StatusCode,
        pub delay: Duration,
        pub gets: Arc<AtomicUsize>,
        pub queries: Arc<std::sync::Mutex<Vec<Vec<(String, String)>>>>,
        pub posts: Arc<std::sync::Mutex<Vec<Value>>>,
    }

    impl FakeRemote {
        pub(crate) fn serving(body: Value) -> Self {
            FakeRemote {
                body,
                status: StatusCode::OK,
                delay: Duration::ZERO,
                gets: Arc::default(),
                queries: Arc::default(),
                posts: Arc::default(),
            }
        }
    }

    async fn list(
        State(remote): State<FakeRemote>,
        Query(params): Query<Vec<(String, String)>>,
    ) -> (StatusCode, Json<Value>) {
        remote.gets.fetch_add(1, Ordering::SeqCst);
        remote.queries.lock().unwrap().push(params);
        tokio::time::sleep(remote.delay).await;

        (remote.status, Json(remote.body.clone()))
    }

    async fn create(State(remote): State<FakeRemote>, Json(body): Json<Value>) -> StatusCode {
        remote.posts.lock().unwrap().push(body);
        StatusCode::CREATED
    }

    /// binds to port 0 and returns the quotes endpoint url.
    pub(crate) async fn start_server(remote: FakeRemote) -> String {
        let app = Router::new()
            .route("/quotes", get(list).post(create))
            .with_state(remote);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/quotes")
    }

    pub(crate) fn client_for(endpoint: String) -> RemoteClient {
        RemoteClient::new(RemoteConfig {
            endpoint,
            timeout: Duration::from_millis(500),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_wrapped_dummyjson_shape() {
        let remote = FakeRemote::serving(json!({
            "quotes": [
                {"id": 1, "quote": "first", "author": "A"},
                {"id": 2, "quote": "second", "author": "B"},
            ],
            "total": 2,
        }));
        let client = client_for(start_server(remote).await);

        let quotes = client.fetch_quotes().await.unwrap();

        assert_eq!(
            quotes,
            vec![Quote::remote(1, "first", "A"), Quote::remote(2, "second", "B")]
        );
    }

    #[tokio::test]
    async fn fetches_bare_array_shape() {
        let remote = FakeRemote::serving(json!([
            {"userId": 1, "id": 1, "title": "t", "body": "post body"},
        ]));
        let client = client_for(start_server(remote).await);

        let quotes = client.fetch_quotes().await.unwrap();

        assert_eq!(quotes, vec![Quote::remote(1, "post body", "User 1")]);
    }

    #[tokio::test]
    async fn sends_both_limit_parameters() {
        let remote = FakeRemote::serving(json!({"quotes": []}));
        let queries = remote.queries.clone();
        let client = client_for(start_server(remote).await);

        assert!(client.fetch_quotes().await.unwrap().is_empty());

        let queries = queries.lock().unwrap();
        assert_eq!(
            queries[0],
            vec![
                ("limit".to_string(), "100".to_string()),
                ("_limit".to_string(), "100".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn error_status_is_a_transport_error() {
        let mut remote = FakeRemote::serving(json!({"message": "nope"}));
        remote.status = StatusCode::INTERNAL_SERVER_ERROR;
        let client = client_for(start_server(remote).await);

        let result = client.fetch_quotes().await;

        assert!(matches!(result, Err(QuoteError::Transport(_))));
    }

    #[tokio::test]
    async fn unexpected_body_is_a_decode_error() {
        let remote = FakeRemote::serving(json!({"message": "no quotes here"}));
        let client = client_for(start_server(remote).await);

        let result = client.fetch_quotes().await;

        assert!(matches!(result, Err(QuoteError::Decode(_))));
    }

    #[tokio::test]
    async fn slow_remote_times_out() {
        let mut remote = FakeRemote::serving(json!({"quotes": []}));
        remote.delay = Duration::from_secs(5);
        let client = client_for(start_server(remote).await);

        match client.fetch_quotes().await {
            Err(QuoteError::Transport(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_posts_quote_body() {
        let remote = FakeRemote::serving(json!({"quotes": []}));
        let posts = remote.posts.clone();
        let client = client_for(start_server(remote).await);

        client
            .publish(&Quote::local(4, "new words", "Me"))
            .await
            .unwrap();

        let posts = posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["quote"], "new words");
        assert_eq!(posts[0]["author"], "Me");
        assert_eq!(posts[0]["body"], "new words");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode_quotes("<html>"), Err(QuoteError::Decode(_))));
    }
}
