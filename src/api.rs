use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::models::{GraphQlResponse, MediaSeason};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

/// Named values substituted into a query's `$placeholders`.
pub type Variables = Map<String, Value>;

const DETAILS_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    id
    title { romaji, english, native }
    description
    episodes
    duration
    status
    startDate { year, month, day }
    endDate { year, month, day }
    season
    seasonYear
    format
    genres
    tags { name, rank }
    averageScore
    popularity
    studios { nodes { name } }
    coverImage { large }
  }
}
"#;

const SEARCH_QUERY: &str = r#"
query ($search: String, $page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo { total, currentPage, lastPage, hasNextPage, perPage }
    media(search: $search, type: ANIME, sort: POPULARITY_DESC) {
      id
      title { romaji, english, native }
      episodes
      format
      status
      seasonYear
      averageScore
      genres
      coverImage { medium }
    }
  }
}
"#;

const SEASONAL_QUERY: &str = r#"
query ($season: MediaSeason, $seasonYear: Int, $page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo { total, currentPage, lastPage, hasNextPage, perPage }
    media(season: $season, seasonYear: $seasonYear, type: ANIME, sort: POPULARITY_DESC) {
      id
      title { romaji, english, native }
      episodes
      format
      status
      seasonYear
      averageScore
      genres
      coverImage { medium }
    }
  }
}
"#;

/// Blocking GraphQL client bound to a single endpoint.
///
/// Every call is exactly one POST. Nothing is cached or retried.
pub struct AniListClient {
    client: Client,
    config: ClientConfig,
}

impl AniListClient {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| TransportError::InvalidHeader { name: "User-Agent" })?;
        headers.insert(header::USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Posts `query` and returns the decoded JSON body untouched.
    ///
    /// A body holding GraphQL `errors` is a successful return; only
    /// connection failures, non-2xx statuses and non-JSON bodies are errors.
    pub fn execute(
        &self,
        query: &str,
        variables: Option<&Variables>,
    ) -> Result<Value, TransportError> {
        let payload = build_payload(query, variables);
        debug!("POST {} {}", self.config.endpoint, payload);

        let res = self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .map_err(TransportError::Request)?;

        let status = res.status();
        if !status.is_success() {
            warn!("{} answered with HTTP {}", self.config.endpoint, status);
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = res.text().map_err(TransportError::Request)?;
        serde_json::from_str(&body).map_err(TransportError::Decode)
    }

    pub fn anime_by_id(&self, id: i32) -> Result<Value, TransportError> {
        let vars = variables(json!({ "id": id }));
        self.execute(DETAILS_QUERY, Some(&vars))
    }

    /// Ordering is left to the service (`POPULARITY_DESC`).
    pub fn search_anime(
        &self,
        search: &str,
        page: i32,
        per_page: i32,
    ) -> Result<Value, TransportError> {
        let vars = variables(json!({
            "search": search,
            "page": page,
            "perPage": per_page
        }));
        self.execute(SEARCH_QUERY, Some(&vars))
    }

    pub fn seasonal_anime(
        &self,
        year: i32,
        season: MediaSeason,
        page: i32,
        per_page: i32,
    ) -> Result<Value, TransportError> {
        let vars = variables(json!({
            "season": season,
            "seasonYear": year,
            "page": page,
            "perPage": per_page
        }));
        self.execute(SEASONAL_QUERY, Some(&vars))
    }
}

/// `{"query": ..., "variables": ...}` with the variables key left out when
/// there are none.
pub fn build_payload(query: &str, variables: Option<&Variables>) -> Value {
    let mut payload = Map::new();
    payload.insert("query".to_string(), Value::String(query.to_string()));
    if let Some(vars) = variables
        && !vars.is_empty()
    {
        payload.insert("variables".to_string(), Value::Object(vars.clone()));
    }
    Value::Object(payload)
}

/// Turns a `json!({..})` literal into a variables map. Anything other than
/// an object yields an empty map.
pub fn variables(value: Value) -> Variables {
    match value {
        Value::Object(map) => map,
        _ => Variables::new(),
    }
}

/// Reads a raw response into a typed envelope. A shape mismatch is reported
/// as a decode failure, same as a non-JSON body.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<GraphQlResponse<T>, TransportError> {
    serde_json::from_value(value).map_err(TransportError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaData;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// reqwest's blocking client owns a runtime of its own, so it has to be
    /// built, used and dropped off the async test thread.
    async fn blocking<F, T>(f: F) -> T
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.unwrap()
    }

    fn client_for(uri: &str) -> AniListClient {
        AniListClient::new(ClientConfig::default().with_endpoint(uri)).unwrap()
    }

    #[test]
    fn test_payload_omits_absent_variables() {
        let payload = build_payload("{ Viewer { id } }", None);
        assert_eq!(payload.to_string(), r#"{"query":"{ Viewer { id } }"}"#);
    }

    #[test]
    fn test_payload_omits_empty_variables() {
        let payload = build_payload("q", Some(&Variables::new()));
        assert!(payload.get("variables").is_none());
    }

    #[test]
    fn test_payload_keeps_variables_verbatim() {
        let vars = variables(json!({ "perPage": 5, "search": "Naruto", "id_in": [1, 2] }));
        let payload = build_payload("q", Some(&vars));
        assert_eq!(
            payload.to_string(),
            r#"{"query":"q","variables":{"perPage":5,"search":"Naruto","id_in":[1,2]}}"#
        );
    }

    #[test]
    fn test_variables_from_non_object_is_empty() {
        assert!(variables(json!([1, 2])).is_empty());
        assert!(variables(Value::Null).is_empty());
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let config = ClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..ClientConfig::default()
        };
        let err = AniListClient::new(config).err().unwrap();
        assert!(matches!(err, TransportError::InvalidHeader { name: "User-Agent" }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_execute_posts_json_with_fixed_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", "application/json"))
            .and(header("accept", "application/json"))
            .and(body_json(json!({ "query": "{ Media(id: 1) { id } }" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "Media": { "id": 1 } } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let result = blocking(move || client_for(&uri).execute("{ Media(id: 1) { id } }", None)).await;

        assert_eq!(result.unwrap(), json!({ "data": { "Media": { "id": 1 } } }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_execute_returns_graphql_errors_unchanged() {
        let server = MockServer::start().await;
        let body = json!({ "errors": [{ "message": "Not Found." }] });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let uri = server.uri();
        let result = blocking(move || client_for(&uri).anime_by_id(999_999_999)).await;

        assert_eq!(result.unwrap(), body);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_not_found_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "data": { "Media": null } })),
            )
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = blocking(move || client_for(&uri).execute("q", None))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Status { status: 404 }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_error_is_not_retried_or_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = blocking(move || client_for(&uri).execute("q", None))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Status { status: 500 }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\": "))
            .mount(&server)
            .await;

        let uri = server.uri();
        let err = blocking(move || client_for(&uri).execute("q", None))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unreachable_endpoint_is_request_error() {
        let err = blocking(|| client_for("http://127.0.0.1:1").execute("q", None))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Request(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_anime_by_id_sends_id_variable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "variables": { "id": 101922 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "Media": { "id": 101922, "title": { "romaji": "Kimetsu no Yaiba" } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let value = blocking(move || client_for(&uri).anime_by_id(101922))
            .await
            .unwrap();

        let response = decode::<MediaData>(value).unwrap();
        let media = response.data.unwrap().media.unwrap();
        assert_eq!(media.headline_title(), Some("Kimetsu no Yaiba"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_sends_paging_variables() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "variables": { "search": "Attack on Titan", "page": 2, "perPage": 5 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "Page": { "media": [] } } })))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let result = blocking(move || client_for(&uri).search_anime("Attack on Titan", 2, 5)).await;
        assert!(result.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_seasonal_sends_upper_case_season() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "variables": { "season": "WINTER", "seasonYear": 2023, "page": 1, "perPage": 10 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "Page": { "media": [] } } })))
            .expect(1)
            .mount(&server)
            .await;

        let uri = server.uri();
        let result = blocking(move || {
            client_for(&uri).seasonal_anime(2023, MediaSeason::Winter, 1, 10)
        })
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let err = decode::<MediaData>(json!({ "data": { "Media": { "id": "not a number" } } }))
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
