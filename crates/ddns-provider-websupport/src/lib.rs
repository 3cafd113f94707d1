// # Websupport DNS Provider
//
// This crate provides the websupport.sk DNS provider for the DDNS system.
//
// ## Behaviour
//
// - Every request is signed on its own (see `signing`); there is no session
// - One HTTP request per provider call, no retries (the caller decides)
// - Listing fetches the whole zone and filters locally, the API has no
//   server-side filter for notes
// - The secret key never appears in logs or Debug output
//
// ## API Reference
//
// - Login check: GET `/v1/user/self`
// - Zone detail: GET `/v1/user/self/zone/:domain`
// - List records: GET `/v1/user/self/zone/:domain/record`
// - Create record: POST `/v1/user/self/zone/:domain/record`
// - Edit record: PUT `/v1/user/self/zone/:domain/record/:id`
// - Delete record: DELETE `/v1/user/self/zone/:domain/record/:id`

pub mod signing;

use async_trait::async_trait;
use ddns_core::config::WebsupportConfig;
use ddns_core::record::{DnsRecord, NewRecord, RecordFilter, RecordId, RecordPatch};
use ddns_core::traits::DnsProvider;
use ddns_core::{Error, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Websupport REST API base URL
pub const WEBSUPPORT_API_BASE: &str = "https://rest.websupport.sk";

/// Path of the authenticated account
const USER_PATH: &str = "/v1/user/self";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Body of the record listing endpoint
#[derive(Debug, Deserialize)]
struct RecordList {
    items: Vec<DnsRecord>,
}

/// Body returned by create, edit and delete
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    item: Option<Value>,
    #[serde(default)]
    errors: Value,
}

impl ApiResponse {
    fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// The item without its embedded zone object, for log lines
    fn item_summary(&self) -> Value {
        match &self.item {
            Some(Value::Object(map)) => {
                let mut map = map.clone();
                map.remove("zone");
                Value::Object(map)
            }
            Some(other) => other.clone(),
            None => Value::Null,
        }
    }
}

/// websupport.sk DNS provider
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the secret key.
pub struct WebsupportProvider {
    /// API key identifier, the basic auth user name
    identifier: String,

    /// API secret used to sign every request
    /// ⚠️ NEVER log this value
    secret_key: String,

    /// Managed domain (zone)
    domain: String,

    /// API base URL without trailing slash
    api_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the secret key
impl std::fmt::Debug for WebsupportProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebsupportProvider")
            .field("identifier", &self.identifier)
            .field("secret_key", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl WebsupportProvider {
    /// Create a new Websupport provider
    ///
    /// # Parameters
    ///
    /// - `identifier`: API key identifier
    /// - `secret_key`: API secret
    /// - `domain`: managed domain, e.g. "example.com"
    pub fn new(
        identifier: impl Into<String>,
        secret_key: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self> {
        Self::with_endpoint(
            identifier,
            secret_key,
            domain,
            WEBSUPPORT_API_BASE,
            DEFAULT_HTTP_TIMEOUT,
        )
    }

    /// Create a provider talking to a custom API base URL
    pub fn with_endpoint(
        identifier: impl Into<String>,
        secret_key: impl Into<String>,
        domain: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let identifier = identifier.into();
        let secret_key = secret_key.into();
        let domain = domain.into();

        if identifier.is_empty() || secret_key.is_empty() {
            return Err(Error::config("Websupport identifier and secret key cannot be empty"));
        }
        if domain.is_empty() {
            return Err(Error::config("Websupport domain cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            identifier,
            secret_key,
            domain,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a provider from the `websupport` configuration block
    pub fn from_config(config: &WebsupportConfig) -> Result<Self> {
        Self::with_endpoint(
            &config.authentication.identifier,
            &config.authentication.secret_key,
            &config.registered_domain,
            &config.api_url,
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    fn zone_path(&self) -> String {
        format!("{}/zone/{}", USER_PATH, self.domain)
    }

    fn records_path(&self) -> String {
        format!("{}/record", self.zone_path())
    }

    fn record_path(&self, id: RecordId) -> String {
        format!("{}/record/{}", self.zone_path(), id)
    }

    /// Send one signed request
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let timestamp = chrono::Utc::now().timestamp();
        let signed = signing::sign(&self.secret_key, method.as_str(), path, timestamp)?;

        let mut request = self
            .client
            .request(method.clone(), format!("{}{}", self.api_url, path))
            .basic_auth(&self.identifier, Some(&signed.signature))
            .header(reqwest::header::DATE, &signed.date)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {}", method, path);
        request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} {} failed: {}", method, path, e)))
    }

    /// Send a create/edit/delete request and check the API status field
    async fn write<B: Serialize + ?Sized>(
        &self,
        action: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        let response = self.send(method, path, body).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        // Validation failures come back as 400 with the usual body
        if !status.is_success() && status != StatusCode::BAD_REQUEST {
            return Err(status_error(status, &text, action));
        }

        let api: ApiResponse = serde_json::from_str(&text).map_err(|e| {
            Error::provider("websupport", format!("{}: invalid response body: {}", action, e))
        })?;
        info!(
            "{}: status {}, item {}, errors {}",
            action,
            api.status,
            api.item_summary(),
            api.errors
        );

        if !api.is_success() {
            return Err(Error::provider(
                "websupport",
                format!("{} rejected ({}): {}", action, api.status, api.errors),
            ));
        }
        Ok(api)
    }

    fn parse_item(action: &str, api: ApiResponse) -> Result<DnsRecord> {
        let item = api.item.ok_or_else(|| {
            Error::provider("websupport", format!("{}: response has no item", action))
        })?;
        serde_json::from_value(item).map_err(|e| {
            Error::provider("websupport", format!("{}: invalid record in response: {}", action, e))
        })
    }
}

/// Map an unexpected HTTP status to an error
fn status_error(status: StatusCode, body: &str, action: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API credentials or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::provider("websupport", format!("{}: not found ({})", action, status)),
        429 => Error::provider(
            "websupport",
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            "websupport",
            format!("Websupport server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider("websupport", format!("{} failed: {} - {}", action, status, body)),
    }
}

#[async_trait]
impl DnsProvider for WebsupportProvider {
    /// Check the credentials, then check that the domain belongs to the account
    async fn verify_access(&self) -> Result<()> {
        let response = self.send::<()>(Method::GET, USER_PATH, None).await?;
        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            401 | 403 => {
                return Err(Error::auth(format!(
                    "Login to Websupport failed. Status: {}",
                    status
                )));
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                return Err(status_error(status, &text, "Login check"));
            }
        }
        debug!("Logged in as {}", self.identifier);

        let response = self
            .send::<()>(Method::GET, &self.zone_path(), None)
            .await?;
        let status = response.status();
        match status.as_u16() {
            200..=299 => Ok(()),
            401 | 403 | 404 => Err(Error::domain_access(format!(
                "Domain {} is not accessible with this account. Status: {}",
                self.domain, status
            ))),
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(status_error(status, &text, "Zone check"))
            }
        }
    }

    async fn list_records(&self, filter: &RecordFilter) -> Result<Vec<DnsRecord>> {
        let path = self.records_path();
        let response = self.send::<()>(Method::GET, &path, None).await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text, "Listing records"));
        }

        let list: RecordList = response.json().await.map_err(|e| {
            Error::provider("websupport", format!("Failed to parse record list: {}", e))
        })?;
        debug!("Zone {} has {} record(s)", self.domain, list.items.len());

        Ok(filter.apply(list.items))
    }

    async fn create_record(&self, record: &NewRecord) -> Result<DnsRecord> {
        let action = "Creating record";
        let api = self
            .write(action, Method::POST, &self.records_path(), Some(record))
            .await?;
        Self::parse_item(action, api)
    }

    async fn edit_record(&self, id: RecordId, patch: &RecordPatch) -> Result<DnsRecord> {
        let action = "Editing record";
        let api = self
            .write(action, Method::PUT, &self.record_path(id), Some(patch))
            .await?;
        Self::parse_item(action, api)
    }

    async fn delete_record(&self, id: RecordId) -> Result<()> {
        self.write::<()>("Deleting record", Method::DELETE, &self.record_path(id), None)
            .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "websupport"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::record::RecordType;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RECORDS: &str = "/v1/user/self/zone/example.com/record";

    fn provider(server: &MockServer) -> WebsupportProvider {
        WebsupportProvider::with_endpoint(
            "key-id",
            "secret",
            "example.com",
            server.uri(),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    fn item(id: u64, record_type: &str, name: &str, content: &str, note: Value) -> Value {
        json!({
            "id": id,
            "type": record_type,
            "name": name,
            "content": content,
            "ttl": 600,
            "prio": null,
            "weight": null,
            "port": null,
            "note": note,
            "zone": { "id": 1, "name": "example.com", "updateTime": 1_700_000_000 }
        })
    }

    fn success(item: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "item": item,
            "errors": {}
        }))
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let result = WebsupportProvider::new("", "secret", "example.com");
        assert!(matches!(result, Err(Error::Config(_))));
        let result = WebsupportProvider::new("id", "secret", "");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_secret() {
        let provider = WebsupportProvider::new("key-id", "super-secret", "example.com").unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<REDACTED>"));
        assert!(debug.contains("key-id"));
    }

    #[tokio::test]
    async fn test_list_filters_locally() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RECORDS))
            .and(header_exists("authorization"))
            .and(header_exists("date"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    item(1, "A", "home", "1.2.3.4", json!("websupportsk-ddns")),
                    item(2, "A", "home", "5.6.7.8", Value::Null),
                    item(3, "MX", "@", "mail.example.com", json!("")),
                    item(4, "A", "vpn", "1.2.3.4", json!("websupportsk-ddns")),
                ]
            })))
            .mount(&server)
            .await;

        let provider = provider(&server);

        let all = provider.list_records(&RecordFilter::new()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[1].note, "", "a null note reads as empty");
        assert_eq!(all[2].record_type, RecordType::Other("MX".into()));

        let home = provider
            .list_records(&RecordFilter::new().with_type(RecordType::A).with_name("home"))
            .await
            .unwrap();
        assert_eq!(home.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

        let owned = provider
            .list_records(
                &RecordFilter::new()
                    .with_type(RecordType::A)
                    .with_note("websupportsk-ddns"),
            )
            .await
            .unwrap();
        assert_eq!(owned.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 4]);
    }

    #[tokio::test]
    async fn test_list_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RECORDS))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let result = provider(&server).list_records(&RecordFilter::new()).await;
        assert!(matches!(result, Err(Error::Provider { .. })));
    }

    #[tokio::test]
    async fn test_list_missing_items_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RECORDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&server)
            .await;

        let result = provider(&server).list_records(&RecordFilter::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_sends_full_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RECORDS))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "type": "A",
                "name": "home",
                "content": "5.6.7.8",
                "ttl": 600,
                "note": "websupportsk-ddns"
            })))
            .respond_with(success(item(
                10,
                "A",
                "home",
                "5.6.7.8",
                json!("websupportsk-ddns"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let created = provider(&server)
            .create_record(&NewRecord::a("home", "5.6.7.8", "websupportsk-ddns"))
            .await
            .unwrap();
        assert_eq!(created.id, 10);
        assert_eq!(created.content, "5.6.7.8");
    }

    #[tokio::test]
    async fn test_create_validation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RECORDS))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "item": { "type": "A", "name": "home", "content": "x" },
                "errors": { "content": ["Invalid IPv4 address"] }
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .create_record(&NewRecord::a("home", "x", "websupportsk-ddns"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("Invalid IPv4 address"));
    }

    #[tokio::test]
    async fn test_edit_sends_only_changed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/7", RECORDS)))
            .and(body_json(json!({ "note": "websupportsk-ddns" })))
            .respond_with(success(item(
                7,
                "A",
                "home",
                "5.6.7.8",
                json!("websupportsk-ddns"),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let edited = provider(&server)
            .edit_record(7, &RecordPatch::note("websupportsk-ddns"))
            .await
            .unwrap();
        assert_eq!(edited.note, "websupportsk-ddns");
    }

    #[tokio::test]
    async fn test_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/7", RECORDS)))
            .respond_with(success(item(7, "A", "old", "1.2.3.4", json!("websupportsk-ddns"))))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server).delete_record(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown_record() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = provider(&server).delete_record(99).await;
        assert!(matches!(result, Err(Error::Provider { .. })));
    }

    #[tokio::test]
    async fn test_verify_access_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self/zone/example.com"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "name": "example.com" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        provider(&server).verify_access().await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_access_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = provider(&server).verify_access().await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_verify_access_foreign_domain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self/zone/example.com"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = provider(&server).verify_access().await.unwrap_err();
        assert!(matches!(err, Error::DomainAccess(_)));
    }

    #[tokio::test]
    async fn test_verify_access_login_outage_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server).verify_access().await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }), "got {:?}", err);
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_verify_access_zone_outage_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self/zone/example.com"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server).verify_access().await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }), "got {:?}", err);
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_verify_access_rate_limited_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = provider(&server).verify_access().await.unwrap_err();
        assert!(!matches!(err, Error::Authentication(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_verify_access_forbidden_zone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/user/self/zone/example.com"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = provider(&server).verify_access().await.unwrap_err();
        assert!(matches!(err, Error::DomainAccess(_)));
    }
}
