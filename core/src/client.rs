//! Stateless HTTP request builder and response parser for the Donate Bot API.
//!
//! # Design
//! `DonateBotClient` holds only its `ClientConfig`. Each operation is split
//! into a `build_*` method that validates the configuration and arguments
//! and produces an `HttpRequest`, and a `parse_*` method that consumes an
//! `HttpResponse`. A `build_*` error means no request exists, so nothing can
//! reach the network.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError, INVALID_TXN_ID, TXN_ID_REQUIRED};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Donation, DonationFilter, EndedSubscription, MarkRequest};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("donatebot-rs/", env!("CARGO_PKG_VERSION"));

/// Everything but RFC 3986 unreserved characters is escaped inside a segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Deserialize)]
struct NewDonationsBody {
    donations: Vec<Donation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndedSubscriptionsBody {
    ended_subscriptions: Vec<EndedSubscription>,
}

/// Synchronous, stateless client for the Donate Bot API.
#[derive(Debug, Clone)]
pub struct DonateBotClient {
    config: ClientConfig,
}

impl DonateBotClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_list_new_donations(
        &self,
        filter: Option<&DonationFilter>,
    ) -> Result<HttpRequest, ApiError> {
        self.config.validate()?;
        let find = filter.map(DonationFilter::find_param).unwrap_or_default();
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: self.url(&["new"]),
            query: vec![("find".to_string(), find)],
            headers: self.headers(),
            body: None,
        })
    }

    pub fn build_list_ended_subscriptions(&self) -> Result<HttpRequest, ApiError> {
        self.config.validate()?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: self.url(&["endedsubscriptions"]),
            query: Vec::new(),
            headers: self.headers(),
            body: None,
        })
    }

    pub fn build_mark_donation(&self, request: &MarkRequest) -> Result<HttpRequest, ApiError> {
        self.config.validate()?;
        if request.txn_id.is_empty() {
            return Err(ApiError::Usage(TXN_ID_REQUIRED.to_string()));
        }
        if is_dot_segment(&request.txn_id) {
            return Err(ApiError::Usage(INVALID_TXN_ID.to_string()));
        }
        let body = serde_json::to_string(&request.body())
            .map_err(|e| TransportError::Serialization(e.to_string()))?;
        let mut headers = self.headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.url(&[request.txn_id.as_str(), "mark"]),
            query: Vec::new(),
            headers,
            body: Some(body),
        })
    }

    pub fn parse_list_new_donations(&self, response: HttpResponse) -> Result<Vec<Donation>, ApiError> {
        let body: NewDonationsBody = parse_body(&response)?;
        Ok(body.donations)
    }

    pub fn parse_list_ended_subscriptions(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<EndedSubscription>, ApiError> {
        let body: EndedSubscriptionsBody = parse_body(&response)?;
        Ok(body.ended_subscriptions)
    }

    pub fn parse_mark_donation(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// `{base_url}/donations/{server_id}/{segments..}`, each segment escaped.
    fn url(&self, segments: &[&str]) -> String {
        let mut url = format!(
            "{}/donations/{}",
            self.config.base_url(),
            utf8_percent_encode(&self.config.server_id, PATH_SEGMENT)
        );
        for segment in segments {
            url.push('/');
            url.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        }
        url
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("authorization".to_string(), self.config.api_key.clone()),
            ("user-agent".to_string(), USER_AGENT.to_string()),
        ]
    }
}

/// `.` and `..` are resolved away by URL parsers even when escaped.
pub(crate) fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    serde_json::from_str(&response.body)
        .map_err(|e| TransportError::Deserialization(e.to_string()).into())
}

/// Map a non-2xx response to `Remote` when the body carries an `Error`
/// message, and to a raw `Status` failure otherwise.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if let Some(message) = remote_error_message(&response.body) {
        return Err(ApiError::Remote(message));
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    }
    .into())
}

fn remote_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("Error")? {
        serde_json::Value::String(message) if !message.is_empty() => Some(message.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{INVALID_API_KEY, INVALID_SERVER_ID};

    fn client() -> DonateBotClient {
        DonateBotClient::new(ClientConfig::new("1234", "secret").with_base_url("http://localhost:3000/api/v1"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_list_new_donations_without_filter_sends_empty_find() {
        let req = client().build_list_new_donations(None).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/v1/donations/1234/new");
        assert_eq!(req.query_param("find"), Some(""));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_new_donations_drops_unknown_statuses() {
        let filter = DonationFilter::from_names(["Completed", "Bogus", "Refunded"]);
        let req = client().build_list_new_donations(Some(&filter)).unwrap();
        assert_eq!(req.query_param("find"), Some("Completed,Refunded"));
    }

    #[test]
    fn build_attaches_auth_and_user_agent() {
        let req = client().build_list_ended_subscriptions().unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/v1/donations/1234/endedsubscriptions");
        assert_eq!(req.header("Authorization"), Some("secret"));
        assert_eq!(req.header("User-Agent"), Some(USER_AGENT));
        assert!(req.query.is_empty());
    }

    #[test]
    fn build_mark_donation_applies_defaults() {
        let req = client().build_mark_donation(&MarkRequest::new("abc123")).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/v1/donations/1234/abc123/mark");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"isEndedSubscription": false, "markProcessed": true}));
    }

    #[test]
    fn build_mark_donation_honors_explicit_false() {
        let req = client()
            .build_mark_donation(&MarkRequest::new("abc123").processed(false))
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["markProcessed"], false);
    }

    #[test]
    fn build_mark_donation_requires_txn_id() {
        let err = client().build_mark_donation(&MarkRequest::default()).unwrap_err();
        assert!(matches!(err, ApiError::Usage(ref msg) if msg == TXN_ID_REQUIRED));
    }

    #[test]
    fn build_mark_donation_escapes_txn_id() {
        let cases = [
            ("a?b", "a%3Fb"),
            ("a#b", "a%23b"),
            ("../../x", "..%2F..%2Fx"),
            ("id with space", "id%20with%20space"),
            ("v1.2_ok-~", "v1.2_ok-~"),
        ];
        for (txn_id, escaped) in cases {
            let req = client().build_mark_donation(&MarkRequest::new(txn_id)).unwrap();
            assert_eq!(
                req.path,
                format!("http://localhost:3000/api/v1/donations/1234/{escaped}/mark"),
                "{txn_id}"
            );
        }
    }

    #[test]
    fn build_mark_donation_rejects_dot_segments() {
        for txn_id in [".", ".."] {
            let err = client().build_mark_donation(&MarkRequest::new(txn_id)).unwrap_err();
            assert!(matches!(err, ApiError::Usage(ref msg) if msg == INVALID_TXN_ID));
        }
    }

    #[test]
    fn server_id_is_escaped() {
        let client = DonateBotClient::new(ClientConfig::new("12/34?x", "k").with_base_url("http://host/api/v1"));
        let req = client.build_list_new_donations(None).unwrap();
        assert_eq!(req.path, "http://host/api/v1/donations/12%2F34%3Fx/new");
    }

    #[test]
    fn config_is_checked_before_arguments() {
        let client = DonateBotClient::new(ClientConfig::new("", "secret"));
        let err = client.build_mark_donation(&MarkRequest::default()).unwrap_err();
        assert!(matches!(err, ApiError::Config(ref msg) if msg == INVALID_SERVER_ID));
    }

    #[test]
    fn every_build_validates_config() {
        let client = DonateBotClient::new(ClientConfig::new("1234", ""));
        let errors = [
            client.build_list_new_donations(None).unwrap_err(),
            client.build_list_ended_subscriptions().unwrap_err(),
            client.build_mark_donation(&MarkRequest::new("abc123")).unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, ApiError::Config(ref msg) if msg == INVALID_API_KEY));
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = DonateBotClient::new(ClientConfig::new("1", "k").with_base_url("http://host/api/v1/"));
        let req = client.build_list_ended_subscriptions().unwrap();
        assert_eq!(req.path, "http://host/api/v1/donations/1/endedsubscriptions");
    }

    #[test]
    fn parse_list_new_donations_success() {
        let donations = client()
            .parse_list_new_donations(response(200, r#"{"donations":[{"txn_id":"a"},{"txn_id":"b"}]}"#))
            .unwrap();
        assert_eq!(donations.len(), 2);
        assert_eq!(donations[1].get("txn_id"), Some(&json!("b")));
    }

    #[test]
    fn parse_list_ended_subscriptions_success() {
        let subs = client()
            .parse_list_ended_subscriptions(response(200, r#"{"endedSubscriptions":[{"sub_id":"s"}]}"#))
            .unwrap();
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn parse_missing_field_is_deserialization_error() {
        let err = client().parse_list_new_donations(response(200, "{}")).unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Deserialization(_))));
    }

    #[test]
    fn parse_structured_error_becomes_remote() {
        let err = client()
            .parse_list_ended_subscriptions(response(401, r#"{"Error":"Invalid API Key"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Remote(ref msg) if msg == "Invalid API Key"));
    }

    #[test]
    fn parse_unstructured_error_keeps_status() {
        let err = client().parse_mark_donation(response(500, "oops")).unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Status { status: 500, .. })));
    }

    #[test]
    fn parse_non_string_error_field_keeps_status() {
        let err = client()
            .parse_mark_donation(response(400, r#"{"Error":{"code":1}}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Status { status: 400, .. })));
    }

    #[test]
    fn parse_mark_donation_ignores_body() {
        assert!(client().parse_mark_donation(response(200, "")).is_ok());
        assert!(client().parse_mark_donation(response(204, "")).is_ok());
    }
}
