use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Donation {
    pub txn_id: String,
    pub status: String,
    pub buyer_email: String,
    pub price: String,
    pub currency: String,
    #[serde(skip)]
    pub processed: bool,
}

impl Donation {
    pub fn new(status: &str, price: &str) -> Self {
        Self {
            txn_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            buyer_email: "buyer@example.com".to_string(),
            price: price.to_string(),
            currency: "USD".to_string(),
            processed: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndedSubscription {
    pub txn_id: String,
    pub buyer_id: String,
    pub product_id: String,
    #[serde(skip)]
    pub processed: bool,
}

impl EndedSubscription {
    pub fn new(product_id: &str) -> Self {
        Self {
            txn_id: Uuid::new_v4().to_string(),
            buyer_id: "000000000000000000".to_string(),
            product_id: product_id.to_string(),
            processed: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
    #[serde(default)]
    pub is_ended_subscription: bool,
    #[serde(default = "default_true")]
    pub mark_processed: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct FindQuery {
    pub find: Option<String>,
}

/// In-memory account for a single Discord server.
#[derive(Debug)]
pub struct Account {
    pub server_id: String,
    pub api_key: String,
    pub donations: RwLock<Vec<Donation>>,
    pub ended_subscriptions: RwLock<Vec<EndedSubscription>>,
}

impl Account {
    pub fn new(server_id: &str, api_key: &str) -> Self {
        Self {
            server_id: server_id.to_string(),
            api_key: api_key.to_string(),
            donations: RwLock::new(Vec::new()),
            ended_subscriptions: RwLock::new(Vec::new()),
        }
    }

    pub fn with_donations(self, donations: Vec<Donation>) -> Self {
        Self {
            donations: RwLock::new(donations),
            ..self
        }
    }

    pub fn with_ended_subscriptions(self, subs: Vec<EndedSubscription>) -> Self {
        Self {
            ended_subscriptions: RwLock::new(subs),
            ..self
        }
    }
}

pub type Db = Arc<Account>;

pub fn app(account: Account) -> Router {
    let db: Db = Arc::new(account);
    Router::new()
        .route("/api/v1/donations/{server_id}/new", get(list_new_donations))
        .route(
            "/api/v1/donations/{server_id}/endedsubscriptions",
            get(list_ended_subscriptions),
        )
        .route("/api/v1/donations/{server_id}/{txn_id}/mark", post(mark_donation))
        .with_state(db)
}

pub async fn run(listener: TcpListener, account: Account) -> Result<(), std::io::Error> {
    axum::serve(listener, app(account)).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "Error": message }))).into_response()
}

/// Reject requests with a wrong key or for another server.
fn authorize(db: &Account, headers: &HeaderMap, server_id: &str) -> Result<(), Response> {
    let key = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if key != Some(db.api_key.as_str()) {
        tracing::warn!(%server_id, "rejected request with invalid API key");
        return Err(error(StatusCode::UNAUTHORIZED, "Invalid API Key"));
    }
    if server_id != db.server_id {
        return Err(error(StatusCode::NOT_FOUND, "Server not found"));
    }
    Ok(())
}

async fn list_new_donations(
    State(db): State<Db>,
    Path(server_id): Path<String>,
    Query(query): Query<FindQuery>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Response> {
    authorize(&db, &headers, &server_id)?;
    let find: Vec<String> = query
        .find
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let donations: Vec<Donation> = db
        .donations
        .read()
        .await
        .iter()
        .filter(|d| !d.processed)
        .filter(|d| find.is_empty() || find.contains(&d.status))
        .cloned()
        .collect();
    tracing::info!(%server_id, count = donations.len(), "listed new donations");
    Ok(Json(json!({ "donations": donations })))
}

async fn list_ended_subscriptions(
    State(db): State<Db>,
    Path(server_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, Response> {
    authorize(&db, &headers, &server_id)?;
    let subs: Vec<EndedSubscription> = db
        .ended_subscriptions
        .read()
        .await
        .iter()
        .filter(|s| !s.processed)
        .cloned()
        .collect();
    tracing::info!(%server_id, count = subs.len(), "listed ended subscriptions");
    Ok(Json(json!({ "endedSubscriptions": subs })))
}

async fn mark_donation(
    State(db): State<Db>,
    Path((server_id, txn_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(input): Json<MarkBody>,
) -> Result<StatusCode, Response> {
    authorize(&db, &headers, &server_id)?;
    let found = if input.is_ended_subscription {
        let mut subs = db.ended_subscriptions.write().await;
        match subs.iter_mut().find(|s| s.txn_id == txn_id) {
            Some(sub) => {
                sub.processed = input.mark_processed;
                true
            }
            None => false,
        }
    } else {
        let mut donations = db.donations.write().await;
        match donations.iter_mut().find(|d| d.txn_id == txn_id) {
            Some(donation) => {
                donation.processed = input.mark_processed;
                true
            }
            None => false,
        }
    };
    if !found {
        return Err(error(StatusCode::NOT_FOUND, "Transaction not found"));
    }
    tracing::info!(%server_id, %txn_id, processed = input.mark_processed, "marked transaction");
    Ok(StatusCode::OK)
}
