//! Async client for the Donate Bot donation-tracking API.
//!
//! # Overview
//! Three operations: list new donations, list ended subscriptions, and mark a
//! transaction as processed. `DonateBotClient` builds `HttpRequest` values
//! and parses `HttpResponse` values without touching the network;
//! `DonateBot` runs them through a `Transport`.
//!
//! # Design
//! - Configuration is validated lazily, at the top of every operation.
//!   Invalid configuration or arguments fail before any request is built.
//! - Error responses carrying `{"Error": "..."}` are normalized to
//!   `ApiError::Remote`; everything else stays a `TransportError`.
//! - The `reqwest` feature (on by default) provides `ReqwestTransport`.
//!
//! ```no_run
//! # async fn run() -> Result<(), donatebot_core::ApiError> {
//! use donatebot_core::{ClientConfig, DonateBot, DonationFilter, DonationStatus, MarkRequest};
//!
//! let bot = DonateBot::with_reqwest(ClientConfig::new("123456789", "api-key"));
//! let filter = DonationFilter::new([DonationStatus::Completed]);
//! for donation in bot.list_new_donations(Some(&filter)).await? {
//!     if let Some(txn_id) = donation.get("txn_id").and_then(|v| v.as_str()) {
//!         bot.mark_donation(&MarkRequest::new(txn_id)).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "reqwest")]
pub mod transport;
pub mod types;

pub use api::DonateBot;
pub use client::{DonateBotClient, USER_AGENT};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use types::{Donation, DonationFilter, DonationStatus, EndedSubscription, MarkBody, MarkRequest};
