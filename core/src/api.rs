//! Async operations: build, execute through a `Transport`, parse.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::client::DonateBotClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{Donation, DonationFilter, EndedSubscription, MarkRequest};

/// Donate Bot API client bound to a transport.
///
/// Each call issues at most one request and holds no state beyond the
/// immutable configuration, so calls may run concurrently.
#[derive(Debug, Clone)]
pub struct DonateBot<T> {
    client: DonateBotClient,
    transport: T,
}

impl<T: Transport> DonateBot<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            client: DonateBotClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &DonateBotClient {
        &self.client
    }

    /// Fetch donations the caller has not marked as processed yet.
    #[instrument(skip(self), fields(server_id = %self.client.config().server_id))]
    pub async fn list_new_donations(
        &self,
        filter: Option<&DonationFilter>,
    ) -> Result<Vec<Donation>, ApiError> {
        let request = local(self.client.build_list_new_donations(filter))?;
        let response = self.send(request).await?;
        logged(self.client.parse_list_new_donations(response))
    }

    /// Like `list_new_donations`, reading the filter from a dynamic
    /// `{"find": [...]}` value.
    pub async fn list_new_donations_value(
        &self,
        filter: Option<&Value>,
    ) -> Result<Vec<Donation>, ApiError> {
        let filter = filter.map(DonationFilter::from_value);
        self.list_new_donations(filter.as_ref()).await
    }

    /// Fetch subscriptions that were cancelled or expired.
    #[instrument(skip(self), fields(server_id = %self.client.config().server_id))]
    pub async fn list_ended_subscriptions(&self) -> Result<Vec<EndedSubscription>, ApiError> {
        let request = local(self.client.build_list_ended_subscriptions())?;
        let response = self.send(request).await?;
        logged(self.client.parse_list_ended_subscriptions(response))
    }

    /// Tell the service a donation or ended subscription has been handled.
    #[instrument(
        skip(self, request),
        fields(server_id = %self.client.config().server_id, txn_id = %request.txn_id)
    )]
    pub async fn mark_donation(&self, request: &MarkRequest) -> Result<(), ApiError> {
        let request = local(self.client.build_mark_donation(request))?;
        let response = self.send(request).await?;
        logged(self.client.parse_mark_donation(response))
    }

    /// Like `mark_donation`, reading the options from a dynamic value.
    ///
    /// The configuration is validated before the options, matching the
    /// typed call.
    pub async fn mark_donation_value(&self, options: &Value) -> Result<(), ApiError> {
        local(self.client.config().validate())?;
        let request = local(MarkRequest::from_value(options))?;
        self.mark_donation(&request).await
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = ?request.method, path = %request.path, "sending request");
        match self.transport.execute(request).await {
            Ok(response) => {
                debug!(status = response.status, "received response");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "transport failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(feature = "reqwest")]
impl DonateBot<crate::transport::ReqwestTransport> {
    /// Client using a default `reqwest` transport.
    pub fn with_reqwest(config: ClientConfig) -> Self {
        Self::new(config, crate::transport::ReqwestTransport::new())
    }
}

fn local<R>(result: Result<R, ApiError>) -> Result<R, ApiError> {
    if let Err(e) = &result {
        debug!(error = %e, "rejected before sending");
    }
    result
}

fn logged<R>(result: Result<R, ApiError>) -> Result<R, ApiError> {
    if let Err(e) = &result {
        warn!(error = %e, "request failed");
    }
    result
}
