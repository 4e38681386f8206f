use mock_server::{Account, Donation, EndedSubscription};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let server_id = std::env::var("MOCK_SERVER_ID").unwrap_or_else(|_| "123456789".to_string());
    let api_key = std::env::var("MOCK_API_KEY").unwrap_or_else(|_| "test-key".to_string());

    let account = Account::new(&server_id, &api_key)
        .with_donations(vec![
            Donation::new("Completed", "5.00"),
            Donation::new("Refunded", "10.00"),
            Donation::new("Reversed", "2.50"),
        ])
        .with_ended_subscriptions(vec![EndedSubscription::new("premium")]);

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %server_id, "listening");
    mock_server::run(listener, account).await
}
