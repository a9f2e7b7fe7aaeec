use mock_server::{AppState, EmployeeInput};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let token = std::env::var("MOCK_API_TOKEN").unwrap_or_else(|_| "dev-token".to_string());
    let addr = format!("127.0.0.1:{port}");

    let state = AppState::with_employees(
        &token,
        vec![
            EmployeeInput {
                name: Some("Ada Lovelace".to_string()),
                email: Some("ada@example.com".to_string()),
                position: Some("Analyst".to_string()),
            },
            EmployeeInput {
                name: Some("Alan Turing".to_string()),
                email: Some("alan@example.com".to_string()),
                position: None,
            },
        ],
    );

    let listener = TcpListener::bind(&addr).await?;
    mock_server::run(listener, state).await
}
