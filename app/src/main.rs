use std::error::Error;
use std::sync::Arc;

use employee_core::{
    employee_router, ClientConfig, CredentialStore, EmployeeStore, FileCredentialStore, History,
    MemoryCredentialStore, RequestBuilder, AUTHORIZATION,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Optional token to store before the first request, standing in for a login.
const TOKEN_VAR: &str = "EMPLOYEE_API_TOKEN";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = ClientConfig::from_env()?;
    let credentials: Arc<dyn CredentialStore> = match &config.credentials_path {
        Some(path) => Arc::new(FileCredentialStore::open(path)?),
        None => Arc::new(MemoryCredentialStore::new()),
    };
    if let Ok(token) = std::env::var(TOKEN_VAR) {
        credentials.set(AUTHORIZATION, &token)?;
    }

    let history = History::new();
    let router = employee_router(history.clone());
    let navigator = history.clone();
    let builder = RequestBuilder::new(&config, credentials).on_auth_expired(move |path| {
        warn!(%path, "session expired, navigating");
        navigator.replace(path);
    });

    info!(base_url = %config.base_url, "fetching employees");
    let mut store = EmployeeStore::new();
    store.fetch_employees(&builder).await;

    let location = history.current();
    match router.resolve(&location) {
        Some(view) => println!("{}", view.render(&store)),
        None => warn!(%location, "no route matches"),
    }
    Ok(())
}
