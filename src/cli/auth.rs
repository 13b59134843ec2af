use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    Res, config, error, info,
    management::{CredentialStore, TokenCache},
    server,
    spotify::{AuthClient, RateLimitedFetcher, Session, TokenStore},
    success,
    types::AuthCallback,
    warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the authorization-code flow and stores the resulting token.
///
/// Opens the authorization page in the browser, waits for Spotify to
/// redirect to the local callback server, exchanges the code and persists
/// the token for later commands.
pub async fn auth() {
    let Some(credentials) = CredentialStore::default_location().load() else {
        error!(
            "No client credentials found. Run beatlist credentials --client-id <ID> --client-secret <SECRET>"
        );
    };

    let http = Client::new();
    let auth_client = AuthClient::from_config(http.clone(), credentials);

    let state = AuthClient::generate_state();
    let auth_url = match auth_client.authorize_url(&state) {
        Ok(url) => url,
        Err(e) => error!("Cannot build authorization URL: {}", e),
    };

    let shared_state = Arc::new(Mutex::new(Some(AuthCallback { state, code: None })));

    let listener = match server::bind(&config::server_addr()).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot start callback server: {}", e),
    };
    let server_state = Arc::clone(&shared_state);
    let server = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    } else {
        info!("Waiting for authorization in the browser...");
    }

    let code = wait_for_code(shared_state).await;
    server.abort();

    let Some(code) = code else {
        error!("Authentication failed or timed out.");
    };

    let fetcher = RateLimitedFetcher::new(http, config::spotify_apiurl(), TokenStore::empty());
    let mut session = Session::new(auth_client, fetcher);

    if let Err(e) = session.login(&code).await {
        error!("Authentication failed: {}", e);
    }

    if let Err(e) = TokenCache::default_location().save_token(session.token()).await {
        error!("Failed to save token to cache: {}", e);
    }

    info!(
        "Token expires at {}",
        session.token().expires_at.format("%H:%M:%S")
    );

    match session.user().await {
        Ok(user) => success!("Authenticated as {}", user.user_id),
        Err(e) => warning!("Authenticated, but cannot read the user profile: {}", e),
    }
}

async fn wait_for_code(shared_state: Arc<Mutex<Option<AuthCallback>>>) -> Option<String> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        {
            let lock = shared_state.lock().await;
            if let Some(code) = lock.as_ref().and_then(|pending| pending.code.clone()) {
                return Some(code);
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Opens a session from the stored credentials and token, refreshing the
/// access token first when it is about to expire.
pub(crate) async fn open_session() -> Res<Session> {
    let credentials = CredentialStore::default_location()
        .load()
        .ok_or("No client credentials found. Run beatlist credentials first.")?;

    let cache = TokenCache::default_location();
    let token = cache
        .load_token()
        .await?
        .ok_or("No stored token. Run beatlist auth first.")?;

    let http = Client::new();
    let mut session = Session::new(
        AuthClient::from_config(http.clone(), credentials),
        RateLimitedFetcher::new(http, config::spotify_apiurl(), TokenStore::new(token)),
    );

    if session.ensure_valid_token(Utc::now()).await? {
        cache.save_token(session.token()).await?;
    }

    Ok(session)
}
