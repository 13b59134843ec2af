use crate::{
    error,
    management::{CredentialStore, TokenCache},
    success,
    types::Credentials,
    warning,
};

/// Stores new client credentials. Tokens issued for the previous client
/// are discarded.
pub async fn credentials(client_id: String, client_secret: String) {
    let credentials = Credentials::new(client_id.trim(), client_secret.trim());

    if let Err(e) = CredentialStore::default_location().save(&credentials).await {
        error!("Failed to save credentials: {}", e);
    }

    if let Err(e) = TokenCache::default_location().clear().await {
        warning!("Failed to clear the token cache: {}", e);
    }

    success!(
        "Credentials saved for client {}. Run beatlist auth to log in.",
        credentials.client_id
    );
}
