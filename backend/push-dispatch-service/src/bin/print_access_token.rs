use anyhow::{bail, Context};
use fcm_shared::{FCMClient, ServiceAccountKey};

/// Print an FCM OAuth2 access token for manual API calls.
///
/// Usage: print-access-token <service-account.json>
///
/// Performs the same JWT-bearer exchange as the dispatch service and
/// writes the bearer token to stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => bail!("usage: print-access-token <service-account.json>"),
    };

    let document = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read service account file {}", path))?;
    let credentials = ServiceAccountKey::from_json(&document)?;
    let project_id = credentials.project_id.clone().unwrap_or_default();

    let token = FCMClient::new(project_id, credentials)
        .fetch_access_token()
        .await?;

    println!("{}", token.access_token);
    Ok(())
}
