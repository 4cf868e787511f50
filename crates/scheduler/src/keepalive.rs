//! Periodic self-ping so free-tier hosting does not idle the process out.

use std::time::Duration;

use tracing::{debug, warn};

/// Ping `url` every `period` forever.
pub async fn run(url: String, period: Duration) {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("Keepalive disabled, failed to build HTTP client: {}", e);
            return;
        }
    };

    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        match client.get(&url).send().await {
            Ok(response) => debug!("Keepalive ping: {}", response.status()),
            Err(e) => warn!("Keepalive ping failed: {}", e),
        }
    }
}
