//! Destinations (blogs) available to an app token

use micropress_core::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::instrument;

/// One destination from the Micropub config query
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Destination {
    pub uid: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    #[serde(default)]
    destination: Vec<Destination>,
}

/// `{endpoint}?q=config`
pub fn config_url(endpoint: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}q=config", endpoint, separator)
}

/// Query the Micropub config and map destinations to `uid -> name`.
///
/// Also serves as the token check: a rejected token surfaces as the
/// executor's HTTP error.
#[instrument(skip(executor, token), name = "fetch_destinations")]
pub async fn fetch_destinations(
    executor: &dyn RequestExecutor,
    endpoint: &str,
    token: &str,
) -> Result<BTreeMap<String, String>> {
    let request = HttpRequest::get(config_url(endpoint))
        .bearer(token)
        .header("Accept", "application/json");

    let response = executor.execute(request).await?;
    let config: ConfigResponse = response.json()?;

    log::info!("Found {} destinations", config.destination.len());

    Ok(config
        .destination
        .into_iter()
        .map(|d| (d.uid, d.name))
        .collect())
}
