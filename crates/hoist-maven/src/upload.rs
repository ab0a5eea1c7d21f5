//! HTTP transport for classic remote repositories.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};

use hoist_util::errors::HoistError;

use crate::repository::RemoteRepository;

/// Build the HTTP client used for every upload in a run.
pub fn build_client(timeout: Duration) -> miette::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hoist/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            HoistError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// Basic auth for username (+ password), bearer for a lone password.
fn authorized(request: RequestBuilder, repo: &RemoteRepository) -> RequestBuilder {
    match (repo.username.as_deref(), repo.password.as_deref()) {
        (Some(user), pass) => request.basic_auth(user, pass),
        (None, Some(token)) => request.bearer_auth(token),
        (None, None) => request,
    }
}

/// PUT `body` at `url`. Any non-2xx status is an error.
pub async fn put_bytes(
    client: &Client,
    repo: &RemoteRepository,
    url: &str,
    body: Vec<u8>,
) -> miette::Result<()> {
    let size = body.len();
    let resp = authorized(client.put(url), repo)
        .body(body)
        .send()
        .await
        .map_err(|e| HoistError::Network {
            message: format!("Upload to {url} failed: {e}"),
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(HoistError::Network {
            message: format!("HTTP {status} uploading {url}"),
        }
        .into());
    }
    tracing::debug!("uploaded {size} bytes to {url}");
    Ok(())
}

/// GET a text resource. `Ok(None)` when the server answers 404.
pub async fn get_text(
    client: &Client,
    repo: &RemoteRepository,
    url: &str,
) -> miette::Result<Option<String>> {
    let resp = authorized(client.get(url), repo)
        .send()
        .await
        .map_err(|e| HoistError::Network {
            message: format!("Request to {url} failed: {e}"),
        })?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(HoistError::Network {
            message: format!("HTTP {status} fetching {url}"),
        }
        .into());
    }

    let text = resp.text().await.map_err(|e| HoistError::Network {
        message: format!("Failed to read response from {url}: {e}"),
    })?;
    Ok(Some(text))
}
