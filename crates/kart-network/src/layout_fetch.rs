//! Fetch the layout source once at startup.

use kart_protocol::{parse_layout, Layout, LayoutError};

fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Read the raw layout text. `http(s)://` sources are fetched over HTTP,
/// anything else is treated as a filesystem path.
pub async fn fetch_layout(source: &str) -> Result<String, LayoutError> {
    let text = if is_http(source) {
        fetch_http(source).await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| LayoutError::Unavailable(format!("cannot read {source}: {e}")))?
    };
    tracing::debug!(source, bytes = text.len(), "Fetched layout source");
    Ok(text)
}

async fn fetch_http(url: &str) -> Result<String, LayoutError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| LayoutError::Unavailable(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LayoutError::Unavailable(format!("{url} returned {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| LayoutError::Unavailable(format!("cannot decode body of {url}: {e}")))
}

/// Fetch and parse in one step.
pub async fn load_layout(source: &str) -> Result<Layout, LayoutError> {
    let text = fetch_layout(source).await?;
    parse_layout(&text)
}
