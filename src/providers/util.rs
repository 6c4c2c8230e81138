use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs an HTTP request, retrying transport failures.
///
/// # Parameters
/// - `operation`: Closure returning the request future
/// - `retries`: Extra attempts after the first one; 0 means a single attempt
/// - `delay_ms`: Milliseconds to wait between attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) if attempt < retries => {
                attempt += 1;
                debug!("Attempt {}/{} failed: {}. Retrying...", attempt, retries, err);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Shared client with the application's user agent.
pub fn http_client() -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("subtrack/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
