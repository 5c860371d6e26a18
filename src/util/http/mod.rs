use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{header, Client, Method, Response};

use crate::logging::Logger;

pub mod element;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// Settings the shared client is built with.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Upper bound for the whole request, body included.
    pub timeout: Duration,
    /// Sent as `User-Agent`; the quote pages reject the library default.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
///
/// The options of the first caller win; later calls reuse the same client.
fn get_client(options: &ClientOptions) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        // 已經安裝過時會回傳 Err，可忽略
        let _ = rustls::crypto::ring::default_provider().install_default();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(options.timeout)
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .user_agent(options.user_agent.as_str())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and returns the response as text.
///
/// Non-success status codes are reported as errors.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
/// * `options`: Client settings, used only when the shared client is first built.
/// * `headers`: An optional set of headers to include with the request.
pub async fn get(
    url: &str,
    options: &ClientOptions,
    headers: Option<header::HeaderMap>,
) -> Result<String> {
    send(Method::GET, url, options, headers)
        .await?
        .error_for_status()
        .map_err(|e| anyhow!("Unsuccessful response from {}: {:?}", url, e))?
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

/// Sends one HTTP request; there is no retry, the caller decides whether to try again.
async fn send(
    method: Method,
    url: &str,
    options: &ClientOptions,
    headers: Option<header::HeaderMap>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client(options)?;
    let mut rb = client.request(method, url);

    if let Some(h) = headers {
        rb = rb.headers(h);
    }

    let start = Instant::now();
    let res = rb.send().await;
    let elapsed = start.elapsed().as_millis();

    match res {
        Ok(response) => {
            LOGGER.info(format!(
                "{} {} {} ms",
                visit_log,
                response.status(),
                elapsed
            ));
            Ok(response)
        }
        Err(why) => {
            LOGGER.error(format!(
                "{} failed because {:?}. {} ms",
                visit_log, why, elapsed
            ));
            Err(anyhow!("Failed to send request to {}: {:?}", url, why))
        }
    }
}
