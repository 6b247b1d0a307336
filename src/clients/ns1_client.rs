//! NS1 account API client
//!
//! Encapsulates the user endpoints of the NS1 REST API behind the `UsersApi`
//! trait so the resource layer can be driven against any implementation.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};
use url::Url;

use crate::core::config::ProviderConfig;
use crate::core::models::User;
use crate::errors::Ns1Error;

const API_KEY_HEADER: &str = "X-NSONE-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USERS_PATH: &str = "account/users/";

/// User operations of the NS1 account API.
///
/// `create` and `update` return the user as echoed back by the server.
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn get(&self, username: &str) -> Result<User, Ns1Error>;
    async fn create(&self, user: &User) -> Result<User, Ns1Error>;
    async fn update(&self, user: &User) -> Result<User, Ns1Error>;
    async fn delete(&self, username: &str) -> Result<(), Ns1Error>;
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Turn a non-success response into an error whose text reads
/// `"<METHOD> <url>: <status> <message>"`.
#[must_use]
pub fn classify_error(method: &Method, url: &Url, status: StatusCode, body: &str) -> Ns1Error {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|r| r.message)
        .unwrap_or_else(|| body.trim().to_string());
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message
    };

    let text = format!("{method} {url}: {} {message}", status.as_u16());
    match status {
        StatusCode::NOT_FOUND => Ns1Error::NotFound(text),
        StatusCode::TOO_MANY_REQUESTS => Ns1Error::RateLimited(text),
        _ => Ns1Error::ApiError(text),
    }
}

/// reqwest-backed implementation of the NS1 account API.
pub struct Ns1Client {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl Ns1Client {
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, Ns1Error> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| Ns1Error::ConfigError(format!("NS1_ENDPOINT: {e}")))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.ignore_ssl)
            .build()?;

        if config.ignore_ssl {
            warn!("TLS certificate verification disabled for {}", endpoint);
        }

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn user_url(&self, username: &str) -> Result<Url, Ns1Error> {
        let path = format!("{USERS_PATH}{}", urlencoding::encode(username));
        self.endpoint
            .join(&path)
            .map_err(|e| Ns1Error::GeneralError(format!("invalid user URL for {username}: {e}")))
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, Ns1Error>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, Ns1Error>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(100).map(jitter).take(5);

        RetryIf::spawn(strategy, operation, |e: &Ns1Error| {
            let limited = matches!(e, Ns1Error::RateLimited(_));
            if limited {
                warn!("NS1 rate limit hit, backing off: {}", e);
            }
            limited
        })
        .await
    }

    async fn send(
        &self,
        method: Method,
        username: &str,
        body: Option<&User>,
    ) -> Result<String, Ns1Error> {
        let url = self.user_url(username)?;

        self.with_retry(|| {
            let method = method.clone();
            let url = url.clone();
            async move {
                debug!(%method, %url, "NS1 request");

                #[cfg(feature = "debug-logs")]
                if let Some(user) = body {
                    debug!("NS1 request body: {}", serde_json::to_string(user)?);
                }

                let mut request = self
                    .http
                    .request(method.clone(), url.clone())
                    .header(API_KEY_HEADER, &self.api_key);
                if let Some(user) = body {
                    request = request.json(user);
                }

                let response = request.send().await?;
                let status = response.status();
                let text = response.text().await?;

                if status.is_success() {
                    Ok(text)
                } else {
                    Err(classify_error(&method, &url, status, &text))
                }
            }
        })
        .await
    }

    /// Decode the echoed user, falling back to the request object when the
    /// server answers with an empty body.
    fn decode_echo(text: &str, sent: &User) -> Result<User, Ns1Error> {
        if text.trim().is_empty() {
            return Ok(sent.clone());
        }
        Ok(serde_json::from_str(text)?)
    }
}

#[async_trait]
impl UsersApi for Ns1Client {
    async fn get(&self, username: &str) -> Result<User, Ns1Error> {
        let text = self.send(Method::GET, username, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn create(&self, user: &User) -> Result<User, Ns1Error> {
        let text = self.send(Method::PUT, &user.username, Some(user)).await?;
        Self::decode_echo(&text, user)
    }

    async fn update(&self, user: &User) -> Result<User, Ns1Error> {
        let text = self.send(Method::POST, &user.username, Some(user)).await?;
        Self::decode_echo(&text, user)
    }

    async fn delete(&self, username: &str) -> Result<(), Ns1Error> {
        self.send(Method::DELETE, username, None).await?;
        Ok(())
    }
}
