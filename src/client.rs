use crate::error::{ErrorKind, Result};
use crate::types::Status;
use async_trait::async_trait;
use derive_builder::Builder;
use headers::{HeaderMap, HeaderValue};
use reqwest::header;
use std::time::Duration;

/// Identifying `User-Agent` sent with every request unless overridden
pub const USER_AGENT: &str = concat!("volley/", env!("CARGO_PKG_VERSION"));

/// Performs one HTTP attempt and classifies its outcome.
///
/// The dispatcher only talks to this trait, which lets tests swap the
/// network for an instrumented fake.
#[async_trait]
pub trait Checker: Send + Sync + 'static {
    async fn check(&self, request_num: usize) -> Status;
}

/// Issues GET requests against a single target URL
#[derive(Debug, Clone)]
pub struct Client {
    reqwest_client: reqwest::Client,
    url: String,
}

/// The target URL is required, everything else has a default.
/// TLS and timeout settings apply to the whole run.
#[allow(dead_code)]
#[derive(Builder, Debug)]
#[builder(build_fn(skip))]
#[builder(setter(into))]
#[builder(name = "ClientBuilder")]
pub struct ClientBuilderInternal {
    url: String,
    user_agent: String,
    allow_insecure: bool,
    custom_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn build(&mut self) -> Result<Client> {
        let url = self.url.clone().unwrap_or_default();
        if url.trim().is_empty() {
            return Err(ErrorKind::MissingUrl);
        }

        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| USER_AGENT.to_string());
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&user_agent)?);
        if let Some(custom) = &self.custom_headers {
            headers.extend(custom.clone());
        }

        let allow_insecure = self.allow_insecure.unwrap_or(false);
        if allow_insecure {
            warn!("TLS certificate verification is disabled");
        }

        let builder = reqwest::ClientBuilder::new()
            .gzip(true)
            .default_headers(headers)
            .danger_accept_invalid_certs(allow_insecure);

        let builder = match self.timeout.flatten() {
            Some(t) => builder.timeout(t),
            None => builder,
        };

        Ok(Client {
            reqwest_client: builder.build()?,
            url,
        })
    }
}

impl Client {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Checker for Client {
    async fn check(&self, request_num: usize) -> Status {
        let request = match self.reqwest_client.get(self.url.as_str()).build() {
            Ok(request) => request,
            Err(e) => {
                debug!("Request #{}: cannot build request: {}", request_num + 1, e);
                return e.into();
            }
        };

        match self.reqwest_client.execute(request).await {
            // Only the status is kept; dropping the response closes the body
            Ok(response) => Status::Http(response.status()),
            Err(e) => {
                debug!("Request #{}: transport error: {:?}", request_num + 1, e);
                e.into()
            }
        }
    }
}
