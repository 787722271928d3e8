//! Report publishing.
//!
//! The report text is handed to a [`Publisher`] exactly once per run, with
//! no retry, chunking, or length validation - the feed either takes the
//! whole report or the run fails. The production implementation posts a
//! tweet via the v1.1 `statuses/update` endpoint, signed with OAuth 1.0a
//! (HMAC-SHA1 is the only signature method the endpoint accepts).

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::prelude::*;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;
use tracing::info;

use crate::config::TwitterConfig;

const STATUS_UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

/// Delivers a finished report to the external feed.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    /// Publishes the report text verbatim.
    async fn publish(&self, text: &str) -> crate::Result<()>;
}

/// Posts reports as tweets.
pub struct TwitterPublisher {
    http: reqwest::Client,
    credentials: TwitterConfig,
}

impl TwitterPublisher {
    pub fn new(http: reqwest::Client, credentials: TwitterConfig) -> Self {
        Self { http, credentials }
    }
}

impl Publisher for TwitterPublisher {
    async fn publish(&self, text: &str) -> crate::Result<()> {
        let timestamp = unix_timestamp()?.to_string();
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let authorization = authorization_header(
            &self.credentials,
            STATUS_UPDATE_URL,
            &[("status", text)],
            &nonce,
            &timestamp,
        )?;

        let response = self
            .http
            .post(STATUS_UPDATE_URL)
            .header("Authorization", authorization)
            .form(&[("status", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::RatewireError::Publish(format!(
                "statuses/update returned {status}: {body}"
            )));
        }

        info!(chars = text.chars().count(), "Published report");
        Ok(())
    }
}

/// Seconds since the UNIX epoch.
fn unix_timestamp() -> crate::Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| crate::RatewireError::Publish(format!("system clock before UNIX epoch: {e}")))
}

/// Builds the `Authorization: OAuth ...` header for a signed POST.
fn authorization_header(
    credentials: &TwitterConfig,
    url: &str,
    request_params: &[(&str, &str)],
    nonce: &str,
    timestamp: &str,
) -> crate::Result<String> {
    let oauth_params = [
        ("oauth_consumer_key", credentials.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let mut signed: Vec<(&str, &str)> = oauth_params.to_vec();
    signed.extend_from_slice(request_params);
    let signature = sign(
        "POST",
        url,
        &signed,
        credentials.consumer_secret.as_str(),
        credentials.access_token_secret.as_str(),
    )?;

    let mut header = String::from("OAuth ");
    for (i, (key, value)) in oauth_params
        .iter()
        .chain(std::iter::once(&("oauth_signature", signature.as_str())))
        .enumerate()
    {
        if i > 0 {
            header.push_str(", ");
        }
        let _ = write!(header, "{key}=\"{}\"", percent_encode(value));
    }
    Ok(header)
}

/// Computes the OAuth 1.0a request signature.
///
/// Algorithm: `Base64(HMAC-SHA1(encode(consumer_secret) "&"
/// encode(token_secret), METHOD "&" encode(url) "&" encode(sorted
/// percent-encoded params)))`
fn sign(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> crate::Result<String> {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let base = format!(
        "{method}&{}&{}",
        percent_encode(url),
        percent_encode(&param_string)
    );
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| crate::RatewireError::Publish(format!("invalid HMAC key: {e}")))?;
    mac.update(base.as_bytes());

    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

/// RFC 3986 percent-encoding over UTF-8 bytes, as OAuth requires.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}
