//! HTTP asset download via reqwest.

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use url::Url;

use splash_types::{AssetFormat, FetchedAsset};

use crate::types::{ErrorCode, FetchError, HttpFetcherConfig};
use crate::{AssetFetcher, FetchFut};

/// Downloads an image over HTTP(S) and checks that it is one.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: HttpFetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| {
                FetchError::new(ErrorCode::Internal, format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &HttpFetcherConfig {
        &self.config
    }

    async fn download(&self, raw_url: &str) -> Result<FetchedAsset, FetchError> {
        let url = validate_url(raw_url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e, raw_url))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(FetchError::new(
                ErrorCode::Http4xx,
                format!("asset request rejected with HTTP {}", status.as_u16()),
            )
            .with_detail("status", status.as_u16().to_string())
            .with_detail("url", raw_url));
        }
        if status.is_server_error() {
            return Err(FetchError::new(
                ErrorCode::Http5xx,
                format!("asset server failed with HTTP {}", status.as_u16()),
            )
            .with_detail("status", status.as_u16().to_string())
            .with_detail("url", raw_url));
        }
        if !status.is_success() {
            return Err(FetchError::new(
                ErrorCode::Network,
                format!("unexpected HTTP status {}", status.as_u16()),
            )
            .with_detail("status", status.as_u16().to_string()));
        }

        let max_bytes = self.config.max_download_bytes;
        if let Some(len) = response.content_length()
            && len > max_bytes
        {
            return Err(too_large(max_bytes));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| map_reqwest_error(&e, raw_url))?;
            if (body.len() + chunk.len()) as u64 > max_bytes {
                return Err(too_large(max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        let Some(format) = AssetFormat::sniff(&body) else {
            return Err(FetchError::new(
                ErrorCode::DecodeFailed,
                "response body is not a recognised image",
            )
            .with_detail("content_type", content_type.unwrap_or_default())
            .with_detail("bytes", body.len().to_string()));
        };

        tracing::debug!(url = %final_url, %format, bytes = body.len(), "Asset body received");

        Ok(FetchedAsset {
            url: final_url,
            content_type,
            format,
            bytes: body,
        })
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFut<'a> {
        Box::pin(self.download(url))
    }
}

/// Parse and check the scheme of an asset URL.
pub fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::new(ErrorCode::InvalidUrl, "asset URL is empty"));
    }

    let url = Url::parse(trimmed).map_err(|e| {
        FetchError::new(ErrorCode::InvalidUrl, format!("failed to parse URL: {e}"))
            .with_detail("url", trimmed)
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::new(
            ErrorCode::InvalidScheme,
            format!("unsupported URL scheme: {other}"),
        )
        .with_detail("url", trimmed)),
    }
}

fn too_large(max_bytes: u64) -> FetchError {
    FetchError::new(
        ErrorCode::ResponseTooLarge,
        format!("asset exceeds {max_bytes} bytes"),
    )
    .with_detail("max_bytes", max_bytes.to_string())
}

fn map_reqwest_error(err: &reqwest::Error, url: &str) -> FetchError {
    let code = if err.is_timeout() {
        ErrorCode::Timeout
    } else if err.is_redirect() {
        ErrorCode::RedirectLimit
    } else {
        ErrorCode::Network
    };
    FetchError::new(code, format!("asset request failed: {err}")).with_detail("url", url)
}

#[cfg(test)]
mod tests {
    use super::validate_url;
    use crate::ErrorCode;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("https://example.com/a.png").is_ok());
        assert!(validate_url(" http://example.com/a.png ").is_ok());
    }

    #[test]
    fn rejects_empty_url() {
        let err = validate_url("   ").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidUrl);
    }

    #[test]
    fn rejects_unparseable_url() {
        let err = validate_url("not a url").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidUrl);
        assert_eq!(err.detail("url"), Some("not a url"));
    }

    #[test]
    fn rejects_other_schemes() {
        let err = validate_url("file:///etc/passwd").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidScheme);
        let err = validate_url("ftp://example.com/a.png").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidScheme);
    }
}
