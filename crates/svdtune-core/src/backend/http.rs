//! HTTP client for the compression server.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use unicode_normalization::UnicodeNormalization;

use crate::config::SessionConfig;
use crate::control::{CompressionParameter, Preset};
use crate::error::{Error, Result};
use crate::session::{RecompressionResult, SvdMetrics};

use super::RecompressBackend;

/// reqwest-backed [`RecompressBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    recompress_url: String,
    upload_url: String,
    upload_path: String,
}

impl HttpBackend {
    /// Create a client for the server described by `config`.
    ///
    /// No timeout is applied unless `session.request_timeout` is set.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;

        let base = config.base_url.trim_end_matches('/');
        Ok(Self {
            client,
            recompress_url: format!("{base}{}", config.recompress_path),
            upload_url: format!("{base}{}", config.upload_path),
            upload_path: config.upload_path.clone(),
        })
    }

    /// Full URL of the recompression endpoint.
    #[must_use]
    pub fn recompress_url(&self) -> &str {
        &self.recompress_url
    }

    /// Upload an original image and return the filename the server stored
    /// it under, which later recompressions refer to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if `path` cannot be read,
    /// [`Error::Transport`] on network failure or an error status, and
    /// [`Error::Backend`] if the server bounced the upload back to its index.
    pub async fn upload(
        &self,
        path: &Path,
        k: CompressionParameter,
        preset: Option<Preset>,
    ) -> Result<String> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::FileNotFound(path.display().to_string()))?
            .to_string();
        let fname = secure_filename(&file_name)
            .ok_or_else(|| Error::UnsupportedFile(file_name.clone()))?;

        let data = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| Error::Internal(format!("invalid mime type: {e}")))?;
        let mut form = Form::new().part("image", part).text("k", k.get().to_string());
        if let Some(preset) = preset {
            form = form.text("preset", preset.as_str());
        }

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!("upload failed with HTTP {status}")));
        }
        // A rejected upload is redirected to the index page.
        if !response.url().path().ends_with(&self.upload_path) {
            return Err(Error::Backend(format!(
                "upload of '{fname}' was rejected by the server"
            )));
        }

        tracing::info!(fname = %fname, k = k.get(), "original uploaded");
        Ok(fname)
    }
}

#[async_trait]
impl RecompressBackend for HttpBackend {
    async fn recompress(
        &self,
        fname: &str,
        k: CompressionParameter,
    ) -> Result<RecompressionResult> {
        let form = Form::new()
            .text("fname", fname.to_string())
            .text("k", k.get().to_string());

        let response = self
            .client
            .post(&self.recompress_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response: {e}")))?;
        parse_recompress_response(status, &body)
    }
}

/// Interpret a recompression response body.
///
/// Numeric fields are accepted either as JSON numbers or as numeric strings.
/// A non-empty `error` field wins over everything else, whatever the status.
pub fn parse_recompress_response(status: StatusCode, body: &str) -> Result<RecompressionResult> {
    let object = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => object,
        _ if status.is_success() => {
            return Err(Error::MalformedResponse(
                "response is not a JSON object".to_string(),
            ))
        }
        _ => return Err(Error::Transport(format!("server answered HTTP {status}"))),
    };

    if let Some(message) = error_message(&object) {
        return Err(Error::Backend(message));
    }
    if !status.is_success() {
        return Err(Error::Transport(format!("server answered HTTP {status}")));
    }

    let url = object
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| missing("url"))?
        .to_string();

    Ok(RecompressionResult {
        url,
        before_kb: required_f64(&object, "before_kb")?,
        after_kb: required_f64(&object, "after_kb")?,
        ratio: required_f64(&object, "ratio")?,
        k: lenient_u64(&object, "k")
            .and_then(|k| u32::try_from(k).ok())
            .ok_or_else(|| missing("k"))?,
        runtime: required_f64(&object, "runtime")?,
        dimension: object.get("dimension").and_then(|d| match d {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }),
        svd: SvdMetrics {
            total_pixels: lenient_u64(&object, "total_pixels"),
            uncompressed_matrix_size: lenient_u64(&object, "uncompressed_matrix_size"),
            compressed_matrix_size: lenient_u64(&object, "compressed_matrix_size"),
            height: lenient_u64(&object, "height").and_then(|v| u32::try_from(v).ok()),
            width: lenient_u64(&object, "width").and_then(|v| u32::try_from(v).ok()),
            svd_compression_ratio: lenient_f64(&object, "svd_compression_ratio"),
            info_preserved: lenient_f64(&object, "info_preserved"),
        },
    })
}

/// Sanitize an upload filename the way the compression server does before
/// storing it.
///
/// The name is NFKD-normalized so accented letters keep their base letter,
/// then non-ASCII characters are dropped. `/` and whitespace runs become `_`,
/// anything outside `[A-Za-z0-9_.-]` is removed, and leading or trailing
/// `.`/`_` are trimmed. Returns `None` if nothing usable remains.
///
/// The server runs on POSIX, so `\` is not a separator and is simply removed.
#[must_use]
pub fn secure_filename(name: &str) -> Option<String> {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c: char| c == '.' || c == '_');

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn error_message(object: &Map<String, Value>) -> Option<String> {
    match object.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn missing(field: &str) -> Error {
    Error::MalformedResponse(format!("missing or invalid field '{field}'"))
}

fn lenient_f64(object: &Map<String, Value>, key: &str) -> Option<f64> {
    match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

fn lenient_u64(object: &Map<String, Value>, key: &str) -> Option<u64> {
    match object.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_f64(object: &Map<String, Value>, key: &str) -> Result<f64> {
    lenient_f64(object, key).ok_or_else(|| missing(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_encoded_numbers() {
        let body = r#"{
            "url": "/preview/photo_15.jpg",
            "k": 15,
            "runtime": "0.412",
            "before_kb": "512.00",
            "after_kb": "88.25",
            "ratio": "82.76",
            "dimension": "600×800"
        }"#;

        let result = parse_recompress_response(StatusCode::OK, body).unwrap();

        assert_eq!(result.url, "/preview/photo_15.jpg");
        assert_eq!(result.k, 15);
        assert!((result.runtime - 0.412).abs() < f64::EPSILON);
        assert!((result.after_kb - 88.25).abs() < f64::EPSILON);
        assert_eq!(result.dimension.as_deref(), Some("600×800"));
        assert!(result.svd.is_empty());
    }

    #[test]
    fn test_parse_native_numbers_and_metrics() {
        let body = r#"{
            "url": "/preview/a_10.png", "k": "10", "runtime": 0.2,
            "before_kb": 100, "after_kb": 40.5, "ratio": 59.5,
            "height": 600, "width": 800, "info_preserved": 93.1
        }"#;

        let result = parse_recompress_response(StatusCode::OK, body).unwrap();

        assert_eq!(result.k, 10);
        assert_eq!(result.svd.height, Some(600));
        assert_eq!(result.svd.width, Some(800));
        assert_eq!(result.svd.info_preserved, Some(93.1));
        assert_eq!(result.dimension, None);
    }

    #[test]
    fn test_error_field_wins_over_status() {
        let body = r#"{"error": "file not found"}"#;
        for status in [StatusCode::OK, StatusCode::NOT_FOUND] {
            match parse_recompress_response(status, body) {
                Err(Error::Backend(message)) => assert_eq!(message, "file not found"),
                other => panic!("expected backend error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_json_body() {
        assert!(matches!(
            parse_recompress_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            Err(Error::Transport(_))
        ));
        assert!(matches!(
            parse_recompress_response(StatusCode::OK, "<html>oops</html>"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let body = r#"{"url": "/preview/a.png", "k": 5, "runtime": 1}"#;
        match parse_recompress_response(StatusCode::OK, body) {
            Err(Error::MalformedResponse(message)) => assert!(message.contains("before_kb")),
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("photo.jpg").as_deref(), Some("photo.jpg"));
        assert_eq!(
            secure_filename("My cool photo.JPG").as_deref(),
            Some("My_cool_photo.JPG")
        );
        assert_eq!(
            secure_filename("../../etc/passwd").as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(secure_filename("..."), None);
    }

    #[test]
    fn test_secure_filename_folds_accents() {
        assert_eq!(secure_filename("résumé.png").as_deref(), Some("resume.png"));
        assert_eq!(
            secure_filename("Foto Café.jpg").as_deref(),
            Some("Foto_Cafe.jpg")
        );
    }

    #[test]
    fn test_secure_filename_drops_backslash() {
        assert_eq!(secure_filename("a\\b.png").as_deref(), Some("ab.png"));
    }

    #[test]
    fn test_urls_join_base_and_paths() {
        let config = SessionConfig {
            base_url: "http://127.0.0.1:5000/".to_string(),
            ..SessionConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.recompress_url(), "http://127.0.0.1:5000/recompress");
    }
}
