pub mod catalog;
pub mod customers;
pub mod generate;
pub mod invoices;
pub mod metrics;
pub mod roadmap;
pub mod settings;
pub mod status;

use nova_api_types::{ApiClientState, ApiLocaleSettings, ErrorBody};
use nova_core::config::CredentialProvider;
use nova_core::locale;
use serde::de::DeserializeOwned;

/// Env var holding the API key sent as `x-api-key`, when the daemon requires one.
pub const API_KEY_ENV: &str = "NOVA_API_KEY";

/// Build a reqwest client, attaching the API key when one is set.
pub fn api_client() -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Some(key) = CredentialProvider::from_env(API_KEY_ENV) {
        if let Ok(value) = reqwest::header::HeaderValue::from_str(&key) {
            headers.insert("x-api-key", value);
        }
    }
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .unwrap_or_default()
}

/// Map common reqwest errors to user-friendly messages.
pub fn friendly_error(err: reqwest::Error) -> anyhow::Error {
    if err.is_connect() {
        anyhow::anyhow!(
            "Could not connect to the nova daemon. Is it running?\n  \
             (hint: start it with `nova-daemon` or check --api-url)"
        )
    } else if err.is_timeout() {
        anyhow::anyhow!("Request timed out. The daemon may be overloaded.")
    } else {
        anyhow::anyhow!("API request failed: {err}")
    }
}

/// Turn a non-success response into an error carrying the server's message.
pub async fn check_response(what: &str, resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    if message.is_empty() {
        anyhow::bail!("Failed to {what} (HTTP {status})");
    }
    anyhow::bail!("Failed to {what} (HTTP {status}): {message}")
}

/// GET `path` with `query` and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(
    api_url: &str,
    path: &str,
    query: &[(&str, String)],
    what: &str,
) -> anyhow::Result<T> {
    let resp = api_client()
        .get(format!("{api_url}{path}"))
        .query(query)
        .send()
        .await
        .map_err(friendly_error)?;
    let resp = check_response(what, resp).await?;
    resp.json().await.map_err(friendly_error)
}

/// Language and currency used to render tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLocale {
    pub language: String,
    pub currency: String,
}

impl Default for DisplayLocale {
    fn default() -> Self {
        Self {
            language: locale::DEFAULT_LANGUAGE.to_string(),
            currency: locale::DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl DisplayLocale {
    fn from_settings(settings: &ApiLocaleSettings) -> Self {
        let fallback = Self::default();
        Self {
            language: if locale::is_supported_language(&settings.language) {
                settings.language.clone()
            } else {
                fallback.language
            },
            currency: if settings.currency.is_empty() {
                fallback.currency
            } else {
                settings.currency.clone()
            },
        }
    }
}

/// Resolve the display locale from the daemon's client settings.
///
/// `lang` overrides the saved language. An unreachable daemon falls back to
/// the defaults so offline commands still render.
pub async fn display_locale(api_url: &str, lang: Option<&str>) -> anyhow::Result<DisplayLocale> {
    if let Some(lang) = lang {
        if !locale::is_supported_language(lang) {
            anyhow::bail!(
                "unsupported language '{lang}' (expected one of: {})",
                locale::supported_languages().collect::<Vec<_>>().join(", ")
            );
        }
    }
    let mut display =
        match get_json::<ApiClientState>(api_url, "/api/settings", &[], "fetch settings").await {
            Ok(state) => DisplayLocale::from_settings(&state.settings),
            Err(e) => {
                tracing::debug!(error = %e, "settings unavailable, using default display locale");
                DisplayLocale::default()
            }
        };
    if let Some(lang) = lang {
        display.language = lang.to_string();
    }
    Ok(display)
}

/// Collect `(name, value)` pairs for the options that were given.
pub(crate) fn query_pairs(pairs: &[(&'static str, Option<&str>)]) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .filter_map(|(name, value)| value.map(|v| (*name, v.to_string())))
        .collect()
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    use super::test_support::serve;
    use super::*;

    fn settings_app(language: &'static str, currency: &'static str) -> Router {
        Router::new().route(
            "/api/settings",
            get(move || async move {
                Json(json!({"settings": {"country": "DE", "language": language, "currency": currency}}))
            }),
        )
    }

    #[tokio::test]
    async fn display_locale_follows_saved_settings() {
        let base = serve(settings_app("de", "EUR")).await;
        let display = display_locale(&base, None).await.unwrap();
        assert_eq!(
            display,
            DisplayLocale {
                language: "de".into(),
                currency: "EUR".into()
            }
        );

        let display = display_locale(&base, Some("fr")).await.unwrap();
        assert_eq!(display.language, "fr");
        assert_eq!(display.currency, "EUR");
    }

    #[tokio::test]
    async fn display_locale_rejects_unknown_override() {
        let base = serve(settings_app("de", "EUR")).await;
        let err = display_locale(&base, Some("tlh")).await.unwrap_err();
        assert!(err.to_string().contains("unsupported language 'tlh'"));
    }

    #[tokio::test]
    async fn display_locale_defaults_without_daemon() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let display = display_locale(&format!("http://{addr}"), None).await.unwrap();
        assert_eq!(display, DisplayLocale::default());
    }

    #[test]
    fn query_pairs_skips_missing_options() {
        let pairs = query_pairs(&[("stage", Some("paid")), ("customer", None), ("from", Some("2024-01-01"))]);
        assert_eq!(
            pairs,
            vec![("stage", "paid".to_string()), ("from", "2024-01-01".to_string())]
        );
    }

    #[tokio::test]
    async fn get_json_surfaces_server_error_message() {
        let app = Router::new().route(
            "/api/invoices",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "invalid value for 'stage'"})),
                )
            }),
        );
        let base = serve(app).await;
        let err = get_json::<Value>(&base, "/api/invoices", &[], "list invoices")
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("HTTP 400"), "{msg}");
        assert!(msg.contains("invalid value for 'stage'"), "{msg}");
    }

    #[tokio::test]
    async fn connection_refused_is_friendly() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = get_json::<Value>(&format!("http://{addr}"), "/api/status", &[], "fetch status")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Could not connect"));
    }
}
