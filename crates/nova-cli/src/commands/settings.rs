use nova_api_types::ApiClientState;
use serde_json::json;

use super::{api_client, check_response, friendly_error, get_json, print_json};

/// Show the client settings, or update country/language when either is given.
pub async fn run(
    api_url: &str,
    country: Option<String>,
    language: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let state: ApiClientState = if country.is_none() && language.is_none() {
        get_json(api_url, "/api/settings", &[], "fetch settings").await?
    } else {
        let mut settings = serde_json::Map::new();
        if let Some(country) = country {
            settings.insert("country".into(), json!(country));
        }
        if let Some(language) = language {
            settings.insert("language".into(), json!(language));
        }
        let resp = api_client()
            .patch(format!("{api_url}/api/settings"))
            .json(&json!({ "settings": settings }))
            .send()
            .await
            .map_err(friendly_error)?;
        let resp = check_response("update settings", resp).await?;
        resp.json().await.map_err(friendly_error)?
    };

    if json_output {
        return print_json(&state);
    }
    println!("Logged in:  {}", if state.logged_in { "yes" } else { "no" });
    println!("Country:    {}", state.settings.country);
    println!("Language:   {}", state.settings.language);
    println!("Currency:   {}", state.settings.currency);
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{routing::get, Json, Router};
    use serde_json::Value;

    use super::super::test_support::serve;
    use super::*;

    fn app() -> Router {
        Router::new().route(
            "/api/settings",
            get(|| async {
                Json(json!({"loggedIn": false, "settings": {"country": "US", "language": "en", "currency": "USD"}}))
            })
            .patch(|Json(body): Json<Value>| async move {
                let country = body["settings"]["country"].as_str().unwrap_or("US").to_string();
                Json(json!({"loggedIn": false, "settings": {"country": country, "language": "de", "currency": "EUR"}}))
            }),
        )
    }

    #[tokio::test]
    async fn show_settings() {
        let base = serve(app()).await;
        assert!(run(&base, None, None, false).await.is_ok());
    }

    #[tokio::test]
    async fn update_sends_patch() {
        let base = serve(app()).await;
        assert!(run(&base, Some("DE".into()), None, true).await.is_ok());
    }
}
