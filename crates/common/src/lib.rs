use thiserror::Error;

pub mod types;
pub mod utils;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Thin pass-through clients for the third-party geo/weather providers.
/// Payloads are relayed as raw JSON; no caching, no retry.
pub mod providers {
    use super::*;

    const MAPBOX_GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
    const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";

    /// GET a JSON payload, treating any non-2xx status as a network failure.
    /// Provider error bodies never pass through as successes.
    async fn get_json(
        client: &reqwest::Client,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, CoreError> {
        let resp = client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Network(format!("upstream status {status}: {body}")));
        }
        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))
    }

    /// Nearby places lookup via the Mapbox geocoding API.
    pub async fn fetch_nearby_places(
        client: &reqwest::Client,
        access_token: &str,
        lat: &str,
        lon: &str,
        kind: &str,
    ) -> Result<serde_json::Value, CoreError> {
        // Mapbox expects lon,lat order.
        let url = format!("{MAPBOX_GEOCODING_URL}/{lon},{lat}.json");
        let proximity = format!("{lon},{lat}");
        get_json(
            client,
            &url,
            &[
                ("access_token", access_token),
                ("types", kind),
                ("limit", "10"),
                ("proximity", proximity.as_str()),
            ],
        )
        .await
    }

    /// Current conditions from OpenWeather, metric units.
    pub async fn fetch_current_weather(
        client: &reqwest::Client,
        api_key: &str,
        lat: &str,
        lon: &str,
    ) -> Result<serde_json::Value, CoreError> {
        let url = format!("{OPENWEATHER_URL}/weather");
        fetch_openweather(client, &url, api_key, lat, lon).await
    }

    /// 5-day forecast from OpenWeather, metric units.
    pub async fn fetch_forecast(
        client: &reqwest::Client,
        api_key: &str,
        lat: &str,
        lon: &str,
    ) -> Result<serde_json::Value, CoreError> {
        let url = format!("{OPENWEATHER_URL}/forecast");
        fetch_openweather(client, &url, api_key, lat, lon).await
    }

    async fn fetch_openweather(
        client: &reqwest::Client,
        url: &str,
        api_key: &str,
        lat: &str,
        lon: &str,
    ) -> Result<serde_json::Value, CoreError> {
        get_json(
            client,
            url,
            &[("lat", lat), ("lon", lon), ("appid", api_key), ("units", "metric")],
        )
        .await
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        /// Serve exactly one canned HTTP response on an ephemeral port.
        async fn serve_once(status_line: &'static str, body: &'static str) -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let (mut sock, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 2048];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
            });
            format!("http://{}", addr)
        }

        #[tokio::test]
        async fn upstream_error_status_is_an_error_not_a_payload() {
            let url = serve_once("500 Internal Server Error", r#"{"message":"provider exploded"}"#).await;
            let client = reqwest::Client::new();
            let err = get_json(&client, &url, &[("appid", "k")]).await.unwrap_err();
            match err {
                CoreError::Network(msg) => {
                    assert!(msg.contains("500"), "status missing from {msg}");
                }
                other => panic!("expected network error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn upstream_unauthorized_is_an_error() {
            let url = serve_once("401 Unauthorized", r#"{"cod":401,"message":"Invalid API key"}"#).await;
            let client = reqwest::Client::new();
            assert!(get_json(&client, &url, &[]).await.is_err());
        }

        #[tokio::test]
        async fn upstream_success_passes_payload_through() {
            let url = serve_once("200 OK", r#"{"features":[{"text":"Louvre"}]}"#).await;
            let client = reqwest::Client::new();
            let json = get_json(&client, &url, &[]).await.unwrap();
            assert_eq!(json["features"][0]["text"], "Louvre");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }
}
