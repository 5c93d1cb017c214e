use crate::config::AuthScheme;
use crate::country_provider::{CountryProvider, CountryRecord};
use crate::normalize::normalize;
use crate::rate_provider::RateProvider;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

const USER_AGENT: &str = "goldwatch/0.2";

/// Client for the Eclesiar game API, covering the countries and market
/// endpoints. No retries: one request per call, per the upstream's implicit
/// rate-limit tolerance.
pub struct EclesiarClient {
    base_url: String,
    api_key: String,
    auth: AuthScheme,
    client: reqwest::Client,
}

impl EclesiarClient {
    pub fn new(base_url: &str, api_key: &str, auth: AuthScheme) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(EclesiarClient {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            auth,
            client,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header("Accept", "application/json");
        match self.auth {
            AuthScheme::Bearer => {
                request.header("Authorization", format!("Bearer {}", self.api_key))
            }
            AuthScheme::XApiKey => request.header("X-API-KEY", &self.api_key),
        }
    }
}

#[async_trait]
impl CountryProvider for EclesiarClient {
    #[instrument(name = "FetchCountries", skip(self))]
    async fn fetch_countries(&self) -> Result<Vec<CountryRecord>> {
        let url = format!("{}/countries", self.base_url);
        debug!("Requesting country list from {}", url);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for URL: {}",
                response.status(),
                url
            ));
        }

        let raw = response
            .json::<serde_json::Value>()
            .await
            .context("Failed to decode countries response")?;

        Ok(normalize(&raw))
    }
}

#[derive(Debug, Deserialize)]
struct MarketResponse {
    #[serde(default)]
    data: Option<Vec<MarketOffer>>,
}

#[derive(Debug, Deserialize)]
struct MarketOffer {
    rate: f64,
}

#[async_trait]
impl RateProvider for EclesiarClient {
    #[instrument(
        name = "FetchMarketRate",
        skip(self),
        fields(currency_id = currency_id)
    )]
    async fn fetch_rate(&self, currency_id: u32) -> Result<Option<f64>> {
        let url = format!(
            "{}/market/coin/get?currency_id={}",
            self.base_url, currency_id
        );
        debug!("Requesting market offers from {}", url);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency id: {}", e, currency_id))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency id: {}",
                response.status(),
                currency_id
            ));
        }

        let text = response.text().await?;
        let market: MarketResponse = serde_json::from_str(&text).map_err(|e| {
            anyhow!(
                "Failed to parse market response for currency id {}: {}",
                currency_id,
                e
            )
        })?;

        // Offers arrive pre-sorted ascending by price; index 0 is the best
        // (lowest) sell price.
        match market.data.unwrap_or_default().first() {
            Some(offer) if offer.rate > 0.0 => Ok(Some(offer.rate)),
            Some(offer) => {
                debug!(rate = offer.rate, "Ignoring non-positive market rate");
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "test-key";

    async fn mock_countries(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path("/countries"))
            .and(header("Authorization", format!("Bearer {KEY}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mock_market(server: &MockServer, currency_id: u32, body: &str) {
        Mock::given(method("GET"))
            .and(path("/market/coin/get"))
            .and(query_param("currency_id", currency_id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn client(server: &MockServer, auth: AuthScheme) -> EclesiarClient {
        EclesiarClient::new(&server.uri(), KEY, auth).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_countries_with_bearer_auth() {
        let server = MockServer::start().await;
        mock_countries(
            &server,
            r#"{"data": [{"name": "Alba", "currency": {"id": 7, "name": "ALB"}}]}"#,
        )
        .await;

        let countries = client(&server, AuthScheme::Bearer)
            .fetch_countries()
            .await
            .unwrap();

        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].name, "Alba");
        assert_eq!(countries[0].currency_id(), Some(7));
    }

    #[tokio::test]
    async fn test_fetch_countries_with_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/countries"))
            .and(header("X-API-KEY", KEY))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"[{"name": "Alba", "currency": {"id": 7, "name": "ALB"}}]"#),
            )
            .mount(&server)
            .await;

        let countries = client(&server, AuthScheme::XApiKey)
            .fetch_countries()
            .await
            .unwrap();

        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].currency_id(), Some(7));
    }

    #[tokio::test]
    async fn test_fetch_countries_unknown_shape_is_empty() {
        let server = MockServer::start().await;
        mock_countries(&server, r#"{"status": "maintenance"}"#).await;

        let countries = client(&server, AuthScheme::Bearer)
            .fetch_countries()
            .await
            .unwrap();
        assert!(countries.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_countries_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/countries"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = client(&server, AuthScheme::Bearer).fetch_countries().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_rate_takes_first_offer() {
        let server = MockServer::start().await;
        mock_market(
            &server,
            7,
            r#"{"data": [{"rate": 3.5}, {"rate": 4.0}, {"rate": 9.9}]}"#,
        )
        .await;

        let rate = client(&server, AuthScheme::Bearer)
            .fetch_rate(7)
            .await
            .unwrap();
        assert_eq!(rate, Some(3.5));
    }

    #[tokio::test]
    async fn test_fetch_rate_empty_market_is_none() {
        let server = MockServer::start().await;
        mock_market(&server, 7, r#"{"data": []}"#).await;

        let rate = client(&server, AuthScheme::Bearer)
            .fetch_rate(7)
            .await
            .unwrap();
        assert_eq!(rate, None);
    }

    #[tokio::test]
    async fn test_fetch_rate_missing_data_is_none() {
        let server = MockServer::start().await;
        mock_market(&server, 7, r#"{"data": null}"#).await;

        let rate = client(&server, AuthScheme::Bearer)
            .fetch_rate(7)
            .await
            .unwrap();
        assert_eq!(rate, None);
    }

    #[tokio::test]
    async fn test_fetch_rate_non_positive_is_none() {
        let server = MockServer::start().await;
        mock_market(&server, 7, r#"{"data": [{"rate": 0.0}, {"rate": 3.5}]}"#).await;

        let rate = client(&server, AuthScheme::Bearer)
            .fetch_rate(7)
            .await
            .unwrap();
        assert_eq!(rate, None);
    }

    #[tokio::test]
    async fn test_fetch_rate_malformed_response_is_an_error() {
        let server = MockServer::start().await;
        mock_market(&server, 7, r#"{"data": "oops"}"#).await;

        let result = client(&server, AuthScheme::Bearer).fetch_rate(7).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse market response for currency id 7")
        );
    }

    #[tokio::test]
    async fn test_fetch_rate_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/market/coin/get"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client(&server, AuthScheme::Bearer).fetch_rate(7).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 503 Service Unavailable for currency id: 7"
        );
    }
}
