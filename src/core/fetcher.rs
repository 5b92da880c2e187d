use crate::core::query::QueryBuilder;
use crate::domain::model::TradeQuery;
use crate::domain::ports::XmlSource;
use crate::utils::error::{Result, TradeError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

/// GETs the upstream endpoint and hands back the body text, whatever the status.
pub struct TradeXmlFetcher {
    client: Client,
    builder: QueryBuilder,
}

impl TradeXmlFetcher {
    pub fn new(builder: QueryBuilder) -> Self {
        Self {
            client: Client::new(),
            builder,
        }
    }

    /// Transport failures become [`TradeError::Network`] with the URL stripped,
    /// since it carries the service key. Error statuses are not failures here:
    /// upstream puts its diagnostics in the body.
    pub async fn fetch(&self, url: Url) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(strip_url)?;

        let status = response.status();
        tracing::debug!("Upstream response status: {}", status);
        if !status.is_success() {
            tracing::warn!("Upstream returned {}, passing body through", status);
        }

        let body = response.text().await.map_err(strip_url)?;
        tracing::debug!("Read {} bytes from upstream", body.len());
        Ok(body)
    }
}

fn strip_url(err: reqwest::Error) -> TradeError {
    TradeError::Network(err.without_url())
}

#[async_trait]
impl XmlSource for TradeXmlFetcher {
    async fn fetch_xml(&self, query: &TradeQuery) -> Result<String> {
        tracing::debug!("Making API request to: {}", self.builder.redacted(query));
        self.fetch(self.builder.build(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Credential;
    use httpmock::prelude::*;

    fn query(hs: Option<&str>) -> TradeQuery {
        TradeQuery::new("202101", "202112", "CN", hs.map(str::to_string), Credential::new("secret-key"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_parameters() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/getNitemtradeList")
                    .query_param("serviceKey", "secret-key")
                    .query_param("strtYymm", "202101")
                    .query_param("endYymm", "202112")
                    .query_param("cntyCd", "CN")
                    .query_param("hsSgn", "0101")
                    .header("Content-Type", "application/json");
                then.status(200)
                    .header("Content-Type", "text/xml;charset=UTF-8")
                    .body("<response><body/></response>");
            })
            .await;

        let fetcher = TradeXmlFetcher::new(QueryBuilder::new(&server.url("/getNitemtradeList")).unwrap());
        let body = fetcher.fetch_xml(&query(Some("0101"))).await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(body, "<response><body/></response>");
    }

    #[tokio::test]
    async fn test_error_status_body_is_still_returned() {
        let server = MockServer::start_async().await;
        let diagnostic = "<OpenAPI_ServiceResponse><cmmMsgHeader><errMsg>SERVICE ERROR</errMsg></cmmMsgHeader></OpenAPI_ServiceResponse>";
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/getNitemtradeList");
                then.status(500).body(diagnostic);
            })
            .await;

        let fetcher = TradeXmlFetcher::new(QueryBuilder::new(&server.url("/getNitemtradeList")).unwrap());
        let body = fetcher.fetch_xml(&query(None)).await.unwrap();

        api_mock.assert_async().await;
        assert_eq!(body, diagnostic);
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error_without_key() {
        // Nothing listens on port 1.
        let fetcher = TradeXmlFetcher::new(QueryBuilder::new("http://127.0.0.1:1/getNitemtradeList").unwrap());
        let err = fetcher.fetch_xml(&query(None)).await.unwrap_err();

        assert!(matches!(err, TradeError::Network(_)));
        assert!(!err.to_string().contains("secret-key"));
    }
}
