use crate::domain::model::TradeQuery;
use crate::utils::error::{Result, TradeError};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://apis.data.go.kr/1220000/nitemtrade/getNitemtradeList";

/// Builds request URLs against the upstream trade endpoint.
///
/// Parameter values are form-encoded (UTF-8, space as `+`, reserved characters
/// escaped), so any value survives a standard decode unchanged.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    endpoint: Url,
}

impl QueryBuilder {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| TradeError::InvalidConfigValue {
            field: "upstream.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self { endpoint })
    }

    /// `hsSgn` is omitted entirely when there is no commodity code; upstream reads that as all commodities.
    pub fn build(&self, query: &TradeQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("serviceKey", query.credential.expose())
                .append_pair("strtYymm", &query.start_period)
                .append_pair("endYymm", &query.end_period)
                .append_pair("cntyCd", &query.country_code);

            if let Some(hs) = query.commodity_code.as_deref().filter(|hs| !hs.is_empty()) {
                pairs.append_pair("hsSgn", hs);
            }
        }
        url
    }

    /// The request URL with the service key blanked out, for logs.
    pub fn redacted(&self, query: &TradeQuery) -> String {
        let mut url = self.build(query);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == "serviceKey" { "***".into() } else { v };
                (k.into_owned(), v.into_owned())
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url.to_string()
    }
}
