use crate::core::aggregate::{sum_field, YearAggregator};
use crate::core::fetcher::TradeXmlFetcher;
use crate::core::query::QueryBuilder;
use crate::core::records::parse_items;
use crate::core::xml_json::xml_to_json;
use crate::domain::model::{TradeField, TradeItem, TradeQuery, YearSummary};
use crate::domain::ports::{ConfigProvider, XmlSource};
use crate::utils::error::Result;

/// Runs fetch → parse → aggregate for a single query. Holds no per-request state.
pub struct TradePipeline<S: XmlSource> {
    source: S,
    aggregator: YearAggregator,
}

impl TradePipeline<TradeXmlFetcher> {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let builder = QueryBuilder::new(config.api_endpoint())?;
        Ok(Self::new(
            TradeXmlFetcher::new(builder),
            YearAggregator::new(config.total_sentinel()),
        ))
    }
}

impl<S: XmlSource> TradePipeline<S> {
    pub fn new(source: S, aggregator: YearAggregator) -> Self {
        Self { source, aggregator }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The upstream document transcoded to pretty JSON.
    pub async fn document_json(&self, query: &TradeQuery) -> Result<String> {
        let xml = self.source.fetch_xml(query).await?;
        xml_to_json(&xml)
    }

    async fn items(&self, query: &TradeQuery) -> Result<Vec<TradeItem>> {
        let xml = self.source.fetch_xml(query).await?;
        parse_items(&xml)
    }

    /// One column summed over every item, grand-total row included.
    pub async fn field_total(&self, query: &TradeQuery, field: TradeField) -> Result<i64> {
        let items = self.items(query).await?;
        let total = sum_field(&items, field);
        tracing::debug!("Total {} over {} items: {}", field, items.len(), total);
        Ok(total)
    }

    pub async fn yearly_summaries(&self, query: &TradeQuery) -> Result<Vec<YearSummary>> {
        let items = self.items(query).await?;
        Ok(self.aggregator.aggregate(&items))
    }

    /// Yearly summaries and a column total from a single upstream fetch.
    pub async fn report(&self, query: &TradeQuery, field: TradeField) -> Result<TradeReport> {
        let items = self.items(query).await?;
        Ok(TradeReport {
            summaries: self.aggregator.aggregate(&items),
            field,
            total: sum_field(&items, field),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TradeReport {
    pub summaries: Vec<YearSummary>,
    pub field: TradeField,
    pub total: i64,
}
