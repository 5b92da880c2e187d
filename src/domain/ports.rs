use crate::domain::model::TradeQuery;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Anything that can answer a trade query with the raw upstream XML body.
#[async_trait]
pub trait XmlSource: Send + Sync {
    async fn fetch_xml(&self, query: &TradeQuery) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn service_key(&self) -> &str;
    fn total_sentinel(&self) -> &str;
    fn bind_addr(&self) -> &str;
    fn allowed_origins(&self) -> &[String];
}

#[async_trait]
impl<T: XmlSource + ?Sized> XmlSource for Box<T> {
    async fn fetch_xml(&self, query: &TradeQuery) -> Result<String> {
        (**self).fetch_xml(query).await
    }
}
