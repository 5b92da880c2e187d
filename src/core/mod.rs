pub mod aggregate;
pub mod fetcher;
pub mod pipeline;
pub mod query;
pub mod records;
pub mod xml_json;

pub use crate::domain::model::{Credential, TradeField, TradeItem, TradeQuery, YearSummary};
pub use crate::domain::ports::{ConfigProvider, XmlSource};
pub use crate::utils::error::Result;
