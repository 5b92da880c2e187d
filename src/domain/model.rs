use crate::utils::error::{Result, TradeError};
use crate::utils::validation::validate_year_month;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Upstream service key. Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// One upstream lookup: a month range for a country, optionally narrowed to an HS code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeQuery {
    pub start_period: String,
    pub end_period: String,
    pub country_code: String,
    pub commodity_code: Option<String>,
    pub credential: Credential,
}

impl TradeQuery {
    /// Validates both periods. The country code is passed through untouched.
    pub fn new(
        start_period: impl Into<String>,
        end_period: impl Into<String>,
        country_code: impl Into<String>,
        commodity_code: Option<String>,
        credential: Credential,
    ) -> Result<Self> {
        let start_period = start_period.into();
        let end_period = end_period.into();
        validate_year_month("start", &start_period)?;
        validate_year_month("end", &end_period)?;

        Ok(Self {
            start_period,
            end_period,
            country_code: country_code.into(),
            commodity_code: commodity_code.filter(|code| !code.is_empty()),
            credential,
        })
    }
}

/// The numeric columns the aggregation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeField {
    ExpDlr,
    ImpDlr,
    ExpWgt,
    ImpWgt,
    BalPayments,
}

impl TradeField {
    pub const ALL: [TradeField; 5] = [
        TradeField::ExpDlr,
        TradeField::ImpDlr,
        TradeField::ExpWgt,
        TradeField::ImpWgt,
        TradeField::BalPayments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TradeField::ExpDlr => "expDlr",
            TradeField::ImpDlr => "impDlr",
            TradeField::ExpWgt => "expWgt",
            TradeField::ImpWgt => "impWgt",
            TradeField::BalPayments => "balPayments",
        }
    }
}

impl FromStr for TradeField {
    type Err = TradeError;

    fn from_str(name: &str) -> Result<Self> {
        TradeField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| TradeError::UnknownField {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for TradeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<item>` row of the upstream response: child element name to text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeItem {
    pub fields: HashMap<String, String>,
}

impl TradeItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The `year` column; rows without one land in the `""` bucket.
    pub fn year(&self) -> &str {
        self.get("year").unwrap_or("")
    }

    /// Integer value of a numeric column. Missing or non-numeric text counts as 0.
    pub fn amount(&self, field: TradeField) -> i64 {
        match self.get(field.as_str()) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::trace!(field = field.as_str(), raw, "Non-numeric value counted as 0");
                0
            }),
            None => 0,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TradeItem {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut item = TradeItem::new();
        for (name, value) in iter {
            item.insert(name, value);
        }
        item
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: String,
    pub exp_dlr: i64,
    pub imp_dlr: i64,
    pub exp_wgt: i64,
    pub imp_wgt: i64,
    pub bal_payments: i64,
}

impl YearSummary {
    pub fn new(year: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: TradeField) -> i64 {
        match field {
            TradeField::ExpDlr => self.exp_dlr,
            TradeField::ImpDlr => self.imp_dlr,
            TradeField::ExpWgt => self.exp_wgt,
            TradeField::ImpWgt => self.imp_wgt,
            TradeField::BalPayments => self.bal_payments,
        }
    }

    fn slot(&mut self, field: TradeField) -> &mut i64 {
        match field {
            TradeField::ExpDlr => &mut self.exp_dlr,
            TradeField::ImpDlr => &mut self.imp_dlr,
            TradeField::ExpWgt => &mut self.exp_wgt,
            TradeField::ImpWgt => &mut self.imp_wgt,
            TradeField::BalPayments => &mut self.bal_payments,
        }
    }

    /// Adds every numeric column of `item` into this bucket.
    pub fn accumulate(&mut self, item: &TradeItem) {
        for field in TradeField::ALL {
            let slot = self.slot(field);
            *slot = slot.saturating_add(item.amount(field));
        }
    }
}
