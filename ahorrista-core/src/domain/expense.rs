//! Expense models: monthly summaries, itemized details and the create payload

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::category::ExpenseCategory;

/// One row of the summary table
///
/// The backend sends the category under either `category` or
/// `expenseCategory`; both are folded into `category` on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSummary")]
pub struct ExpenseSummary {
    pub id: i64,
    pub category: Option<ExpenseCategory>,
    pub year: i32,
    pub month: u32,
    #[serde(with = "amount")]
    pub amount: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    id: i64,
    #[serde(default)]
    category: Option<ExpenseCategory>,
    #[serde(default)]
    expense_category: Option<ExpenseCategory>,
    year: i32,
    month: u32,
    #[serde(with = "amount")]
    amount: Decimal,
}

impl From<RawSummary> for ExpenseSummary {
    fn from(raw: RawSummary) -> Self {
        Self {
            id: raw.id,
            category: raw.category.or(raw.expense_category),
            year: raw.year,
            month: raw.month,
            amount: raw.amount,
        }
    }
}

impl ExpenseSummary {
    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// An itemized expense underlying one (category, year, month) bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDetail {
    pub id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "amount")]
    pub amount: Decimal,
    /// ISO date string as sent by the backend
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<ExpenseCategory>,
}

impl ExpenseDetail {
    /// Calendar date of the expense, accepting plain dates and timestamps
    pub fn date_value(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Body of `POST /expenses`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub year: i32,
    pub month: u32,
    #[serde(with = "amount")]
    pub amount: Decimal,
}

/// Response of `POST /expenses`
///
/// Only the id is relied upon; everything else is kept as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

/// Decimal amounts travel as JSON numbers; strings are accepted too
pub(crate) mod amount {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value as JsonValue;

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let float = value
            .to_f64()
            .ok_or_else(|| S::Error::custom(format!("amount out of range: {}", value)))?;
        serializer.serialize_f64(float)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: JsonValue = Deserialize::deserialize(deserializer)?;
        let text = match value {
            JsonValue::Number(n) => n.to_string(),
            JsonValue::String(s) => s,
            _ => return Err(D::Error::custom("expected number or string for amount")),
        };
        parse(&text).ok_or_else(|| D::Error::custom(format!("invalid decimal: {}", text)))
    }

    fn parse(text: &str) -> Option<Decimal> {
        let text = text.trim();
        text.parse::<Decimal>()
            .ok()
            .or_else(|| Decimal::from_scientific(text).ok())
    }
}
