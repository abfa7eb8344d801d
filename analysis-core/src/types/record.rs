use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat mapping of named numeric fundamentals for one ticker, as supplied
/// by the upstream data collaborator (pe_ratio, revenue_growth, roe,
/// debt_to_equity, dividend_yield, ...).
///
/// Missing fields are treated as absent rather than failing: conditions on
/// an absent metric simply do not hold, and the completeness ratio lowers
/// the final confidence instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricRecord {
    pub ticker: String,
    pub metrics: HashMap<String, f64>,
}

impl MetricRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            metrics: HashMap::new(),
        }
    }

    /// Builder-style metric insertion.
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Fraction of the required metric names that are present, in [0, 1].
    ///
    /// An empty requirement list counts as fully complete.
    pub fn completeness(&self, required: &[&str]) -> f64 {
        if required.is_empty() {
            return 1.0;
        }
        let present = required
            .iter()
            .filter(|name| self.metrics.contains_key(**name))
            .count();
        present as f64 / required.len() as f64
    }
}

/// One unit of work for an agent: the fundamentals record and, optionally,
/// raw document text for RAG ingestion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub record: MetricRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl AnalysisInput {
    pub fn new(record: MetricRecord) -> Self {
        Self {
            record,
            document: None,
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn ticker(&self) -> &str {
        &self.record.ticker
    }
}
