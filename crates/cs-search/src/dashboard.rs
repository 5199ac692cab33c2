//! Canned dashboard panels: fixed stats queries with a title.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{QueryEngine, QueryOutput};
use crate::stats::StatsRow;

/// A named stats query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub title: &'static str,
    pub description: &'static str,
    pub query: &'static str,
}

/// A panel with its evaluated rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelResult {
    pub title: String,
    pub description: String,
    pub query: String,
    pub rows: Vec<StatsRow>,
}

const DEFAULT_PANELS: [Panel; 5] = [
    Panel {
        title: "HTTP Status Codes",
        description: "Count of each HTTP status code in web access logs",
        query: "log_type=access | count_by(status)",
    },
    Panel {
        title: "Events Over Time",
        description: "Events per hour across all sources",
        query: "* | time_bucket(1h)",
    },
    Panel {
        title: "Top IP Addresses",
        description: "The ten most frequent source addresses",
        query: "* | top(10, ip)",
    },
    Panel {
        title: "Failed Login Attempts",
        description: "Failed logins per user",
        query: "action=login_failure | count_by(user)",
    },
    Panel {
        title: "Logs per Service",
        description: "Syslog volume per service",
        query: "log_type=syslog | count_by(service)",
    },
];

pub fn default_panels() -> Vec<Panel> {
    DEFAULT_PANELS.to_vec()
}

impl QueryEngine {
    pub async fn run_dashboard(&self, panels: &[Panel]) -> Vec<PanelResult> {
        self.run_dashboard_at(panels, Utc::now()).await
    }

    /// Evaluate each panel in order. A panel query without a stats stage
    /// reports its match count.
    pub async fn run_dashboard_at(&self, panels: &[Panel], now: DateTime<Utc>) -> Vec<PanelResult> {
        let mut results = Vec::with_capacity(panels.len());
        for panel in panels {
            let rows = match self.search_at(panel.query, now).await {
                QueryOutput::Rows(rows) => rows,
                QueryOutput::Records(records) => vec![StatsRow::Count {
                    count: records.len(),
                }],
            };
            results.push(PanelResult {
                title: panel.title.to_string(),
                description: panel.description.to_string(),
                query: panel.query.to_string(),
                rows,
            });
        }
        results
    }
}
