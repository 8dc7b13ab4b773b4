//! Plan tiers and the static per-day limit table they map to.

use serde::{Deserialize, Serialize};

/// Sentinel meaning "no limit" for a metric.
pub const UNLIMITED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl Plan {
    /// Parse a stored plan string. Unknown values fall back to the most
    /// restrictive tier rather than failing open.
    pub fn parse(value: &str) -> Plan {
        match value.to_ascii_uppercase().as_str() {
            "STARTER" => Plan::Starter,
            "PROFESSIONAL" => Plan::Professional,
            "ENTERPRISE" => Plan::Enterprise,
            _ => Plan::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Starter => "STARTER",
            Plan::Professional => "PROFESSIONAL",
            Plan::Enterprise => "ENTERPRISE",
        }
    }

    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Free => PlanLimits {
                users: 1,
                conversations: 100,
                documents: 10,
                api_calls: 1000,
                storage_bytes: 100 * 1024 * 1024,
            },
            Plan::Starter => PlanLimits {
                users: 5,
                conversations: 1000,
                documents: 100,
                api_calls: 10_000,
                storage_bytes: 1024 * 1024 * 1024,
            },
            Plan::Professional => PlanLimits {
                users: 25,
                conversations: 10_000,
                documents: 1000,
                api_calls: 100_000,
                storage_bytes: 10 * 1024 * 1024 * 1024,
            },
            Plan::Enterprise => PlanLimits {
                users: UNLIMITED,
                conversations: UNLIMITED,
                documents: UNLIMITED,
                api_calls: UNLIMITED,
                storage_bytes: UNLIMITED,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLimits {
    pub users: i64,
    pub conversations: i64,
    pub documents: i64,
    pub api_calls: i64,
    pub storage_bytes: i64,
}

impl PlanLimits {
    pub fn limit_for(&self, metric: MetricType) -> i64 {
        match metric {
            MetricType::Users => self.users,
            MetricType::Conversations => self.conversations,
            MetricType::Documents => self.documents,
            MetricType::ApiCalls => self.api_calls,
            MetricType::Storage => self.storage_bytes,
        }
    }
}

/// Metered resource kinds. Stored as text in `usage_counters.metric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Users,
    Conversations,
    Documents,
    ApiCalls,
    Storage,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Users => "users",
            MetricType::Conversations => "conversations",
            MetricType::Documents => "documents",
            MetricType::ApiCalls => "api_calls",
            MetricType::Storage => "storage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plan_falls_back_to_free() {
        assert_eq!(Plan::parse("gold"), Plan::Free);
        assert_eq!(Plan::parse(""), Plan::Free);
        assert_eq!(Plan::parse("FREE"), Plan::Free);
    }

    #[test]
    fn plan_parse_is_case_insensitive() {
        assert_eq!(Plan::parse("starter"), Plan::Starter);
        assert_eq!(Plan::parse("Professional"), Plan::Professional);
        assert_eq!(Plan::parse("ENTERPRISE"), Plan::Enterprise);
    }

    #[test]
    fn enterprise_is_unlimited_on_every_metric() {
        let limits = Plan::Enterprise.limits();
        for metric in [
            MetricType::Users,
            MetricType::Conversations,
            MetricType::Documents,
            MetricType::ApiCalls,
            MetricType::Storage,
        ] {
            assert_eq!(limits.limit_for(metric), UNLIMITED);
        }
    }

    #[test]
    fn free_tier_api_call_limit() {
        assert_eq!(Plan::Free.limits().limit_for(MetricType::ApiCalls), 1000);
    }

    #[test]
    fn metric_storage_forms_are_distinct() {
        let forms = [
            MetricType::Users,
            MetricType::Conversations,
            MetricType::Documents,
            MetricType::ApiCalls,
            MetricType::Storage,
        ]
        .map(|m| m.as_str());
        let unique: std::collections::HashSet<_> = forms.iter().collect();
        assert_eq!(unique.len(), forms.len());
    }
}
