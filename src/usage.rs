//! Two-phase usage gate.
//!
//! `check` compares today's counter against the plan limit without mutating
//! anything; `confirm` performs the atomic increment and runs only after the
//! paid downstream operation succeeded, so failed requests are never charged.

use crate::db::{DBConnection, DBError};
use crate::models::tenants::Tenant;
use crate::plans::{MetricType, UNLIMITED};
use chrono::{NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageDecision {
    pub allowed: bool,
    pub current: i64,
    pub limit: i64,
    pub remaining: i64,
}

/// Start-of-day truncated UTC date used as the counter bucket.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn check(
    db: &dyn DBConnection,
    tenant: &Tenant,
    metric: MetricType,
    amount: i64,
) -> Result<UsageDecision, DBError> {
    check_on(db, tenant, metric, amount, today_utc())
}

/// `check` with an explicit day bucket, split out for tests.
pub fn check_on(
    db: &dyn DBConnection,
    tenant: &Tenant,
    metric: MetricType,
    amount: i64,
    day: NaiveDate,
) -> Result<UsageDecision, DBError> {
    let limit = tenant.plan_limits().limit_for(metric);
    let current = db.usage_count(tenant.id, day, metric)?;

    if limit != UNLIMITED && current + amount > limit {
        return Ok(UsageDecision {
            allowed: false,
            current,
            limit,
            remaining: (limit - current).max(0),
        });
    }

    Ok(UsageDecision {
        allowed: true,
        current,
        limit,
        remaining: if limit == UNLIMITED {
            UNLIMITED
        } else {
            limit - current
        },
    })
}

/// Atomic increment of today's counter; returns the new count.
pub fn confirm(
    db: &dyn DBConnection,
    tenant: &Tenant,
    metric: MetricType,
    amount: i64,
) -> Result<i64, DBError> {
    db.add_usage(tenant.id, today_utc(), metric, amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::FakeDb;

    #[test]
    fn at_limit_denies_without_mutating() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");
        let day = today_utc();
        db.seed_usage(tenant.id, day, MetricType::ApiCalls, 1000);

        let decision = check(&db, &tenant, MetricType::ApiCalls, 1).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.current, 1000);
        assert_eq!(decision.limit, 1000);
        assert_eq!(decision.remaining, 0);

        // Counter untouched by the denied check.
        assert_eq!(
            db.usage_count(tenant.id, day, MetricType::ApiCalls).unwrap(),
            1000
        );
    }

    #[test]
    fn under_limit_allows_and_reports_remaining() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");
        db.seed_usage(tenant.id, today_utc(), MetricType::ApiCalls, 999);

        let decision = check(&db, &tenant, MetricType::ApiCalls, 1).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.current, 999);
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn amount_pushing_over_limit_is_denied() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");
        db.seed_usage(tenant.id, today_utc(), MetricType::Documents, 9);

        // limit 10: one more fits, two do not
        assert!(check(&db, &tenant, MetricType::Documents, 1).unwrap().allowed);
        assert!(!check(&db, &tenant, MetricType::Documents, 2).unwrap().allowed);
    }

    #[test]
    fn unlimited_plan_always_allows() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("big", "ENTERPRISE", "ACTIVE");
        db.seed_usage(tenant.id, today_utc(), MetricType::ApiCalls, 5_000_000);

        let decision = check(&db, &tenant, MetricType::ApiCalls, 1).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.limit, UNLIMITED);
        assert_eq!(decision.remaining, UNLIMITED);
    }

    #[test]
    fn unknown_plan_gets_free_limits() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("odd", "PLATINUM", "ACTIVE");
        db.seed_usage(tenant.id, today_utc(), MetricType::ApiCalls, 1000);

        let decision = check(&db, &tenant, MetricType::ApiCalls, 1).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.limit, 1000);
    }

    #[test]
    fn confirm_increments_and_creates_lazily() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");

        assert_eq!(confirm(&db, &tenant, MetricType::ApiCalls, 1).unwrap(), 1);
        assert_eq!(confirm(&db, &tenant, MetricType::ApiCalls, 1).unwrap(), 2);
        assert_eq!(
            db.usage_count(tenant.id, today_utc(), MetricType::ApiCalls)
                .unwrap(),
            2
        );
    }

    #[test]
    fn counters_are_bucketed_per_day() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");
        let yesterday = today_utc().pred_opt().unwrap();
        db.seed_usage(tenant.id, yesterday, MetricType::ApiCalls, 1000);

        // Yesterday's exhaustion does not spill into today.
        let decision = check(&db, &tenant, MetricType::ApiCalls, 1).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.current, 0);
    }

    #[test]
    fn counters_are_bucketed_per_metric() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");
        db.seed_usage(tenant.id, today_utc(), MetricType::ApiCalls, 1000);

        assert!(check(&db, &tenant, MetricType::Documents, 1).unwrap().allowed);
    }
}
