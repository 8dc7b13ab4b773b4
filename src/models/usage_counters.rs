use crate::models::schema::usage_counters;
use crate::plans::MetricType;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UsageCounterError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = usage_counters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UsageCounter {
    pub id: i64,
    pub tenant_id: i32,
    pub day: NaiveDate,
    pub metric: String,
    pub count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UsageCounter {
    pub fn get_count(
        conn: &mut PgConnection,
        lookup_tenant_id: i32,
        lookup_day: NaiveDate,
        metric: MetricType,
    ) -> Result<i64, UsageCounterError> {
        usage_counters::table
            .filter(usage_counters::tenant_id.eq(lookup_tenant_id))
            .filter(usage_counters::day.eq(lookup_day))
            .filter(usage_counters::metric.eq(metric.as_str()))
            .select(usage_counters::count)
            .first::<i64>(conn)
            .optional()
            .map(|count| count.unwrap_or(0))
            .map_err(UsageCounterError::DatabaseError)
    }

    /// Atomic upsert increment. Concurrent calls for the same
    /// (tenant, day, metric) all land; the row-level `count = count + n`
    /// closes the read-modify-write race.
    pub fn add(
        conn: &mut PgConnection,
        lookup_tenant_id: i32,
        lookup_day: NaiveDate,
        metric: MetricType,
        amount: i64,
    ) -> Result<i64, UsageCounterError> {
        diesel::insert_into(usage_counters::table)
            .values(&NewUsageCounter {
                tenant_id: lookup_tenant_id,
                day: lookup_day,
                metric: metric.as_str().to_string(),
                count: amount,
            })
            .on_conflict((
                usage_counters::tenant_id,
                usage_counters::day,
                usage_counters::metric,
            ))
            .do_update()
            .set((
                usage_counters::count.eq(usage_counters::count + amount),
                usage_counters::updated_at.eq(diesel::dsl::now),
            ))
            .returning(usage_counters::count)
            .get_result(conn)
            .map_err(UsageCounterError::DatabaseError)
    }

    pub fn list_since(
        conn: &mut PgConnection,
        lookup_tenant_id: i32,
        since: NaiveDate,
    ) -> Result<Vec<UsageCounter>, UsageCounterError> {
        usage_counters::table
            .filter(usage_counters::tenant_id.eq(lookup_tenant_id))
            .filter(usage_counters::day.ge(since))
            .order(usage_counters::day.desc())
            .load::<UsageCounter>(conn)
            .map_err(UsageCounterError::DatabaseError)
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = usage_counters)]
pub struct NewUsageCounter {
    pub tenant_id: i32,
    pub day: NaiveDate,
    pub metric: String,
    pub count: i64,
}
