use crate::models::schema::tenants;
use crate::plans::{Plan, PlanLimits};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TenantError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    Active,
    Suspended,
    Cancelled,
}

impl TenantStatus {
    pub fn parse(value: &str) -> TenantStatus {
        match value {
            "ACTIVE" => TenantStatus::Active,
            "CANCELLED" => TenantStatus::Cancelled,
            _ => TenantStatus::Suspended,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "ACTIVE",
            TenantStatus::Suspended => "SUSPENDED",
            TenantStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tenant {
    pub id: i32,
    pub uuid: Uuid,
    pub slug: String,
    pub name: String,
    pub plan: String,
    pub status: String,
    pub settings: serde_json::Value,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        TenantStatus::parse(&self.status) == TenantStatus::Active
    }

    pub fn plan_limits(&self) -> PlanLimits {
        Plan::parse(&self.plan).limits()
    }

    pub fn get_by_uuid(
        conn: &mut PgConnection,
        tenant_uuid: Uuid,
    ) -> Result<Option<Tenant>, TenantError> {
        tenants::table
            .filter(tenants::uuid.eq(tenant_uuid))
            .first::<Tenant>(conn)
            .optional()
            .map_err(TenantError::DatabaseError)
    }

    pub fn get_by_slug(conn: &mut PgConnection, slug: &str) -> Result<Option<Tenant>, TenantError> {
        tenants::table
            .filter(tenants::slug.eq(slug))
            .first::<Tenant>(conn)
            .optional()
            .map_err(TenantError::DatabaseError)
    }

    pub fn slug_exists(conn: &mut PgConnection, slug: &str) -> Result<bool, TenantError> {
        use diesel::dsl::count_star;

        let count: i64 = tenants::table
            .filter(tenants::slug.eq(slug))
            .select(count_star())
            .first(conn)
            .map_err(TenantError::DatabaseError)?;
        Ok(count > 0)
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = tenants)]
pub struct NewTenant {
    pub uuid: Uuid,
    pub slug: String,
    pub name: String,
    pub plan: String,
    pub status: String,
    pub settings: serde_json::Value,
    pub metadata: serde_json::Value,
}

impl NewTenant {
    pub fn insert(&self, conn: &mut PgConnection) -> Result<Tenant, TenantError> {
        diesel::insert_into(tenants::table)
            .values(self)
            .get_result(conn)
            .map_err(TenantError::DatabaseError)
    }
}
