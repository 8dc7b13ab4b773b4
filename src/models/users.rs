use crate::models::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const ROLE_OWNER: &str = "OWNER";

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Active-user lookup scoped to the tenant supplied by the gateway.
    pub fn get_active_in_tenant(
        conn: &mut PgConnection,
        user_uuid: Uuid,
        tenant_id: i32,
    ) -> Result<Option<User>, UserError> {
        users::table
            .filter(users::uuid.eq(user_uuid))
            .filter(users::tenant_id.eq(tenant_id))
            .filter(users::status.eq("ACTIVE"))
            .first::<User>(conn)
            .optional()
            .map_err(UserError::DatabaseError)
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub status: String,
}

impl NewUser {
    pub fn insert(&self, conn: &mut PgConnection) -> Result<User, UserError> {
        diesel::insert_into(users::table)
            .values(self)
            .get_result(conn)
            .map_err(UserError::DatabaseError)
    }
}
