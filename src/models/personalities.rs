use crate::models::schema::personalities;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PersonalityError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Personality not found")]
    NotFound,
    #[error("Cannot delete the active personality")]
    LastActive,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = personalities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Personality {
    pub id: i32,
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub tone: String,
    pub style: String,
    pub expertise: Vec<String>,
    pub philosophy: serde_json::Value,
    pub core_values: serde_json::Value,
    pub brand_voice: Option<String>,
    pub custom_prompt: Option<String>,
    pub response_length: String,
    pub language: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Personality {
    pub fn get_active(
        conn: &mut PgConnection,
        lookup_tenant_id: i32,
    ) -> Result<Option<Personality>, PersonalityError> {
        personalities::table
            .filter(personalities::tenant_id.eq(lookup_tenant_id))
            .filter(personalities::is_active.eq(true))
            .first::<Personality>(conn)
            .optional()
            .map_err(PersonalityError::DatabaseError)
    }

    pub fn list_for_tenant(
        conn: &mut PgConnection,
        lookup_tenant_id: i32,
    ) -> Result<Vec<Personality>, PersonalityError> {
        personalities::table
            .filter(personalities::tenant_id.eq(lookup_tenant_id))
            .order(personalities::created_at.desc())
            .load::<Personality>(conn)
            .map_err(PersonalityError::DatabaseError)
    }

    pub fn get_by_uuid_and_tenant(
        conn: &mut PgConnection,
        personality_uuid: Uuid,
        lookup_tenant_id: i32,
    ) -> Result<Option<Personality>, PersonalityError> {
        personalities::table
            .filter(personalities::uuid.eq(personality_uuid))
            .filter(personalities::tenant_id.eq(lookup_tenant_id))
            .first::<Personality>(conn)
            .optional()
            .map_err(PersonalityError::DatabaseError)
    }

    /// Activate one personality and deactivate its siblings in the same
    /// transaction, preserving the at-most-one-active invariant.
    pub fn activate(
        conn: &mut PgConnection,
        personality_uuid: Uuid,
        lookup_tenant_id: i32,
    ) -> Result<Personality, PersonalityError> {
        conn.transaction(|conn| {
            let target = Self::get_by_uuid_and_tenant(conn, personality_uuid, lookup_tenant_id)?
                .ok_or(PersonalityError::NotFound)?;

            diesel::update(
                personalities::table.filter(personalities::tenant_id.eq(lookup_tenant_id)),
            )
            .set(personalities::is_active.eq(false))
            .execute(conn)?;

            diesel::update(personalities::table.filter(personalities::id.eq(target.id)))
                .set((
                    personalities::is_active.eq(true),
                    personalities::updated_at.eq(diesel::dsl::now),
                ))
                .get_result(conn)
                .map_err(PersonalityError::DatabaseError)
        })
    }

    /// Deleting the active personality is rejected; a tenant must always keep
    /// one active profile. Inactive profiles can be removed freely.
    pub fn delete(
        conn: &mut PgConnection,
        personality_uuid: Uuid,
        lookup_tenant_id: i32,
    ) -> Result<(), PersonalityError> {
        conn.transaction(|conn| {
            let target = Self::get_by_uuid_and_tenant(conn, personality_uuid, lookup_tenant_id)?
                .ok_or(PersonalityError::NotFound)?;

            if target.is_active {
                return Err(PersonalityError::LastActive);
            }

            diesel::delete(personalities::table.filter(personalities::id.eq(target.id)))
                .execute(conn)?;
            Ok(())
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = personalities)]
pub struct NewPersonality {
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub tone: String,
    pub style: String,
    pub expertise: Vec<String>,
    pub philosophy: serde_json::Value,
    pub core_values: serde_json::Value,
    pub brand_voice: Option<String>,
    pub custom_prompt: Option<String>,
    pub response_length: String,
    pub language: String,
    pub is_active: bool,
}

impl NewPersonality {
    /// Insert as the tenant's active personality, deactivating any sibling in
    /// the same transaction.
    pub fn insert_as_active(
        &self,
        conn: &mut PgConnection,
    ) -> Result<Personality, PersonalityError> {
        conn.transaction(|conn| {
            diesel::update(
                personalities::table.filter(personalities::tenant_id.eq(self.tenant_id)),
            )
            .set(personalities::is_active.eq(false))
            .execute(conn)?;

            diesel::insert_into(personalities::table)
                .values(self)
                .get_result(conn)
                .map_err(PersonalityError::DatabaseError)
        })
    }
}
