use crate::models::schema::documents;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_INDEXED: &str = "INDEXED";
pub const STATUS_FAILED: &str = "FAILED";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub title: String,
    pub content: String,
    pub vector_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn get_by_uuid_and_tenant(
        conn: &mut PgConnection,
        document_uuid: Uuid,
        lookup_tenant_id: i32,
    ) -> Result<Option<Document>, DocumentError> {
        documents::table
            .filter(documents::uuid.eq(document_uuid))
            .filter(documents::tenant_id.eq(lookup_tenant_id))
            .first::<Document>(conn)
            .optional()
            .map_err(DocumentError::DatabaseError)
    }

    pub fn mark_indexed(
        conn: &mut PgConnection,
        document_id: i64,
        vector_id: &str,
    ) -> Result<(), DocumentError> {
        diesel::update(documents::table.filter(documents::id.eq(document_id)))
            .set((
                documents::status.eq(STATUS_INDEXED),
                documents::vector_id.eq(vector_id),
                documents::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .map(|_| ())
            .map_err(DocumentError::DatabaseError)
    }

    pub fn mark_failed(conn: &mut PgConnection, document_id: i64) -> Result<(), DocumentError> {
        diesel::update(documents::table.filter(documents::id.eq(document_id)))
            .set((
                documents::status.eq(STATUS_FAILED),
                documents::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .map(|_| ())
            .map_err(DocumentError::DatabaseError)
    }

    pub fn delete_by_uuid_and_tenant(
        conn: &mut PgConnection,
        document_uuid: Uuid,
        lookup_tenant_id: i32,
    ) -> Result<bool, DocumentError> {
        let affected = diesel::delete(
            documents::table
                .filter(documents::uuid.eq(document_uuid))
                .filter(documents::tenant_id.eq(lookup_tenant_id)),
        )
        .execute(conn)
        .map_err(DocumentError::DatabaseError)?;
        Ok(affected > 0)
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub title: String,
    pub content: String,
    pub vector_id: Option<String>,
    pub status: String,
}

impl NewDocument {
    pub fn insert(&self, conn: &mut PgConnection) -> Result<Document, DocumentError> {
        diesel::insert_into(documents::table)
            .values(self)
            .get_result(conn)
            .map_err(DocumentError::DatabaseError)
    }
}
