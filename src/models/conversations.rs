use crate::models::schema::{conversations, messages};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const ROLE_USER: &str = "USER";
pub const ROLE_ASSISTANT: &str = "ASSISTANT";

pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_CLOSED: &str = "CLOSED";

#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Conversation {
    pub id: i64,
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    pub fn get_by_uuid(
        conn: &mut PgConnection,
        conversation_uuid: Uuid,
    ) -> Result<Option<Conversation>, ConversationError> {
        conversations::table
            .filter(conversations::uuid.eq(conversation_uuid))
            .first::<Conversation>(conn)
            .optional()
            .map_err(ConversationError::DatabaseError)
    }

    pub fn close(conn: &mut PgConnection, conversation_id: i64) -> Result<(), ConversationError> {
        diesel::update(conversations::table.filter(conversations::id.eq(conversation_id)))
            .set((
                conversations::status.eq(STATUS_CLOSED),
                conversations::updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .map(|_| ())
            .map_err(ConversationError::DatabaseError)
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = conversations)]
pub struct NewConversation {
    pub uuid: Uuid,
    pub tenant_id: i32,
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub status: String,
}

impl NewConversation {
    pub fn insert(&self, conn: &mut PgConnection) -> Result<Conversation, ConversationError> {
        diesel::insert_into(conversations::table)
            .values(self)
            .get_result(conn)
            .map_err(ConversationError::DatabaseError)
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    pub id: i64,
    pub uuid: Uuid,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Messages ordered by creation time, serial id breaking ties.
    pub fn list_for_conversation(
        conn: &mut PgConnection,
        lookup_conversation_id: i64,
    ) -> Result<Vec<Message>, ConversationError> {
        messages::table
            .filter(messages::conversation_id.eq(lookup_conversation_id))
            .order((messages::created_at.asc(), messages::id.asc()))
            .load::<Message>(conn)
            .map_err(ConversationError::DatabaseError)
    }

    /// Append a user/assistant pair as two ordered rows and bump the
    /// conversation's updated_at, all in one transaction.
    pub fn append_pair(
        conn: &mut PgConnection,
        lookup_conversation_id: i64,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(Message, Message), ConversationError> {
        conn.transaction(|conn| {
            let user_message = NewMessage {
                uuid: Uuid::new_v4(),
                conversation_id: lookup_conversation_id,
                role: ROLE_USER.to_string(),
                content: user_text.to_string(),
                metadata: None,
            }
            .insert(conn)?;

            let assistant_message = NewMessage {
                uuid: Uuid::new_v4(),
                conversation_id: lookup_conversation_id,
                role: ROLE_ASSISTANT.to_string(),
                content: assistant_text.to_string(),
                metadata: None,
            }
            .insert(conn)?;

            diesel::update(
                conversations::table.filter(conversations::id.eq(lookup_conversation_id)),
            )
            .set(conversations::updated_at.eq(diesel::dsl::now))
            .execute(conn)?;

            Ok((user_message, assistant_message))
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub uuid: Uuid,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
}

impl NewMessage {
    pub fn insert(&self, conn: &mut PgConnection) -> Result<Message, ConversationError> {
        diesel::insert_into(messages::table)
            .values(self)
            .get_result(conn)
            .map_err(ConversationError::DatabaseError)
    }
}
