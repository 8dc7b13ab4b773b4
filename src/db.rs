//! Storage seam.
//!
//! Handlers and the RAG pipeline talk to `DBConnection` instead of Diesel
//! directly; production wires in the Postgres-backed implementation, tests an
//! in-memory fake.

use crate::models::conversations::{Conversation, ConversationError, Message, NewConversation};
use crate::models::documents::{Document, DocumentError, NewDocument};
use crate::models::personalities::{NewPersonality, Personality, PersonalityError};
use crate::models::tenants::{NewTenant, Tenant, TenantError};
use crate::models::usage_counters::{UsageCounter, UsageCounterError};
use crate::models::users::{NewUser, User, UserError, ROLE_OWNER};
use crate::plans::MetricType;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use thiserror::Error;
use uuid::Uuid;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Error, Debug)]
pub enum DBError {
    #[error("Database error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    Pool(String),
    #[error("Resource not found")]
    NotFound,
    #[error("Cannot delete the active personality")]
    ActivePersonalityDelete,
}

impl From<TenantError> for DBError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::DatabaseError(e) => DBError::Query(e),
        }
    }
}

impl From<UserError> for DBError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DatabaseError(e) => DBError::Query(e),
        }
    }
}

impl From<PersonalityError> for DBError {
    fn from(err: PersonalityError) -> Self {
        match err {
            PersonalityError::DatabaseError(e) => DBError::Query(e),
            PersonalityError::NotFound => DBError::NotFound,
            PersonalityError::LastActive => DBError::ActivePersonalityDelete,
        }
    }
}

impl From<ConversationError> for DBError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::DatabaseError(e) => DBError::Query(e),
        }
    }
}

impl From<UsageCounterError> for DBError {
    fn from(err: UsageCounterError) -> Self {
        match err {
            UsageCounterError::DatabaseError(e) => DBError::Query(e),
        }
    }
}

impl From<DocumentError> for DBError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::DatabaseError(e) => DBError::Query(e),
        }
    }
}

pub trait DBConnection: Send + Sync {
    fn ping(&self) -> Result<(), DBError>;

    fn get_tenant_by_uuid(&self, tenant_uuid: Uuid) -> Result<Option<Tenant>, DBError>;
    fn get_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DBError>;
    fn slug_exists(&self, slug: &str) -> Result<bool, DBError>;
    fn create_tenant(
        &self,
        new_tenant: NewTenant,
        owner_email: String,
        owner_name: Option<String>,
    ) -> Result<Tenant, DBError>;

    fn get_active_user(&self, user_uuid: Uuid, tenant_id: i32) -> Result<Option<User>, DBError>;

    fn get_active_personality(&self, tenant_id: i32) -> Result<Option<Personality>, DBError>;
    fn list_personalities(&self, tenant_id: i32) -> Result<Vec<Personality>, DBError>;
    fn create_personality(&self, new: NewPersonality) -> Result<Personality, DBError>;
    fn activate_personality(
        &self,
        personality_uuid: Uuid,
        tenant_id: i32,
    ) -> Result<Personality, DBError>;
    fn delete_personality(&self, personality_uuid: Uuid, tenant_id: i32) -> Result<(), DBError>;

    fn usage_count(
        &self,
        tenant_id: i32,
        day: NaiveDate,
        metric: MetricType,
    ) -> Result<i64, DBError>;
    fn add_usage(
        &self,
        tenant_id: i32,
        day: NaiveDate,
        metric: MetricType,
        amount: i64,
    ) -> Result<i64, DBError>;
    fn usage_since(&self, tenant_id: i32, since: NaiveDate) -> Result<Vec<UsageCounter>, DBError>;

    fn get_conversation_by_uuid(
        &self,
        conversation_uuid: Uuid,
    ) -> Result<Option<Conversation>, DBError>;
    fn create_conversation(&self, new: NewConversation) -> Result<Conversation, DBError>;
    fn close_conversation(&self, conversation_id: i64) -> Result<(), DBError>;
    fn append_message_pair(
        &self,
        conversation_id: i64,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(Message, Message), DBError>;
    fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, DBError>;

    fn create_document(&self, new: NewDocument) -> Result<Document, DBError>;
    fn get_document(
        &self,
        document_uuid: Uuid,
        tenant_id: i32,
    ) -> Result<Option<Document>, DBError>;
    fn mark_document_indexed(&self, document_id: i64, vector_id: &str) -> Result<(), DBError>;
    fn mark_document_failed(&self, document_id: i64) -> Result<(), DBError>;
    fn delete_document(&self, document_uuid: Uuid, tenant_id: i32) -> Result<bool, DBError>;
}

pub struct PostgresConnection {
    pool: PgPool,
}

impl PostgresConnection {
    pub fn new(database_url: &str) -> Result<Self, DBError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .build(manager)
            .map_err(|e| DBError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, DBError> {
        self.pool.get().map_err(|e| DBError::Pool(e.to_string()))
    }
}

impl DBConnection for PostgresConnection {
    fn ping(&self) -> Result<(), DBError> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    fn get_tenant_by_uuid(&self, tenant_uuid: Uuid) -> Result<Option<Tenant>, DBError> {
        let mut conn = self.conn()?;
        Tenant::get_by_uuid(&mut conn, tenant_uuid).map_err(DBError::from)
    }

    fn get_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DBError> {
        let mut conn = self.conn()?;
        Tenant::get_by_slug(&mut conn, slug).map_err(DBError::from)
    }

    fn slug_exists(&self, slug: &str) -> Result<bool, DBError> {
        let mut conn = self.conn()?;
        Tenant::slug_exists(&mut conn, slug).map_err(DBError::from)
    }

    fn create_tenant(
        &self,
        new_tenant: NewTenant,
        owner_email: String,
        owner_name: Option<String>,
    ) -> Result<Tenant, DBError> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let tenant = new_tenant.insert(conn).map_err(DBError::from)?;
            NewUser {
                uuid: Uuid::new_v4(),
                tenant_id: tenant.id,
                email: owner_email,
                name: owner_name,
                role: ROLE_OWNER.to_string(),
                status: "ACTIVE".to_string(),
            }
            .insert(conn)
            .map_err(DBError::from)?;
            Ok(tenant)
        })
    }

    fn get_active_user(&self, user_uuid: Uuid, tenant_id: i32) -> Result<Option<User>, DBError> {
        let mut conn = self.conn()?;
        User::get_active_in_tenant(&mut conn, user_uuid, tenant_id).map_err(DBError::from)
    }

    fn get_active_personality(&self, tenant_id: i32) -> Result<Option<Personality>, DBError> {
        let mut conn = self.conn()?;
        Personality::get_active(&mut conn, tenant_id).map_err(DBError::from)
    }

    fn list_personalities(&self, tenant_id: i32) -> Result<Vec<Personality>, DBError> {
        let mut conn = self.conn()?;
        Personality::list_for_tenant(&mut conn, tenant_id).map_err(DBError::from)
    }

    fn create_personality(&self, new: NewPersonality) -> Result<Personality, DBError> {
        let mut conn = self.conn()?;
        new.insert_as_active(&mut conn).map_err(DBError::from)
    }

    fn activate_personality(
        &self,
        personality_uuid: Uuid,
        tenant_id: i32,
    ) -> Result<Personality, DBError> {
        let mut conn = self.conn()?;
        Personality::activate(&mut conn, personality_uuid, tenant_id).map_err(DBError::from)
    }

    fn delete_personality(&self, personality_uuid: Uuid, tenant_id: i32) -> Result<(), DBError> {
        let mut conn = self.conn()?;
        Personality::delete(&mut conn, personality_uuid, tenant_id).map_err(DBError::from)
    }

    fn usage_count(
        &self,
        tenant_id: i32,
        day: NaiveDate,
        metric: MetricType,
    ) -> Result<i64, DBError> {
        let mut conn = self.conn()?;
        UsageCounter::get_count(&mut conn, tenant_id, day, metric).map_err(DBError::from)
    }

    fn add_usage(
        &self,
        tenant_id: i32,
        day: NaiveDate,
        metric: MetricType,
        amount: i64,
    ) -> Result<i64, DBError> {
        let mut conn = self.conn()?;
        UsageCounter::add(&mut conn, tenant_id, day, metric, amount).map_err(DBError::from)
    }

    fn usage_since(&self, tenant_id: i32, since: NaiveDate) -> Result<Vec<UsageCounter>, DBError> {
        let mut conn = self.conn()?;
        UsageCounter::list_since(&mut conn, tenant_id, since).map_err(DBError::from)
    }

    fn get_conversation_by_uuid(
        &self,
        conversation_uuid: Uuid,
    ) -> Result<Option<Conversation>, DBError> {
        let mut conn = self.conn()?;
        Conversation::get_by_uuid(&mut conn, conversation_uuid).map_err(DBError::from)
    }

    fn create_conversation(&self, new: NewConversation) -> Result<Conversation, DBError> {
        let mut conn = self.conn()?;
        new.insert(&mut conn).map_err(DBError::from)
    }

    fn close_conversation(&self, conversation_id: i64) -> Result<(), DBError> {
        let mut conn = self.conn()?;
        Conversation::close(&mut conn, conversation_id).map_err(DBError::from)
    }

    fn append_message_pair(
        &self,
        conversation_id: i64,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<(Message, Message), DBError> {
        let mut conn = self.conn()?;
        Message::append_pair(&mut conn, conversation_id, user_text, assistant_text)
            .map_err(DBError::from)
    }

    fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, DBError> {
        let mut conn = self.conn()?;
        Message::list_for_conversation(&mut conn, conversation_id).map_err(DBError::from)
    }

    fn create_document(&self, new: NewDocument) -> Result<Document, DBError> {
        let mut conn = self.conn()?;
        new.insert(&mut conn).map_err(DBError::from)
    }

    fn get_document(
        &self,
        document_uuid: Uuid,
        tenant_id: i32,
    ) -> Result<Option<Document>, DBError> {
        let mut conn = self.conn()?;
        Document::get_by_uuid_and_tenant(&mut conn, document_uuid, tenant_id).map_err(DBError::from)
    }

    fn mark_document_indexed(&self, document_id: i64, vector_id: &str) -> Result<(), DBError> {
        let mut conn = self.conn()?;
        Document::mark_indexed(&mut conn, document_id, vector_id).map_err(DBError::from)
    }

    fn mark_document_failed(&self, document_id: i64) -> Result<(), DBError> {
        let mut conn = self.conn()?;
        Document::mark_failed(&mut conn, document_id).map_err(DBError::from)
    }

    fn delete_document(&self, document_uuid: Uuid, tenant_id: i32) -> Result<bool, DBError> {
        let mut conn = self.conn()?;
        Document::delete_by_uuid_and_tenant(&mut conn, document_uuid, tenant_id)
            .map_err(DBError::from)
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory `DBConnection` used by pipeline and gate tests.

    use super::*;
    use crate::models::documents::{STATUS_FAILED, STATUS_INDEXED};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeDb {
        pub tenants: Mutex<Vec<Tenant>>,
        pub users: Mutex<Vec<User>>,
        pub personalities: Mutex<Vec<Personality>>,
        pub conversations: Mutex<Vec<Conversation>>,
        pub messages: Mutex<Vec<Message>>,
        pub usage: Mutex<HashMap<(i32, NaiveDate, String), i64>>,
        pub documents: Mutex<Vec<Document>>,
        next_id: AtomicI64,
        /// When set, message writes fail, simulating a persistence outage.
        pub fail_message_writes: AtomicBool,
    }

    impl FakeDb {
        pub fn new() -> Self {
            Self::default()
        }

        fn next_id(&self) -> i64 {
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        }

        pub fn insert_tenant(&self, slug: &str, plan: &str, status: &str) -> Tenant {
            let now = Utc::now();
            let tenant = Tenant {
                id: self.next_id() as i32,
                uuid: Uuid::new_v4(),
                slug: slug.to_string(),
                name: format!("{slug} Inc"),
                plan: plan.to_string(),
                status: status.to_string(),
                settings: serde_json::json!({}),
                metadata: serde_json::json!({}),
                created_at: now,
                updated_at: now,
            };
            self.tenants.lock().unwrap().push(tenant.clone());
            tenant
        }

        pub fn seed_usage(&self, tenant_id: i32, day: NaiveDate, metric: MetricType, count: i64) {
            self.usage
                .lock()
                .unwrap()
                .insert((tenant_id, day, metric.as_str().to_string()), count);
        }

        pub fn insert_conversation(
            &self,
            tenant_id: i32,
            user_id: Option<Uuid>,
            status: &str,
        ) -> Conversation {
            let now = Utc::now();
            let conversation = Conversation {
                id: self.next_id(),
                uuid: Uuid::new_v4(),
                tenant_id,
                user_id,
                title: None,
                status: status.to_string(),
                created_at: now,
                updated_at: now,
            };
            self.conversations.lock().unwrap().push(conversation.clone());
            conversation
        }

        pub fn insert_user(&self, tenant_id: i32, status: &str) -> User {
            let now = Utc::now();
            let id = self.next_id() as i32;
            let user = User {
                id,
                uuid: Uuid::new_v4(),
                tenant_id,
                email: format!("user{id}@example.com"),
                name: None,
                role: ROLE_OWNER.to_string(),
                status: status.to_string(),
                created_at: now,
                updated_at: now,
            };
            self.users.lock().unwrap().push(user.clone());
            user
        }

        pub fn messages_for(&self, conversation_id: i64) -> Vec<Message> {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.conversation_id == conversation_id)
                .cloned()
                .collect()
        }
    }

    impl DBConnection for FakeDb {
        fn ping(&self) -> Result<(), DBError> {
            Ok(())
        }

        fn get_tenant_by_uuid(&self, tenant_uuid: Uuid) -> Result<Option<Tenant>, DBError> {
            Ok(self
                .tenants
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.uuid == tenant_uuid)
                .cloned())
        }

        fn get_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DBError> {
            Ok(self
                .tenants
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.slug == slug)
                .cloned())
        }

        fn slug_exists(&self, slug: &str) -> Result<bool, DBError> {
            Ok(self.tenants.lock().unwrap().iter().any(|t| t.slug == slug))
        }

        fn create_tenant(
            &self,
            new_tenant: NewTenant,
            owner_email: String,
            owner_name: Option<String>,
        ) -> Result<Tenant, DBError> {
            let now = Utc::now();
            let tenant = Tenant {
                id: self.next_id() as i32,
                uuid: new_tenant.uuid,
                slug: new_tenant.slug,
                name: new_tenant.name,
                plan: new_tenant.plan,
                status: new_tenant.status,
                settings: new_tenant.settings,
                metadata: new_tenant.metadata,
                created_at: now,
                updated_at: now,
            };
            self.tenants.lock().unwrap().push(tenant.clone());
            self.users.lock().unwrap().push(User {
                id: self.next_id() as i32,
                uuid: Uuid::new_v4(),
                tenant_id: tenant.id,
                email: owner_email,
                name: owner_name,
                role: ROLE_OWNER.to_string(),
                status: "ACTIVE".to_string(),
                created_at: now,
                updated_at: now,
            });
            Ok(tenant)
        }

        fn get_active_user(
            &self,
            user_uuid: Uuid,
            tenant_id: i32,
        ) -> Result<Option<User>, DBError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.uuid == user_uuid && u.tenant_id == tenant_id && u.status == "ACTIVE")
                .cloned())
        }

        fn get_active_personality(&self, tenant_id: i32) -> Result<Option<Personality>, DBError> {
            Ok(self
                .personalities
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.tenant_id == tenant_id && p.is_active)
                .cloned())
        }

        fn list_personalities(&self, tenant_id: i32) -> Result<Vec<Personality>, DBError> {
            let mut list: Vec<Personality> = self
                .personalities
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.tenant_id == tenant_id)
                .cloned()
                .collect();
            list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(list)
        }

        fn create_personality(&self, new: NewPersonality) -> Result<Personality, DBError> {
            let now = Utc::now();
            let mut personalities = self.personalities.lock().unwrap();
            for sibling in personalities
                .iter_mut()
                .filter(|p| p.tenant_id == new.tenant_id)
            {
                sibling.is_active = false;
            }
            let personality = Personality {
                id: self.next_id() as i32,
                uuid: new.uuid,
                tenant_id: new.tenant_id,
                name: new.name,
                description: new.description,
                tone: new.tone,
                style: new.style,
                expertise: new.expertise,
                philosophy: new.philosophy,
                core_values: new.core_values,
                brand_voice: new.brand_voice,
                custom_prompt: new.custom_prompt,
                response_length: new.response_length,
                language: new.language,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            personalities.push(personality.clone());
            Ok(personality)
        }

        fn activate_personality(
            &self,
            personality_uuid: Uuid,
            tenant_id: i32,
        ) -> Result<Personality, DBError> {
            let mut personalities = self.personalities.lock().unwrap();
            if !personalities
                .iter()
                .any(|p| p.uuid == personality_uuid && p.tenant_id == tenant_id)
            {
                return Err(DBError::NotFound);
            }
            let mut activated = None;
            for p in personalities.iter_mut().filter(|p| p.tenant_id == tenant_id) {
                p.is_active = p.uuid == personality_uuid;
                if p.is_active {
                    activated = Some(p.clone());
                }
            }
            activated.ok_or(DBError::NotFound)
        }

        fn delete_personality(
            &self,
            personality_uuid: Uuid,
            tenant_id: i32,
        ) -> Result<(), DBError> {
            let mut personalities = self.personalities.lock().unwrap();
            let target = personalities
                .iter()
                .find(|p| p.uuid == personality_uuid && p.tenant_id == tenant_id)
                .cloned()
                .ok_or(DBError::NotFound)?;
            if target.is_active {
                return Err(DBError::ActivePersonalityDelete);
            }
            personalities.retain(|p| p.uuid != personality_uuid);
            Ok(())
        }

        fn usage_count(
            &self,
            tenant_id: i32,
            day: NaiveDate,
            metric: MetricType,
        ) -> Result<i64, DBError> {
            Ok(*self
                .usage
                .lock()
                .unwrap()
                .get(&(tenant_id, day, metric.as_str().to_string()))
                .unwrap_or(&0))
        }

        fn add_usage(
            &self,
            tenant_id: i32,
            day: NaiveDate,
            metric: MetricType,
            amount: i64,
        ) -> Result<i64, DBError> {
            let mut usage = self.usage.lock().unwrap();
            let entry = usage
                .entry((tenant_id, day, metric.as_str().to_string()))
                .or_insert(0);
            *entry += amount;
            Ok(*entry)
        }

        fn usage_since(
            &self,
            tenant_id: i32,
            since: NaiveDate,
        ) -> Result<Vec<UsageCounter>, DBError> {
            let now = Utc::now();
            let mut rows: Vec<UsageCounter> = self
                .usage
                .lock()
                .unwrap()
                .iter()
                .filter(|((tid, day, _), _)| *tid == tenant_id && *day >= since)
                .map(|((tid, day, metric), count)| UsageCounter {
                    id: 0,
                    tenant_id: *tid,
                    day: *day,
                    metric: metric.clone(),
                    count: *count,
                    created_at: now,
                    updated_at: now,
                })
                .collect();
            rows.sort_by(|a, b| b.day.cmp(&a.day));
            Ok(rows)
        }

        fn get_conversation_by_uuid(
            &self,
            conversation_uuid: Uuid,
        ) -> Result<Option<Conversation>, DBError> {
            Ok(self
                .conversations
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.uuid == conversation_uuid)
                .cloned())
        }

        fn create_conversation(&self, new: NewConversation) -> Result<Conversation, DBError> {
            let now = Utc::now();
            let conversation = Conversation {
                id: self.next_id(),
                uuid: new.uuid,
                tenant_id: new.tenant_id,
                user_id: new.user_id,
                title: new.title,
                status: new.status,
                created_at: now,
                updated_at: now,
            };
            self.conversations.lock().unwrap().push(conversation.clone());
            Ok(conversation)
        }

        fn close_conversation(&self, conversation_id: i64) -> Result<(), DBError> {
            let mut conversations = self.conversations.lock().unwrap();
            let conversation = conversations
                .iter_mut()
                .find(|c| c.id == conversation_id)
                .ok_or(DBError::NotFound)?;
            conversation.status = crate::models::conversations::STATUS_CLOSED.to_string();
            Ok(())
        }

        fn append_message_pair(
            &self,
            conversation_id: i64,
            user_text: &str,
            assistant_text: &str,
        ) -> Result<(Message, Message), DBError> {
            if self.fail_message_writes.load(Ordering::SeqCst) {
                return Err(DBError::Pool("injected write failure".to_string()));
            }
            let now = Utc::now();
            let user_message = Message {
                id: self.next_id(),
                uuid: Uuid::new_v4(),
                conversation_id,
                role: crate::models::conversations::ROLE_USER.to_string(),
                content: user_text.to_string(),
                metadata: None,
                created_at: now,
            };
            let assistant_message = Message {
                id: self.next_id(),
                uuid: Uuid::new_v4(),
                conversation_id,
                role: crate::models::conversations::ROLE_ASSISTANT.to_string(),
                content: assistant_text.to_string(),
                metadata: None,
                created_at: now,
            };
            let mut messages = self.messages.lock().unwrap();
            messages.push(user_message.clone());
            messages.push(assistant_message.clone());
            Ok((user_message, assistant_message))
        }

        fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, DBError> {
            let mut messages: Vec<Message> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.conversation_id == conversation_id)
                .cloned()
                .collect();
            messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(messages)
        }

        fn create_document(&self, new: NewDocument) -> Result<Document, DBError> {
            let now = Utc::now();
            let document = Document {
                id: self.next_id(),
                uuid: new.uuid,
                tenant_id: new.tenant_id,
                title: new.title,
                content: new.content,
                vector_id: new.vector_id,
                status: new.status,
                created_at: now,
                updated_at: now,
            };
            self.documents.lock().unwrap().push(document.clone());
            Ok(document)
        }

        fn get_document(
            &self,
            document_uuid: Uuid,
            tenant_id: i32,
        ) -> Result<Option<Document>, DBError> {
            Ok(self
                .documents
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.uuid == document_uuid && d.tenant_id == tenant_id)
                .cloned())
        }

        fn mark_document_indexed(&self, document_id: i64, vector_id: &str) -> Result<(), DBError> {
            let mut documents = self.documents.lock().unwrap();
            let document = documents
                .iter_mut()
                .find(|d| d.id == document_id)
                .ok_or(DBError::NotFound)?;
            document.status = STATUS_INDEXED.to_string();
            document.vector_id = Some(vector_id.to_string());
            Ok(())
        }

        fn mark_document_failed(&self, document_id: i64) -> Result<(), DBError> {
            let mut documents = self.documents.lock().unwrap();
            let document = documents
                .iter_mut()
                .find(|d| d.id == document_id)
                .ok_or(DBError::NotFound)?;
            document.status = STATUS_FAILED.to_string();
            Ok(())
        }

        fn delete_document(&self, document_uuid: Uuid, tenant_id: i32) -> Result<bool, DBError> {
            let mut documents = self.documents.lock().unwrap();
            let before = documents.len();
            documents.retain(|d| !(d.uuid == document_uuid && d.tenant_id == tenant_id));
            Ok(documents.len() < before)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::personality::pairs_to_json;

        fn draft(tenant_id: i32, name: &str) -> NewPersonality {
            NewPersonality {
                uuid: Uuid::new_v4(),
                tenant_id,
                name: name.to_string(),
                description: None,
                tone: "professional".to_string(),
                style: "balanced".to_string(),
                expertise: vec!["general".to_string()],
                philosophy: pairs_to_json(&[]),
                core_values: pairs_to_json(&[]),
                brand_voice: None,
                custom_prompt: None,
                response_length: "medium".to_string(),
                language: "en".to_string(),
                is_active: true,
            }
        }

        #[test]
        fn creating_a_personality_deactivates_siblings() {
            let db = FakeDb::new();
            let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");

            let first = db.create_personality(draft(tenant.id, "first")).unwrap();
            let second = db.create_personality(draft(tenant.id, "second")).unwrap();

            let active: Vec<Personality> = db
                .list_personalities(tenant.id)
                .unwrap()
                .into_iter()
                .filter(|p| p.is_active)
                .collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].uuid, second.uuid);

            // Reactivating the first flips it back, still exactly one active.
            db.activate_personality(first.uuid, tenant.id).unwrap();
            let active: Vec<Personality> = db
                .list_personalities(tenant.id)
                .unwrap()
                .into_iter()
                .filter(|p| p.is_active)
                .collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].uuid, first.uuid);
        }

        #[test]
        fn deleting_the_active_personality_is_rejected() {
            let db = FakeDb::new();
            let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");
            let inactive = db.create_personality(draft(tenant.id, "old")).unwrap();
            let active = db.create_personality(draft(tenant.id, "current")).unwrap();

            assert!(matches!(
                db.delete_personality(active.uuid, tenant.id).unwrap_err(),
                DBError::ActivePersonalityDelete
            ));
            assert!(db.delete_personality(inactive.uuid, tenant.id).is_ok());
        }

        #[test]
        fn personalities_are_scoped_to_their_tenant() {
            let db = FakeDb::new();
            let tenant_a = db.insert_tenant("acme", "FREE", "ACTIVE");
            let tenant_b = db.insert_tenant("globex", "FREE", "ACTIVE");
            let foreign = db.create_personality(draft(tenant_b.id, "theirs")).unwrap();

            assert!(matches!(
                db.activate_personality(foreign.uuid, tenant_a.id).unwrap_err(),
                DBError::NotFound
            ));
            assert!(db.list_personalities(tenant_a.id).unwrap().is_empty());
        }
    }
}
