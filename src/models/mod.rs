pub mod conversations;
pub mod documents;
pub mod personalities;
pub mod schema;
pub mod tenants;
pub mod usage_counters;
pub mod users;
