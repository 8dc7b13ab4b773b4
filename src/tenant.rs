//! Tenant resolution from the gateway-injected request signal.

use crate::db::{DBConnection, DBError};
use crate::models::tenants::Tenant;
use thiserror::Error;
use uuid::Uuid;

/// Origin signal extracted from trusted headers. The explicit tenant id wins
/// over the slug when both are present.
#[derive(Debug, Clone, Default)]
pub struct TenantSignal {
    pub tenant_id: Option<Uuid>,
    pub slug: Option<String>,
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Tenant not found")]
    NotFound,
    #[error("Tenant is not active")]
    Inactive,
    #[error(transparent)]
    Db(#[from] DBError),
}

/// Read-only lookup. Suspended and cancelled tenants resolve to `Inactive`,
/// distinct from `NotFound`, so callers can show a billing message instead of
/// a 404.
pub fn resolve(db: &dyn DBConnection, signal: &TenantSignal) -> Result<Tenant, ResolveError> {
    let tenant = if let Some(tenant_id) = signal.tenant_id {
        db.get_tenant_by_uuid(tenant_id)?
    } else if let Some(slug) = signal.slug.as_deref() {
        db.get_tenant_by_slug(slug)?
    } else {
        None
    };

    let tenant = tenant.ok_or(ResolveError::NotFound)?;
    if !tenant.is_active() {
        return Err(ResolveError::Inactive);
    }
    Ok(tenant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::FakeDb;

    #[test]
    fn resolves_by_uuid() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");

        let signal = TenantSignal {
            tenant_id: Some(tenant.uuid),
            slug: None,
        };
        let resolved = resolve(&db, &signal).unwrap();
        assert_eq!(resolved.id, tenant.id);
    }

    #[test]
    fn resolves_by_slug_when_no_id() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("acme", "FREE", "ACTIVE");

        let signal = TenantSignal {
            tenant_id: None,
            slug: Some("acme".to_string()),
        };
        let resolved = resolve(&db, &signal).unwrap();
        assert_eq!(resolved.uuid, tenant.uuid);
    }

    #[test]
    fn explicit_id_wins_over_slug() {
        let db = FakeDb::new();
        let by_id = db.insert_tenant("first", "FREE", "ACTIVE");
        db.insert_tenant("second", "FREE", "ACTIVE");

        let signal = TenantSignal {
            tenant_id: Some(by_id.uuid),
            slug: Some("second".to_string()),
        };
        assert_eq!(resolve(&db, &signal).unwrap().slug, "first");
    }

    #[test]
    fn missing_signal_is_not_found() {
        let db = FakeDb::new();
        db.insert_tenant("acme", "FREE", "ACTIVE");

        let err = resolve(&db, &TenantSignal::default()).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound));
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let db = FakeDb::new();
        let signal = TenantSignal {
            tenant_id: None,
            slug: Some("ghost".to_string()),
        };
        assert!(matches!(
            resolve(&db, &signal).unwrap_err(),
            ResolveError::NotFound
        ));
    }

    #[test]
    fn suspended_tenant_is_inactive_not_missing() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("late-payer", "STARTER", "SUSPENDED");

        let signal = TenantSignal {
            tenant_id: Some(tenant.uuid),
            slug: None,
        };
        assert!(matches!(
            resolve(&db, &signal).unwrap_err(),
            ResolveError::Inactive
        ));
    }

    #[test]
    fn cancelled_tenant_is_inactive() {
        let db = FakeDb::new();
        let tenant = db.insert_tenant("gone", "FREE", "CANCELLED");

        let signal = TenantSignal {
            tenant_id: Some(tenant.uuid),
            slug: None,
        };
        assert!(matches!(
            resolve(&db, &signal).unwrap_err(),
            ResolveError::Inactive
        ));
    }
}
