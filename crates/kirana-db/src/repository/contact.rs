//! # Contact Repository
//!
//! Customer contacts, one per mobile number.
//!
//! Writes are insert-if-absent: the first name recorded for a number stays,
//! later bills for the same number return the existing contact untouched.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kirana_core::validation::{validate_list_limit, validate_mobile_number, validate_person_name};
use kirana_core::{Contact, ContactUpsert};

/// Repository for the contact directory.
#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    /// Creates a new ContactRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContactRepository { pool }
    }

    /// Records a contact unless one exists for the number.
    ///
    /// ## Errors
    /// - `Validation` when the name is empty or the number is not 10 digits
    pub async fn upsert_if_absent(&self, name: &str, mobile_number: &str) -> DbResult<ContactUpsert> {
        let mut conn = self.pool.acquire().await?;
        Self::upsert_if_absent_in(&mut conn, name, mobile_number, Utc::now()).await
    }

    /// Insert-if-absent on an existing connection, transaction or savepoint.
    pub async fn upsert_if_absent_in(
        conn: &mut SqliteConnection,
        name: &str,
        mobile_number: &str,
        now: DateTime<Utc>,
    ) -> DbResult<ContactUpsert> {
        validate_person_name("name", name)?;
        validate_mobile_number(mobile_number)?;
        let name = name.trim();
        let mobile_number = mobile_number.trim();

        let inserted = sqlx::query(
            r#"
            INSERT INTO contacts (mobile_number, name, last_used)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (mobile_number) DO NOTHING
            "#,
        )
        .bind(mobile_number)
        .bind(name)
        .bind(now)
        .execute(&mut *conn)
        .await?
        .rows_affected()
            == 1;

        let contact = sqlx::query_as::<_, Contact>(
            "SELECT name, mobile_number, last_used FROM contacts WHERE mobile_number = ?1",
        )
        .bind(mobile_number)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Contact", mobile_number))?;

        debug!(mobile_number, created = inserted, "Contact recorded");
        Ok(ContactUpsert {
            created: inserted,
            contact,
        })
    }

    /// Gets a contact by mobile number.
    pub async fn get(&self, mobile_number: &str) -> DbResult<Option<Contact>> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT name, mobile_number, last_used FROM contacts WHERE mobile_number = ?1",
        )
        .bind(mobile_number.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Lists contacts, most recently used first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Contact>> {
        let limit = validate_list_limit(limit)?;

        let contacts = sqlx::query_as::<_, Contact>(
            r#"
            SELECT name, mobile_number, last_used
            FROM contacts
            ORDER BY last_used DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use kirana_core::{CoreError, ValidationError};

    #[tokio::test]
    async fn test_insert_if_absent_keeps_first_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let contacts = db.contacts();

        let first = contacts.upsert_if_absent(" Ravi ", "9876543210").await.unwrap();
        assert!(first.created);
        assert_eq!(first.contact.name, "Ravi");

        let again = contacts.upsert_if_absent("Ravi Kumar", "9876543210").await.unwrap();
        assert!(!again.created);
        assert_eq!(again.contact.name, "Ravi");
        assert_eq!(again.contact.last_used, first.contact.last_used);
    }

    #[tokio::test]
    async fn test_rejects_bad_mobile_number() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.contacts().upsert_if_absent("Ravi", "98765").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
        assert!(db.contacts().get("98765").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recent_orders_by_last_used() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let mut conn = db.pool().acquire().await.unwrap();
        for (offset, (name, mobile)) in [("Old", "9000000001"), ("Mid", "9000000002"), ("New", "9000000003")]
            .into_iter()
            .enumerate()
        {
            let at = now - Duration::minutes(10 - offset as i64);
            ContactRepository::upsert_if_absent_in(&mut conn, name, mobile, at)
                .await
                .unwrap();
        }
        drop(conn);

        let names: Vec<String> = db
            .contacts()
            .recent(2)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["New".to_string(), "Mid".to_string()]);

        assert!(db.contacts().recent(101).await.is_err());
    }
}
