//! # Contact Commands
//!
//! Customer directory. Creation is insert-if-absent: posting a known
//! mobile number answers 200 with `created: false` and leaves the stored
//! name as it was.

use tracing::debug;

use kirana_core::{Contact, ContactUpsert, NewContact};

use crate::commands::ApiResponse;
use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Records a contact unless the mobile number is already known.
pub async fn create_contact(
    db: &DbState,
    request: NewContact,
) -> Result<ApiResponse<ContactUpsert>, ApiError> {
    debug!("create_contact command");

    let (name, mobile_number) = request.validate()?;
    let upsert = db
        .inner()
        .contacts()
        .upsert_if_absent(&name, &mobile_number)
        .await?;

    if upsert.created {
        Ok(ApiResponse::created(upsert))
    } else {
        Ok(ApiResponse::ok(upsert))
    }
}

/// Lists contacts, most recently used first.
pub async fn list_contacts(
    db: &DbState,
    config: &ConfigState,
    limit: Option<u32>,
) -> Result<ApiResponse<Vec<Contact>>, ApiError> {
    let limit = limit.unwrap_or(config.contact_limit);
    debug!(limit, "list_contacts command");

    let contacts = db.inner().contacts().recent(limit).await?;
    Ok(ApiResponse::ok(contacts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::bill::create_bill;
    use crate::commands::test_support::{db_state, stocked};
    use crate::error::ErrorType;
    use kirana_core::{BillLineRequest, CreateBillRequest};

    fn contact(name: &str, mobile: &str) -> NewContact {
        NewContact {
            name: Some(name.to_string()),
            mobile_number: Some(mobile.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_contact_is_idempotent() {
        let db = db_state().await;

        let first = create_contact(&db, contact("  Meena ", "9000000001")).await.unwrap();
        assert_eq!(first.status, 201);
        assert!(first.body.created);
        assert_eq!(first.body.contact.name, "Meena");

        let second = create_contact(&db, contact("Someone Else", "9000000001"))
            .await
            .unwrap();
        assert_eq!(second.status, 200);
        assert!(!second.body.created);
        assert_eq!(second.body.contact.name, "Meena");
    }

    #[tokio::test]
    async fn test_create_contact_validation() {
        let db = db_state().await;

        let err = create_contact(&db, contact("", "9000000001")).await.unwrap_err();
        assert_eq!(err.error_type, ErrorType::ValidationError);

        let err = create_contact(&db, contact("Meena", "90000")).await.unwrap_err();
        assert_eq!(err.status, 400);
    }

    #[tokio::test]
    async fn test_billing_records_contact() {
        let db = db_state().await;
        let chips = stocked(&db, "Chips", 10, 5).await;

        create_bill(
            &db,
            CreateBillRequest {
                customer_name: Some("Ravi".to_string()),
                mobile_number: Some("9876543210".to_string()),
                items: vec![BillLineRequest::new(chips.id, 1)],
            },
        )
        .await
        .unwrap();

        let contacts = list_contacts(&db, &ConfigState::default(), None)
            .await
            .unwrap()
            .into_body();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].mobile_number, "9876543210");
    }

    #[tokio::test]
    async fn test_list_contacts_limit_bounds() {
        let db = db_state().await;
        for i in 0..3 {
            create_contact(&db, contact("Customer", &format!("900000000{}", i)))
                .await
                .unwrap();
        }

        let config = ConfigState::default();
        let two = list_contacts(&db, &config, Some(2)).await.unwrap().into_body();
        assert_eq!(two.len(), 2);

        let err = list_contacts(&db, &config, Some(101)).await.unwrap_err();
        assert_eq!(err.status, 400);
    }
}
