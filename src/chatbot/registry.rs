//! In-memory contact registry.

use std::collections::HashMap;

use tokio::sync::Mutex;

/// How a contact is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Prospect,
    Customer,
}

/// Answer to a classification lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Customer,
    Prospect,
    Unknown,
}

/// A known counterparty, identified by its channel address.
#[derive(Debug, Clone)]
pub struct Contact {
    pub contact_id: i64,
    pub display_name: Option<String>,
    pub kind: ContactKind,
}

#[derive(Default)]
struct RegistryInner {
    /// Records in insertion order.
    contacts: Vec<Contact>,
    /// contact_id -> index into `contacts`. At most one record per id.
    index: HashMap<i64, usize>,
}

/// Owned record of contacts, guarded by a single lock and shared via
/// `Arc`. There is no global registry state; everything goes through an
/// instance of this.
#[derive(Default)]
pub struct ContactRegistry {
    inner: Mutex<RegistryInner>,
}

impl ContactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prospect if the contact is unknown. Re-adding an existing
    /// contact is a no-op and a customer is never downgraded. Returns
    /// whether a record was inserted.
    pub async fn upsert_prospect(&self, contact_id: i64, display_name: Option<String>) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.index.contains_key(&contact_id) {
            return false;
        }
        let idx = inner.contacts.len();
        inner.contacts.push(Contact {
            contact_id,
            display_name,
            kind: ContactKind::Prospect,
        });
        inner.index.insert(contact_id, idx);
        true
    }

    /// Record a contact who identified as a customer, promoting an
    /// existing prospect record in place.
    pub async fn mark_customer(&self, contact_id: i64, display_name: Option<String>) {
        let mut inner = self.inner.lock().await;
        match inner.index.get(&contact_id).copied() {
            Some(idx) => {
                inner.contacts[idx].kind = ContactKind::Customer;
                if inner.contacts[idx].display_name.is_none() {
                    inner.contacts[idx].display_name = display_name;
                }
            }
            None => {
                let idx = inner.contacts.len();
                inner.contacts.push(Contact {
                    contact_id,
                    display_name,
                    kind: ContactKind::Customer,
                });
                inner.index.insert(contact_id, idx);
            }
        }
    }

    pub async fn classify(&self, contact_id: i64) -> Classification {
        let inner = self.inner.lock().await;
        match inner.index.get(&contact_id).map(|&i| inner.contacts[i].kind) {
            Some(ContactKind::Customer) => Classification::Customer,
            Some(ContactKind::Prospect) => Classification::Prospect,
            None => Classification::Unknown,
        }
    }

    /// Snapshot of prospects in insertion order.
    pub async fn list_prospects(&self) -> Vec<Contact> {
        let inner = self.inner.lock().await;
        inner
            .contacts
            .iter()
            .filter(|c| c.kind == ContactKind::Prospect)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_prospect_is_idempotent() {
        let registry = ContactRegistry::new();

        assert!(registry.upsert_prospect(41, Some("Ana".into())).await);
        assert!(!registry.upsert_prospect(41, Some("Ana".into())).await);

        let prospects = registry.list_prospects().await;
        assert_eq!(prospects.len(), 1);
        assert_eq!(prospects[0].contact_id, 41);
        assert_eq!(registry.classify(41).await, Classification::Prospect);
    }

    #[tokio::test]
    async fn test_list_prospects_keeps_insertion_order() {
        let registry = ContactRegistry::new();
        registry.upsert_prospect(3, None).await;
        registry.upsert_prospect(1, None).await;
        registry.upsert_prospect(2, None).await;

        let ids: Vec<i64> = registry
            .list_prospects()
            .await
            .iter()
            .map(|c| c.contact_id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_mark_customer_promotes_prospect() {
        let registry = ContactRegistry::new();
        registry.upsert_prospect(7, Some("Rui".into())).await;
        registry.mark_customer(7, None).await;

        assert_eq!(registry.classify(7).await, Classification::Customer);
        assert!(registry.list_prospects().await.is_empty());

        // A later prospect upsert must not downgrade the customer.
        assert!(!registry.upsert_prospect(7, None).await);
        assert_eq!(registry.classify(7).await, Classification::Customer);
    }

    #[tokio::test]
    async fn test_classify_unknown_contact() {
        let registry = ContactRegistry::new();
        assert_eq!(registry.classify(99).await, Classification::Unknown);
    }
}
