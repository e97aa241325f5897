//! In-memory customer store standing in for an external database.

use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbError {
    #[error("customer {0} not found")]
    CustomerNotFound(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub id: u64,
    pub name: String,
    pub balance: f64,
    pub status: String,
    pub card_blocked: bool,
}

impl CustomerRecord {
    pub fn active(id: u64, name: impl Into<String>, balance: f64) -> Self {
        Self {
            id,
            name: name.into(),
            balance,
            status: "active".to_string(),
            card_blocked: false,
        }
    }
}

#[derive(Debug)]
pub struct CustomerDatabase {
    customers: RwLock<Vec<CustomerRecord>>,
}

impl Default for CustomerDatabase {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CustomerDatabase {
    pub fn new(customers: Vec<CustomerRecord>) -> Self {
        Self {
            customers: RwLock::new(customers),
        }
    }

    /// John (123) and Kawya (456), both active with unblocked cards.
    pub fn seeded() -> Self {
        Self::new(vec![
            CustomerRecord::active(123, "John", 123.45),
            CustomerRecord::active(456, "Kawya", 678.90),
        ])
    }

    pub async fn customer_name(&self, id: u64) -> Result<String, DbError> {
        self.customers
            .read()
            .await
            .iter()
            .find(|customer| customer.id == id)
            .map(|customer| customer.name.clone())
            .ok_or(DbError::CustomerNotFound(id))
    }

    /// Pending transactions are not modelled, so `include_pending` does not
    /// change the result.
    pub async fn customer_balance(&self, id: u64, _include_pending: bool) -> Result<f64, DbError> {
        self.customers
            .read()
            .await
            .iter()
            .find(|customer| customer.id == id)
            .map(|customer| customer.balance)
            .ok_or(DbError::CustomerNotFound(id))
    }

    pub async fn block_card(&self, id: u64, _include_pending: bool) -> Result<(), DbError> {
        let mut customers = self.customers.write().await;
        let customer = customers
            .iter_mut()
            .find(|customer| customer.id == id)
            .ok_or(DbError::CustomerNotFound(id))?;

        customer.card_blocked = true;
        tracing::info!(customer_id = id, "card blocked");
        Ok(())
    }

    pub async fn card_blocked(&self, id: u64) -> Result<bool, DbError> {
        self.customers
            .read()
            .await
            .iter()
            .find(|customer| customer.id == id)
            .map(|customer| customer.card_blocked)
            .ok_or(DbError::CustomerNotFound(id))
    }

    pub async fn snapshot(&self) -> Vec<CustomerRecord> {
        self.customers.read().await.clone()
    }

    /// Must not be called from inside an async runtime.
    pub fn blocking_snapshot(&self) -> Vec<CustomerRecord> {
        self.customers.blocking_read().clone()
    }
}
