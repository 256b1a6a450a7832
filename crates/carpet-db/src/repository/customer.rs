//! # Customer Repository
//!
//! Database operations for customers. Email is unique across the table.

use carpet_core::validation::validate_new_customer;
use carpet_core::{Customer, NewCustomer};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str = r#"
    id, name, email, phone, address, city, location,
    tax_number, credit_limit_cents, payment_terms, created_by, created_at
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a customer, assigning its id and creation time.
    ///
    /// ## Errors
    /// - [`DbError::Validation`] for a blank name, malformed email, etc.
    /// - [`DbError::UniqueViolation`] when the email is already taken
    pub async fn create(&self, customer: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(customer)?;

        let created = Customer {
            id: Uuid::new_v4().to_string(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            city: customer.city.clone(),
            location: customer.location.clone(),
            tax_number: customer.tax_number.clone(),
            credit_limit_cents: customer.credit_limit_cents,
            payment_terms: customer.payment_terms.clone(),
            created_by: customer.created_by.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %created.id, email = %created.email, "Creating customer");

        sqlx::query(&format!(
            "INSERT INTO customers ({CUSTOMER_COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ))
        .bind(&created.id)
        .bind(&created.name)
        .bind(&created.email)
        .bind(&created.phone)
        .bind(&created.address)
        .bind(&created.city)
        .bind(&created.location)
        .bind(&created.tax_number)
        .bind(created.credit_limit_cents)
        .bind(&created.payment_terms)
        .bind(&created.created_by)
        .bind(created.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field == "email" => {
                DbError::duplicate("email", &customer.email)
            }
            other => other,
        })?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
