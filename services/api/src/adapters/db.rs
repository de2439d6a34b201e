//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the catalog and order-store ports from the `core` crate, and of the service's
//! `AccountStore`. It handles all interactions with PostgreSQL using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use painting_order_core::{
    CanvasSize, Identity, Material, NewOrder, Order, OrderStatus, OrderStore, PortError,
    PortResult, PriceBreakdown, StyleCatalogService, StyleRecord,
};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use crate::accounts::{AccountStore, UserCredentials};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter implementing the persistence ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    error!("Database error: {}", e);
    PortError::Unexpected(e.to_string())
}

fn to_db_amount(amount: u64) -> PortResult<i64> {
    i64::try_from(amount)
        .map_err(|_| PortError::Unexpected(format!("amount {} out of range", amount)))
}

fn from_db_amount(amount: i64) -> PortResult<u64> {
    u64::try_from(amount).map_err(|_| PortError::Unexpected(format!("negative amount {}", amount)))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> Identity {
        Identity {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}

#[derive(FromRow)]
struct StyleRow {
    id: Option<String>,
    name: Option<String>,
    name_en: Option<String>,
    description: Option<String>,
    is_active: Option<bool>,
}
impl StyleRow {
    fn to_record(self) -> StyleRecord {
        StyleRecord {
            id: self.id,
            name: self.name,
            name_en: self.name_en,
            description: self.description,
            is_active: self.is_active,
        }
    }
}

#[derive(FromRow)]
struct OrderRecord {
    id: Uuid,
    user_id: Uuid,
    style_id: Option<String>,
    canvas_size: String,
    material: String,
    ai_prompt: Option<String>,
    customer_notes: Option<String>,
    preview_image_url: Option<String>,
    base_price: i64,
    rush_fee: i64,
    total_price: i64,
    is_rush: bool,
    created_at: DateTime<Utc>,
}
impl OrderRecord {
    fn to_domain(self) -> PortResult<Order> {
        let invalid = |e: painting_order_core::WizardError| PortError::Unexpected(e.to_string());
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            style_id: self.style_id,
            canvas_size: self.canvas_size.parse::<CanvasSize>().map_err(invalid)?,
            material: self.material.parse::<Material>().map_err(invalid)?,
            ai_prompt: self.ai_prompt,
            customer_notes: self.customer_notes,
            preview_image_url: self.preview_image_url,
            price: PriceBreakdown {
                base_price: from_db_amount(self.base_price)?,
                rush_fee: from_db_amount(self.rush_fee)?,
                total_price: from_db_amount(self.total_price)?,
            },
            is_rush: self.is_rush,
            status: OrderStatus::Previewed,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl StyleCatalogService for DbAdapter {
    async fn fetch_active_styles(&self) -> PortResult<Vec<StyleRecord>> {
        let rows = sqlx::query_as::<_, StyleRow>(
            "SELECT id, name, name_en, description, is_active FROM painting_styles \
             WHERE is_active = TRUE ORDER BY sort_order ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(rows.into_iter().map(StyleRow::to_record).collect())
    }
}

#[async_trait]
impl OrderStore for DbAdapter {
    async fn create_order(&self, order: NewOrder) -> PortResult<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(
            "INSERT INTO orders (user_id, style_id, canvas_size, material, ai_prompt, customer_notes, \
             preview_image_url, base_price, rush_fee, total_price, is_rush, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id, user_id, style_id, canvas_size, material, ai_prompt, customer_notes, \
             preview_image_url, base_price, rush_fee, total_price, is_rush, created_at",
        )
        .bind(order.user_id)
        .bind(order.style_id.as_deref())
        .bind(order.canvas_size.label())
        .bind(order.material.as_str())
        .bind(order.ai_prompt.as_deref())
        .bind(order.customer_notes.as_deref())
        .bind(order.preview_image_url.as_deref())
        .bind(to_db_amount(order.price.base_price)?)
        .bind(to_db_amount(order.price.rush_fee)?)
        .bind(to_db_amount(order.price.total_price)?)
        .bind(order.is_rush)
        .bind(order.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }
}

#[async_trait]
impl AccountStore for DbAdapter {
    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<Identity> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, full_name, email, hashed_password) VALUES ($1, $2, $3, $4) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict(format!("{} is already registered", email))
            }
            other => unexpected(other),
        })?;

        Ok(record.to_domain())
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            other => unexpected(other),
        })?;

        Ok(UserCredentials {
            user_id: record.user_id,
            email: record.email,
            hashed_password: record.hashed_password,
        })
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn identity_for_session(&self, session_id: &str) -> PortResult<Option<Identity>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT u.user_id, u.email FROM auth_sessions s \
             JOIN users u ON u.user_id = s.user_id \
             WHERE s.id = $1 AND s.expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(UserRecord::to_domain))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
