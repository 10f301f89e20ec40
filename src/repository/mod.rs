use chrono::NaiveDateTime;
use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::promo_code::{NewPromoCode, PromoCode, PromoCodeListQuery, UpdatePromoCode};

pub mod promo_code;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over promo code records.
pub trait PromoCodeReader {
    fn get_promo_code_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<PromoCode>>;
    /// Case-insensitive lookup of a code within a hub.
    fn find_promo_code_by_code(&self, code: &str, hub_id: i32)
    -> RepositoryResult<Option<PromoCode>>;
    fn list_promo_codes(
        &self,
        query: PromoCodeListQuery,
    ) -> RepositoryResult<(usize, Vec<PromoCode>)>;
    /// Every code string currently stored for the hub.
    fn list_promo_code_values(&self, hub_id: i32) -> RepositoryResult<Vec<String>>;
}

/// Write operations over promo code records.
///
/// Inserts and updates that would duplicate a code (case-insensitively)
/// within a hub are rejected by the storage layer.
pub trait PromoCodeWriter {
    fn create_promo_code(&self, new_promo_code: &NewPromoCode) -> RepositoryResult<PromoCode>;
    fn update_promo_code(
        &self,
        promo_code_id: i32,
        hub_id: i32,
        updates: &UpdatePromoCode,
    ) -> RepositoryResult<PromoCode>;
    fn set_promo_code_active(
        &self,
        promo_code_id: i32,
        hub_id: i32,
        is_active: bool,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<PromoCode>;
    /// Atomically increment `times_used` by one.
    fn record_promo_code_usage(
        &self,
        promo_code_id: i32,
        hub_id: i32,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<PromoCode>;
}
