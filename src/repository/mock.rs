use chrono::NaiveDateTime;
use mockall::mock;

use super::{PromoCodeReader, PromoCodeWriter};
use crate::domain::promo_code::{NewPromoCode, PromoCode, PromoCodeListQuery, UpdatePromoCode};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub PromoCodeReader {}

    impl PromoCodeReader for PromoCodeReader {
        fn get_promo_code_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<PromoCode>>;
        fn find_promo_code_by_code(&self, code: &str, hub_id: i32) -> RepositoryResult<Option<PromoCode>>;
        fn list_promo_codes(&self, query: PromoCodeListQuery) -> RepositoryResult<(usize, Vec<PromoCode>)>;
        fn list_promo_code_values(&self, hub_id: i32) -> RepositoryResult<Vec<String>>;
    }
}

mock! {
    pub PromoCodeWriter {}

    impl PromoCodeWriter for PromoCodeWriter {
        fn create_promo_code(&self, new_promo_code: &NewPromoCode) -> RepositoryResult<PromoCode>;
        fn update_promo_code(&self, promo_code_id: i32, hub_id: i32, updates: &UpdatePromoCode) -> RepositoryResult<PromoCode>;
        fn set_promo_code_active(&self, promo_code_id: i32, hub_id: i32, is_active: bool, updated_at: NaiveDateTime) -> RepositoryResult<PromoCode>;
        fn record_promo_code_usage(&self, promo_code_id: i32, hub_id: i32, updated_at: NaiveDateTime) -> RepositoryResult<PromoCode>;
    }
}

mock! {
    pub PromoCodeRepository {}

    impl PromoCodeReader for PromoCodeRepository {
        fn get_promo_code_by_id(&self, id: i32, hub_id: i32) -> RepositoryResult<Option<PromoCode>>;
        fn find_promo_code_by_code(&self, code: &str, hub_id: i32) -> RepositoryResult<Option<PromoCode>>;
        fn list_promo_codes(&self, query: PromoCodeListQuery) -> RepositoryResult<(usize, Vec<PromoCode>)>;
        fn list_promo_code_values(&self, hub_id: i32) -> RepositoryResult<Vec<String>>;
    }

    impl PromoCodeWriter for PromoCodeRepository {
        fn create_promo_code(&self, new_promo_code: &NewPromoCode) -> RepositoryResult<PromoCode>;
        fn update_promo_code(&self, promo_code_id: i32, hub_id: i32, updates: &UpdatePromoCode) -> RepositoryResult<PromoCode>;
        fn set_promo_code_active(&self, promo_code_id: i32, hub_id: i32, is_active: bool, updated_at: NaiveDateTime) -> RepositoryResult<PromoCode>;
        fn record_promo_code_usage(&self, promo_code_id: i32, hub_id: i32, updated_at: NaiveDateTime) -> RepositoryResult<PromoCode>;
    }
}
