use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::Text;
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::promo_code::{
    NewPromoCode as DomainNewPromoCode, PromoCode as DomainPromoCode, PromoCodeListQuery,
    UpdatePromoCode as DomainUpdatePromoCode,
};
use crate::models::promo_code::{
    NewPromoCode as DbNewPromoCode, PromoCode as DbPromoCode,
    UpdatePromoCode as DbUpdatePromoCode,
};
use crate::repository::{DieselRepository, PromoCodeReader, PromoCodeWriter};

diesel::define_sql_function! {
    fn lower(value: Text) -> Text;
}

/// Escape `LIKE` wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl PromoCodeReader for DieselRepository {
    fn get_promo_code_by_id(
        &self,
        id: i32,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainPromoCode>> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;
        let promo_code = promo_codes::table
            .filter(promo_codes::id.eq(id))
            .filter(promo_codes::hub_id.eq(hub_id))
            .first::<DbPromoCode>(&mut conn)
            .optional()?;

        Ok(promo_code.map(DomainPromoCode::from))
    }

    fn find_promo_code_by_code(
        &self,
        code: &str,
        hub_id: i32,
    ) -> RepositoryResult<Option<DomainPromoCode>> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;
        let promo_code = promo_codes::table
            .filter(promo_codes::hub_id.eq(hub_id))
            .filter(lower(promo_codes::code).eq(code.trim().to_lowercase()))
            .first::<DbPromoCode>(&mut conn)
            .optional()?;

        Ok(promo_code.map(DomainPromoCode::from))
    }

    fn list_promo_codes(
        &self,
        query: PromoCodeListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainPromoCode>)> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;

        let PromoCodeListQuery {
            hub_id,
            search,
            pagination,
        } = query;

        let search_pattern = search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{}%", escape_like(term)));

        let mut count_query = promo_codes::table
            .filter(promo_codes::hub_id.eq(hub_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref pattern) = search_pattern {
            count_query =
                count_query.filter(promo_codes::code.like(pattern.clone()).escape('\\'));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = promo_codes::table
            .filter(promo_codes::hub_id.eq(hub_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref pattern) = search_pattern {
            items = items.filter(promo_codes::code.like(pattern.clone()).escape('\\'));
        }

        items = items.order((promo_codes::created_at.desc(), promo_codes::id.desc()));

        if let Some(pagination) = pagination {
            let offset = (pagination.page.max(1) - 1)
                .checked_mul(pagination.per_page)
                .and_then(|offset| i64::try_from(offset).ok())
                .unwrap_or(i64::MAX);
            let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
            items = items.offset(offset).limit(limit);
        }

        let promo_codes = items
            .load::<DbPromoCode>(&mut conn)?
            .into_iter()
            .map(DomainPromoCode::from)
            .collect();

        Ok((total, promo_codes))
    }

    fn list_promo_code_values(&self, hub_id: i32) -> RepositoryResult<Vec<String>> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;
        let codes = promo_codes::table
            .filter(promo_codes::hub_id.eq(hub_id))
            .select(promo_codes::code)
            .load::<String>(&mut conn)?;

        Ok(codes)
    }
}

impl PromoCodeWriter for DieselRepository {
    fn create_promo_code(
        &self,
        new_promo_code: &DomainNewPromoCode,
    ) -> RepositoryResult<DomainPromoCode> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;
        let insertable = DbNewPromoCode::from(new_promo_code);

        let created = diesel::insert_into(promo_codes::table)
            .values(&insertable)
            .get_result::<DbPromoCode>(&mut conn)?;

        Ok(created.into())
    }

    fn update_promo_code(
        &self,
        promo_code_id: i32,
        hub_id: i32,
        updates: &DomainUpdatePromoCode,
    ) -> RepositoryResult<DomainPromoCode> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;
        let db_updates = DbUpdatePromoCode::from(updates);

        let target = promo_codes::table
            .filter(promo_codes::id.eq(promo_code_id))
            .filter(promo_codes::hub_id.eq(hub_id));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbPromoCode>(&mut conn)?;

        Ok(updated.into())
    }

    fn set_promo_code_active(
        &self,
        promo_code_id: i32,
        hub_id: i32,
        is_active: bool,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<DomainPromoCode> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;
        let target = promo_codes::table
            .filter(promo_codes::id.eq(promo_code_id))
            .filter(promo_codes::hub_id.eq(hub_id));

        let updated = diesel::update(target)
            .set((
                promo_codes::is_active.eq(is_active),
                promo_codes::updated_at.eq(updated_at),
            ))
            .get_result::<DbPromoCode>(&mut conn)?;

        Ok(updated.into())
    }

    fn record_promo_code_usage(
        &self,
        promo_code_id: i32,
        hub_id: i32,
        updated_at: NaiveDateTime,
    ) -> RepositoryResult<DomainPromoCode> {
        use crate::schema::promo_codes;

        let mut conn = self.conn()?;
        let target = promo_codes::table
            .filter(promo_codes::id.eq(promo_code_id))
            .filter(promo_codes::hub_id.eq(hub_id));

        let updated = diesel::update(target)
            .set((
                promo_codes::times_used.eq(promo_codes::times_used + 1),
                promo_codes::updated_at.eq(updated_at),
            ))
            .get_result::<DbPromoCode>(&mut conn)?;

        Ok(updated.into())
    }
}
