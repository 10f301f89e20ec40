use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::promo_code::{
    DiscountType, NewPromoCode as DomainNewPromoCode, PromoCode as DomainPromoCode,
    UpdatePromoCode as DomainUpdatePromoCode,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::promo_codes)]
pub struct PromoCode {
    pub id: i32,
    pub hub_id: i32,
    pub code: String,
    pub discount_type: String,
    pub discount_value: i32,
    pub min_purchase_cents: Option<i32>,
    pub expires_at: Option<NaiveDateTime>,
    pub usage_limit: Option<i32>,
    pub times_used: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::promo_codes)]
pub struct NewPromoCode<'a> {
    pub hub_id: i32,
    pub code: &'a str,
    pub discount_type: &'a str,
    pub discount_value: i32,
    pub min_purchase_cents: Option<i32>,
    pub expires_at: Option<NaiveDateTime>,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::promo_codes)]
#[diesel(treat_none_as_null = true)]
pub struct UpdatePromoCode<'a> {
    pub code: &'a str,
    pub discount_type: &'a str,
    pub discount_value: i32,
    pub min_purchase_cents: Option<i32>,
    pub expires_at: Option<NaiveDateTime>,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

fn parse_discount_type(id: i32, value: &str) -> DiscountType {
    match value.parse() {
        Ok(discount_type) => discount_type,
        Err(err) => {
            // The table CHECK constraint makes this unreachable for rows we wrote.
            log::warn!("Promo code {id} has {err}; treating it as fixed");
            DiscountType::Fixed
        }
    }
}

impl From<PromoCode> for DomainPromoCode {
    fn from(value: PromoCode) -> Self {
        Self {
            id: value.id,
            hub_id: value.hub_id,
            discount_type: parse_discount_type(value.id, &value.discount_type),
            code: value.code,
            discount_value: value.discount_value,
            min_purchase_cents: value.min_purchase_cents,
            expires_at: value.expires_at,
            usage_limit: value.usage_limit,
            times_used: value.times_used,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewPromoCode> for NewPromoCode<'a> {
    fn from(value: &'a DomainNewPromoCode) -> Self {
        Self {
            hub_id: value.hub_id,
            code: value.code.as_str(),
            discount_type: value.discount_type.into(),
            discount_value: value.discount_value,
            min_purchase_cents: value.min_purchase_cents,
            expires_at: value.expires_at,
            usage_limit: value.usage_limit,
            is_active: value.is_active,
            created_at: value.updated_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdatePromoCode> for UpdatePromoCode<'a> {
    fn from(value: &'a DomainUpdatePromoCode) -> Self {
        Self {
            code: value.code.as_str(),
            discount_type: value.discount_type.into(),
            discount_value: value.discount_value,
            min_purchase_cents: value.min_purchase_cents,
            expires_at: value.expires_at,
            usage_limit: value.usage_limit,
            is_active: value.is_active,
            updated_at: value.updated_at,
        }
    }
}
