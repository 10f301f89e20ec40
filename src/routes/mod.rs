pub mod api;
pub mod promo_codes;
