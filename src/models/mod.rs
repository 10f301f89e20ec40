pub mod promo_code;
