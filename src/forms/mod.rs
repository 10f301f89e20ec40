pub mod promo_codes;
