pub mod code_generator;
pub mod promo_code;
