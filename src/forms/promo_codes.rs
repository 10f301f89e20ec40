use chrono::{NaiveDate, NaiveDateTime};
use pushkind_common::routes::empty_string_as_none;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::code_generator::{CodeOptions, DEFAULT_CODE_LENGTH};
use crate::domain::promo_code::{
    DISCOUNT_SCALE, DiscountType, MAX_PERCENTAGE_VALUE, NewPromoCode, UpdatePromoCode,
};

/// Maximum allowed length for a promo code.
const CODE_MAX_LEN: usize = 32;
const CODE_MAX_LEN_VALIDATOR: u64 = CODE_MAX_LEN as u64;

/// Maximum allowed length for a generated code prefix.
const PREFIX_MAX_LEN: usize = 16;
const PREFIX_MAX_LEN_VALIDATOR: u64 = PREFIX_MAX_LEN as u64;

/// Bounds for the random part of a generated code.
const MIN_GENERATED_LENGTH: usize = 4;
const MAX_GENERATED_LENGTH: usize = 32;

/// Result type returned by the promo code form helpers.
pub type PromoCodeFormResult<T> = Result<T, PromoCodeFormError>;

/// Errors that can occur while processing promo code forms.
#[derive(Debug, Error)]
pub enum PromoCodeFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The code is empty after sanitization.
    #[error("promo code cannot be empty")]
    EmptyCode,
    /// The code contains characters other than letters, digits, `-` and `_`.
    #[error("promo code `{0}` may only contain letters, digits, `-` and `_`")]
    InvalidCode(String),
    /// The generator prefix contains unsupported characters.
    #[error("prefix `{0}` may only contain letters, digits, `-` and `_`")]
    InvalidPrefix(String),
    /// The requested random-part length is out of bounds.
    #[error("code length must be between 4 and 32, got {0}")]
    InvalidLength(usize),
    /// Unknown discount type.
    #[error("unknown discount type `{0}`")]
    InvalidDiscountType(String),
    /// The discount value is not a positive amount.
    #[error("discount value `{0}` must be a positive number with at most two decimals")]
    InvalidDiscountValue(String),
    /// A percentage discount above 100%.
    #[error("percentage discount cannot exceed 100")]
    PercentageOutOfRange,
    /// The minimum purchase amount is not a non-negative amount.
    #[error("minimum purchase `{0}` must be a non-negative number with at most two decimals")]
    InvalidMinPurchase(String),
    /// The expiry date could not be parsed.
    #[error("expiry date `{0}` must look like YYYY-MM-DD or YYYY-MM-DDTHH:MM")]
    InvalidExpiry(String),
    /// The usage limit is not a non-negative integer.
    #[error("usage limit `{0}` must be a non-negative whole number")]
    InvalidUsageLimit(String),
}

/// Code requested by the administrator when creating a promo code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedCode {
    /// Use the code typed into the form.
    Manual(String),
    /// Generate a fresh code with these options.
    Generate(CodeOptions),
}

/// Sanitized discount terms shared by the add and edit forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoCodeTerms {
    pub discount_type: DiscountType,
    pub discount_value: i32,
    pub min_purchase_cents: Option<i32>,
    pub expires_at: Option<NaiveDateTime>,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
}

impl PromoCodeTerms {
    /// Combine the terms with a final code into an insert payload.
    pub fn into_new_promo_code(
        self,
        hub_id: i32,
        code: impl Into<String>,
        now: NaiveDateTime,
    ) -> NewPromoCode {
        NewPromoCode {
            hub_id,
            code: code.into(),
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            min_purchase_cents: self.min_purchase_cents,
            expires_at: self.expires_at,
            usage_limit: self.usage_limit,
            is_active: self.is_active,
            updated_at: now,
        }
    }
}

/// Validated "Add promo code" submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoCodeDraft {
    pub code: RequestedCode,
    pub terms: PromoCodeTerms,
}

/// Form payload emitted when submitting the "Add promo code" form.
///
/// Leaving `code` blank asks the server to generate one from `prefix`
/// and `code_length`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddPromoCodeForm {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = CODE_MAX_LEN_VALIDATOR))]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = PREFIX_MAX_LEN_VALIDATOR))]
    pub prefix: Option<String>,
    #[serde(default)]
    pub code_length: Option<usize>,
    pub discount_type: String,
    pub discount_value: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_purchase: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub expires_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub usage_limit: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl AddPromoCodeForm {
    /// Validates and sanitizes the payload.
    pub fn into_draft(self) -> PromoCodeFormResult<PromoCodeDraft> {
        self.validate()?;

        let code = match self.code.as_deref().map(sanitize_code) {
            Some(code) if !code.is_empty() => RequestedCode::Manual(ensure_code_charset(code)?),
            _ => RequestedCode::Generate(code_options(self.prefix.as_deref(), self.code_length)?),
        };

        let terms = parse_terms(
            &self.discount_type,
            &self.discount_value,
            self.min_purchase.as_deref(),
            self.expires_at.as_deref(),
            self.usage_limit.as_deref(),
            self.is_active,
        )?;

        Ok(PromoCodeDraft { code, terms })
    }
}

/// Form payload emitted when editing an existing promo code.
#[derive(Debug, Deserialize, Validate)]
pub struct EditPromoCodeForm {
    /// Identifier of the promo code to update.
    #[validate(range(min = 1))]
    pub promo_code_id: i32,
    #[validate(length(min = 1, max = CODE_MAX_LEN_VALIDATOR))]
    pub code: String,
    pub discount_type: String,
    pub discount_value: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_purchase: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub expires_at: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub usage_limit: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl EditPromoCodeForm {
    /// Validates and sanitizes the payload into a domain `UpdatePromoCode`.
    pub fn into_update_promo_code(
        self,
        updated_at: NaiveDateTime,
    ) -> PromoCodeFormResult<UpdatePromoCode> {
        self.validate()?;

        let code = sanitize_code(&self.code);
        if code.is_empty() {
            return Err(PromoCodeFormError::EmptyCode);
        }
        let code = ensure_code_charset(code)?;

        let terms = parse_terms(
            &self.discount_type,
            &self.discount_value,
            self.min_purchase.as_deref(),
            self.expires_at.as_deref(),
            self.usage_limit.as_deref(),
            self.is_active,
        )?;

        Ok(UpdatePromoCode {
            code,
            discount_type: terms.discount_type,
            discount_value: terms.discount_value,
            min_purchase_cents: terms.min_purchase_cents,
            expires_at: terms.expires_at,
            usage_limit: terms.usage_limit,
            is_active: terms.is_active,
            updated_at,
        })
    }
}

/// Query parameters accepted by the code suggestion endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateCodeQuery {
    pub length: Option<usize>,
    pub prefix: Option<String>,
}

impl GenerateCodeQuery {
    /// Validates the query into generator options.
    pub fn into_code_options(self) -> PromoCodeFormResult<CodeOptions> {
        code_options(self.prefix.as_deref(), self.length)
    }
}

fn code_options(prefix: Option<&str>, length: Option<usize>) -> PromoCodeFormResult<CodeOptions> {
    let length = length.unwrap_or(DEFAULT_CODE_LENGTH);
    if !(MIN_GENERATED_LENGTH..=MAX_GENERATED_LENGTH).contains(&length) {
        return Err(PromoCodeFormError::InvalidLength(length));
    }

    let prefix = prefix.map(sanitize_code).unwrap_or_default();
    if prefix.chars().count() > PREFIX_MAX_LEN || !is_code_charset(&prefix) {
        return Err(PromoCodeFormError::InvalidPrefix(prefix));
    }

    Ok(CodeOptions::with_length(length).prefix(prefix))
}

fn parse_terms(
    discount_type: &str,
    discount_value: &str,
    min_purchase: Option<&str>,
    expires_at: Option<&str>,
    usage_limit: Option<&str>,
    is_active: bool,
) -> PromoCodeFormResult<PromoCodeTerms> {
    let discount_type = discount_type
        .parse::<DiscountType>()
        .map_err(|_| PromoCodeFormError::InvalidDiscountType(discount_type.trim().to_string()))?;

    let discount_value = parse_hundredths(discount_value)
        .filter(|value| *value > 0)
        .ok_or_else(|| PromoCodeFormError::InvalidDiscountValue(discount_value.trim().to_string()))?;

    if discount_type == DiscountType::Percentage && discount_value > MAX_PERCENTAGE_VALUE {
        return Err(PromoCodeFormError::PercentageOutOfRange);
    }

    let min_purchase_cents = min_purchase
        .map(|raw| {
            parse_hundredths(raw)
                .ok_or_else(|| PromoCodeFormError::InvalidMinPurchase(raw.trim().to_string()))
        })
        .transpose()?;

    let expires_at = expires_at.map(parse_expiry).transpose()?;

    let usage_limit = usage_limit
        .map(|raw| {
            raw.trim()
                .parse::<i32>()
                .ok()
                .filter(|limit| *limit >= 0)
                .ok_or_else(|| PromoCodeFormError::InvalidUsageLimit(raw.trim().to_string()))
        })
        .transpose()?;

    Ok(PromoCodeTerms {
        discount_type,
        discount_value,
        min_purchase_cents,
        expires_at,
        usage_limit,
        is_active,
    })
}

/// Parses a non-negative decimal amount into hundredths.
///
/// Accepts `.` or `,` as the decimal separator and at most two decimals.
fn parse_hundredths(input: &str) -> Option<i32> {
    let normalized = input.trim().replace(',', ".");
    let (whole, fraction) = match normalized.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (normalized.as_str(), ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|ch| ch.is_ascii_digit())
        || !fraction.chars().all(|ch| ch.is_ascii_digit())
        || fraction.len() > 2
    {
        return None;
    }

    let whole: i32 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: i32 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i32>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    whole.checked_mul(DISCOUNT_SCALE)?.checked_add(fraction)
}

/// Date-only values expire at midnight UTC of that day.
fn parse_expiry(input: &str) -> PromoCodeFormResult<NaiveDateTime> {
    let value = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| PromoCodeFormError::InvalidExpiry(value.to_string()))
}

fn sanitize_code(input: &str) -> String {
    input
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .collect::<String>()
        .to_uppercase()
}

fn is_code_charset(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

fn ensure_code_charset(code: String) -> PromoCodeFormResult<String> {
    if is_code_charset(&code) {
        Ok(code)
    } else {
        Err(PromoCodeFormError::InvalidCode(code))
    }
}
