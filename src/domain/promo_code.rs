use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Discount values are stored in hundredths: cents for fixed amounts and
/// hundredths of a percent for percentages.
pub const DISCOUNT_SCALE: i32 = 100;

/// Largest storable percentage discount (100%).
pub const MAX_PERCENTAGE_VALUE: i32 = 100 * DISCOUNT_SCALE;

/// How the discount value of a promo code is applied to an order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Value is a percentage of the order total.
    Percentage,
    /// Value is a fixed amount subtracted from the order total.
    Fixed,
}

impl DiscountType {
    /// Storage representation of the discount type.
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl From<DiscountType> for &'static str {
    fn from(value: DiscountType) -> Self {
        value.as_str()
    }
}

impl FromStr for DiscountType {
    type Err = UnknownDiscountType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(UnknownDiscountType(other.to_string())),
        }
    }
}

/// Error returned when a discount type string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown discount type `{0}`")]
pub struct UnknownDiscountType(pub String);

/// User-facing lifecycle state of a promo code.
///
/// The value is derived from the stored fields and the current moment and
/// is never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    /// Enabled, not expired and not exhausted.
    Active,
    /// Disabled by an administrator.
    Inactive,
    /// Expiry moment has passed.
    Expired,
    /// Usage limit has been reached.
    FullyUsed,
}

impl EffectiveStatus {
    /// Every status in display order.
    pub const ALL: [EffectiveStatus; 4] = [
        EffectiveStatus::Active,
        EffectiveStatus::Inactive,
        EffectiveStatus::Expired,
        EffectiveStatus::FullyUsed,
    ];

    /// Machine-readable identifier used in query strings and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            EffectiveStatus::Active => "active",
            EffectiveStatus::Inactive => "inactive",
            EffectiveStatus::Expired => "expired",
            EffectiveStatus::FullyUsed => "fully_used",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            EffectiveStatus::Active => "Active",
            EffectiveStatus::Inactive => "Inactive",
            EffectiveStatus::Expired => "Expired",
            EffectiveStatus::FullyUsed => "Fully Used",
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EffectiveStatus {
    type Err = UnknownEffectiveStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        EffectiveStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownEffectiveStatus(value.to_string()))
    }
}

/// Error returned when a status filter string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown promo code status `{0}`")]
pub struct UnknownEffectiveStatus(pub String);

/// Domain representation of a promo code belonging to a hub.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromoCode {
    /// Unique identifier of the promo code.
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Code entered by customers at checkout.
    pub code: String,
    /// How `discount_value` is applied.
    pub discount_type: DiscountType,
    /// Discount value in hundredths, see [`DISCOUNT_SCALE`].
    pub discount_value: i32,
    /// Minimum order total in cents required to apply the code.
    pub min_purchase_cents: Option<i32>,
    /// Moment after which the code is expired. `None` never expires.
    pub expires_at: Option<NaiveDateTime>,
    /// Maximum number of redemptions. `None` or `0` is unlimited.
    pub usage_limit: Option<i32>,
    /// Number of redemptions recorded so far.
    pub times_used: i32,
    /// Administrator-controlled switch.
    pub is_active: bool,
    /// Timestamp for when the promo code record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the promo code record.
    pub updated_at: NaiveDateTime,
}

impl PromoCode {
    /// Derive the effective status of the promo code at `now`.
    pub fn effective_status(&self, now: NaiveDateTime) -> EffectiveStatus {
        effective_status(self, now)
    }

    /// Whether the usage limit bounds redemptions at all.
    pub fn has_usage_limit(&self) -> bool {
        matches!(self.usage_limit, Some(limit) if limit > 0)
    }
}

/// Derive the effective status of `promo` at `now`.
///
/// Checks run in priority order: deactivation, then expiry, then usage.
pub fn effective_status(promo: &PromoCode, now: NaiveDateTime) -> EffectiveStatus {
    if !promo.is_active {
        return EffectiveStatus::Inactive;
    }

    if let Some(expires_at) = promo.expires_at {
        if expires_at < now {
            return EffectiveStatus::Expired;
        }
    }

    if let Some(limit) = promo.usage_limit {
        if limit > 0 && promo.times_used >= limit {
            return EffectiveStatus::FullyUsed;
        }
    }

    EffectiveStatus::Active
}

/// Payload required to insert a new promo code for a hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromoCode {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Code entered by customers at checkout.
    pub code: String,
    /// How `discount_value` is applied.
    pub discount_type: DiscountType,
    /// Discount value in hundredths.
    pub discount_value: i32,
    /// Minimum order total in cents.
    pub min_purchase_cents: Option<i32>,
    /// Expiry moment.
    pub expires_at: Option<NaiveDateTime>,
    /// Maximum number of redemptions.
    pub usage_limit: Option<i32>,
    /// Initial state of the administrator switch.
    pub is_active: bool,
    /// Timestamp captured when the payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewPromoCode {
    /// Build an active promo code payload with no restrictions.
    pub fn new(
        hub_id: i32,
        code: impl Into<String>,
        discount_type: DiscountType,
        discount_value: i32,
    ) -> Self {
        Self {
            hub_id,
            code: code.into().trim().to_string(),
            discount_type,
            discount_value,
            min_purchase_cents: None,
            expires_at: None,
            usage_limit: None,
            is_active: true,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Require a minimum order total.
    pub fn with_min_purchase_cents(mut self, cents: i32) -> Self {
        self.min_purchase_cents = Some(cents);
        self
    }

    /// Expire the code at the given moment.
    pub fn with_expires_at(mut self, expires_at: NaiveDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Limit the number of redemptions.
    pub fn with_usage_limit(mut self, limit: i32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Override the initial active flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Patch data applied when an administrator edits a promo code.
///
/// `times_used` is deliberately absent: it only moves through
/// `record_promo_code_usage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePromoCode {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i32,
    pub min_purchase_cents: Option<i32>,
    pub expires_at: Option<NaiveDateTime>,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

/// Query definition used to list promo codes for a hub.
#[derive(Debug, Clone)]
pub struct PromoCodeListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Optional case-insensitive substring search on the code.
    pub search: Option<String>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl PromoCodeListQuery {
    /// Construct a query that targets all promo codes belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            search: None,
            pagination: None,
        }
    }

    /// Filter the results by a search term applied to the code.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
