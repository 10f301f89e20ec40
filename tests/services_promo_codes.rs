use pushkind_common::domain::auth::AuthenticatedUser;
use seoul_mirage_promotions::SERVICE_ACCESS_ROLE;
use seoul_mirage_promotions::domain::promo_code::{DiscountType, EffectiveStatus, NewPromoCode};
use seoul_mirage_promotions::forms::promo_codes::{
    AddPromoCodeForm, EditPromoCodeForm, GenerateCodeQuery,
};
use seoul_mirage_promotions::repository::{DieselRepository, PromoCodeWriter};
use seoul_mirage_promotions::services::ServiceError;
use seoul_mirage_promotions::services::promo_codes::{
    PromoCodeQuery, create_promo_code, load_promo_codes, lookup_promo_code, modify_promo_code,
    suggest_promo_code, toggle_promo_code,
};
use serde_json::Value;

mod common;

fn admin(hub_id: i32) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "admin-1".to_string(),
        email: "admin@seoulmirage.test".to_string(),
        hub_id,
        name: "Admin".to_string(),
        roles: vec![SERVICE_ACCESS_ROLE.to_string()],
        exp: 0,
    }
}

fn add_form(code: Option<&str>) -> AddPromoCodeForm {
    AddPromoCodeForm {
        code: code.map(str::to_string),
        prefix: None,
        code_length: None,
        discount_type: "percentage".to_string(),
        discount_value: "15".to_string(),
        min_purchase: Some("25.50".to_string()),
        expires_at: None,
        usage_limit: None,
        is_active: true,
    }
}

fn listed_codes(data: &impl serde::Serialize) -> Vec<String> {
    let value = serde_json::to_value(data).expect("serialization should succeed");
    value
        .get("items")
        .and_then(Value::as_array)
        .expect("expected items array")
        .iter()
        .filter_map(|item| item.get("code").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_create_promo_code_with_generated_code() {
    let test_db = common::TestDb::new("test_create_promo_code_with_generated_code.db");
    let repo = DieselRepository::new(test_db.pool());
    let user = admin(1);

    let mut form = add_form(None);
    form.prefix = Some("sale".to_string());
    form.code_length = Some(6);

    let created = create_promo_code(&repo, &user, form).expect("expected creation");

    assert!(created.code.starts_with("SALE"));
    assert_eq!(created.code.len(), 10);
    assert_eq!(created.discount_type, DiscountType::Percentage);
    assert_eq!(created.discount_value, 1_500);
    assert_eq!(created.min_purchase_cents, Some(2_550));
    assert_eq!(created.hub_id, 1);

    let suggestion = suggest_promo_code(&repo, &user, GenerateCodeQuery::default())
        .expect("expected suggestion");
    assert_eq!(suggestion.code.len(), 8);
    assert!(!suggestion.fallback);
}

#[test]
fn test_duplicate_code_is_a_conflict() {
    let test_db = common::TestDb::new("test_duplicate_code_is_a_conflict.db");
    let repo = DieselRepository::new(test_db.pool());
    let user = admin(1);

    create_promo_code(&repo, &user, add_form(Some("SUMMER20"))).expect("expected creation");

    let err = create_promo_code(&repo, &user, add_form(Some("summer20")))
        .expect_err("expected duplicate to be rejected");
    assert!(matches!(err, ServiceError::Conflict));

    create_promo_code(&repo, &admin(2), add_form(Some("SUMMER20")))
        .expect("other hubs may reuse the code");
}

#[test]
fn test_listing_filters_by_effective_status() {
    let test_db = common::TestDb::new("test_listing_filters_by_effective_status.db");
    let repo = DieselRepository::new(test_db.pool());
    let user = admin(1);

    repo.create_promo_code(&NewPromoCode::new(1, "LIVE", DiscountType::Fixed, 500))
        .unwrap();
    let once = repo
        .create_promo_code(
            &NewPromoCode::new(1, "ONCE", DiscountType::Fixed, 500).with_usage_limit(1),
        )
        .unwrap();
    repo.record_promo_code_usage(once.id, 1, once.created_at).unwrap();
    repo.create_promo_code(
        &NewPromoCode::new(1, "PAUSED", DiscountType::Fixed, 500).with_active(false),
    )
    .unwrap();

    let all = load_promo_codes(&repo, &user, PromoCodeQuery::default()).unwrap();
    assert_eq!(listed_codes(&all.promo_codes).len(), 3);

    let fully_used = load_promo_codes(
        &repo,
        &user,
        PromoCodeQuery {
            status: Some("fully_used".to_string()),
            ..PromoCodeQuery::default()
        },
    )
    .unwrap();
    assert_eq!(fully_used.status, Some(EffectiveStatus::FullyUsed));
    assert_eq!(listed_codes(&fully_used.promo_codes), vec!["ONCE".to_string()]);

    let inactive = load_promo_codes(
        &repo,
        &user,
        PromoCodeQuery {
            status: Some("inactive".to_string()),
            ..PromoCodeQuery::default()
        },
    )
    .unwrap();
    assert_eq!(listed_codes(&inactive.promo_codes), vec!["PAUSED".to_string()]);

    let view = lookup_promo_code(&repo, &user, "once").unwrap();
    assert_eq!(view.status, EffectiveStatus::FullyUsed);
    assert!(matches!(
        lookup_promo_code(&repo, &user, "missing"),
        Err(ServiceError::NotFound)
    ));
}

#[test]
fn test_edit_and_toggle_promo_code() {
    let test_db = common::TestDb::new("test_edit_and_toggle_promo_code.db");
    let repo = DieselRepository::new(test_db.pool());
    let user = admin(1);

    let created = create_promo_code(&repo, &user, add_form(Some("SPRING"))).unwrap();

    let edited = modify_promo_code(
        &repo,
        &user,
        EditPromoCodeForm {
            promo_code_id: created.id,
            code: " spring10 ".to_string(),
            discount_type: "fixed".to_string(),
            discount_value: "10".to_string(),
            min_purchase: None,
            expires_at: Some("2030-01-01".to_string()),
            usage_limit: Some("100".to_string()),
            is_active: true,
        },
    )
    .unwrap();
    assert_eq!(edited.code, "SPRING10");
    assert_eq!(edited.discount_type, DiscountType::Fixed);
    assert_eq!(edited.discount_value, 1_000);
    assert_eq!(edited.min_purchase_cents, None);
    assert_eq!(edited.usage_limit, Some(100));

    let toggled = toggle_promo_code(&repo, &user, created.id).unwrap();
    assert!(!toggled.is_active);
    let toggled = toggle_promo_code(&repo, &user, created.id).unwrap();
    assert!(toggled.is_active);

    assert!(matches!(
        toggle_promo_code(&repo, &admin(2), created.id),
        Err(ServiceError::NotFound)
    ));
}

#[test]
fn test_services_require_access_role() {
    let test_db = common::TestDb::new("test_services_require_access_role.db");
    let repo = DieselRepository::new(test_db.pool());
    let mut user = admin(1);
    user.roles = vec!["viewer".to_string()];

    assert!(matches!(
        load_promo_codes(&repo, &user, PromoCodeQuery::default()),
        Err(ServiceError::Unauthorized)
    ));
    assert!(matches!(
        create_promo_code(&repo, &user, add_form(Some("NOPE"))),
        Err(ServiceError::Unauthorized)
    ));
    assert!(matches!(
        suggest_promo_code(&repo, &user, GenerateCodeQuery::default()),
        Err(ServiceError::Unauthorized)
    ));
}

#[test]
fn test_listing_far_past_the_last_page_is_empty() {
    let test_db = common::TestDb::new("test_listing_far_past_the_last_page_is_empty.db");
    let repo = DieselRepository::new(test_db.pool());
    let user = admin(1);

    create_promo_code(&repo, &user, add_form(Some("ONLYONE"))).unwrap();

    let unfiltered = load_promo_codes(
        &repo,
        &user,
        PromoCodeQuery {
            page: Some(usize::MAX / 2),
            ..PromoCodeQuery::default()
        },
    )
    .unwrap();
    assert!(listed_codes(&unfiltered.promo_codes).is_empty());

    let filtered = load_promo_codes(
        &repo,
        &user,
        PromoCodeQuery {
            status: Some("active".to_string()),
            page: Some(usize::MAX),
            ..PromoCodeQuery::default()
        },
    )
    .unwrap();
    assert!(listed_codes(&filtered.promo_codes).is_empty());
}
