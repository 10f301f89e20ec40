use actix_web::{HttpResponse, Responder, get, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Deserialize;

use crate::forms::promo_codes::GenerateCodeQuery;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::promo_codes::{
    PromoCodeQuery, load_promo_codes, lookup_promo_code, suggest_promo_code,
};

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub code: String,
}

#[get("/v1/promo-codes")]
/// Return a JSON page of promo codes with their effective statuses.
///
/// Users without the role stored in `crate::SERVICE_ACCESS_ROLE` receive a `401 Unauthorized` response.
pub async fn api_v1_promo_codes(
    params: web::Query<PromoCodeQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match load_promo_codes(repo.get_ref(), &user, params.into_inner()) {
        Ok(data) => HttpResponse::Ok().json(data.promo_codes),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::Form(message)) => HttpResponse::BadRequest().body(message),
        Err(err) => {
            log::error!("Failed to list promo codes: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/promo-codes/generate")]
/// Return a code that is not taken in the user's hub as `{code, fallback}`.
pub async fn api_v1_generate_promo_code(
    params: web::Query<GenerateCodeQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match suggest_promo_code(repo.get_ref(), &user, params.into_inner()) {
        Ok(suggestion) => HttpResponse::Ok().json(suggestion),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::Form(message)) => HttpResponse::BadRequest().body(message),
        Err(err) => {
            log::error!("Failed to generate promo code: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/promo-codes/lookup")]
/// Return a single promo code, matched case-insensitively, with its status.
pub async fn api_v1_lookup_promo_code(
    params: web::Query<LookupQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match lookup_promo_code(repo.get_ref(), &user, &params.code) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to look up promo code: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
