use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, redirect, render_template};
use tera::Tera;

use crate::domain::promo_code::EffectiveStatus;
use crate::forms::promo_codes::{AddPromoCodeForm, EditPromoCodeForm};
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::promo_codes::{
    PromoCodeQuery, create_promo_code, load_promo_codes, modify_promo_code, toggle_promo_code,
};

#[get("/promo-codes")]
pub async fn show_promo_codes(
    params: web::Query<PromoCodeQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match load_promo_codes(repo.get_ref(), &user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "promo_codes",
                &server_config.auth_service_url,
            );
            context.insert("promo_codes", &data.promo_codes);
            context.insert("search", &data.search);
            context.insert("status", &data.status);
            context.insert("statuses", &EffectiveStatus::ALL);
            context.insert("search_action", "/promo-codes");
            render_template(&tera, "promo_codes/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/promo-codes")
        }
        Err(err) => {
            log::error!("Failed to list promo codes: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/promo-codes/add")]
pub async fn add_promo_code(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Form<AddPromoCodeForm>,
) -> impl Responder {
    match create_promo_code(repo.get_ref(), &user, form.into_inner()) {
        Ok(promo_code) => {
            FlashMessage::success(format!("Promo code «{}» created.", promo_code.code)).send();
            redirect("/promo-codes")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/promo-codes")
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("A promo code with this code already exists.").send();
            redirect("/promo-codes")
        }
        Err(err) => {
            log::error!("Failed to create promo code: {err}");
            FlashMessage::error("Failed to create the promo code.").send();
            redirect("/promo-codes")
        }
    }
}

#[post("/promo-codes/edit")]
pub async fn edit_promo_code(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Form<EditPromoCodeForm>,
) -> impl Responder {
    match modify_promo_code(repo.get_ref(), &user, form.into_inner()) {
        Ok(promo_code) => {
            FlashMessage::success(format!("Promo code «{}» updated.", promo_code.code)).send();
            redirect("/promo-codes")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/promo-codes")
        }
        Err(ServiceError::Conflict) => {
            FlashMessage::error("A promo code with this code already exists.").send();
            redirect("/promo-codes")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Promo code not found.").send();
            redirect("/promo-codes")
        }
        Err(err) => {
            log::error!("Failed to modify promo code: {err}");
            FlashMessage::error("Failed to update the promo code.").send();
            redirect("/promo-codes")
        }
    }
}

#[post("/promo-codes/{promo_code_id}/toggle")]
pub async fn toggle_promo_code_status(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let promo_code_id = path.into_inner();

    match toggle_promo_code(repo.get_ref(), &user, promo_code_id) {
        Ok(promo_code) => {
            let state = if promo_code.is_active {
                "activated"
            } else {
                "deactivated"
            };
            FlashMessage::success(format!("Promo code «{}» {state}.", promo_code.code)).send();
            redirect("/promo-codes")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Promo code not found.").send();
            redirect("/promo-codes")
        }
        Err(err) => {
            log::error!("Failed to toggle promo code {promo_code_id}: {err}");
            FlashMessage::error("Failed to change the promo code status.").send();
            redirect("/promo-codes")
        }
    }
}
