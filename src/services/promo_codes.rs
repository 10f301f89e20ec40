use chrono::{NaiveDateTime, Utc};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;
use serde::{Deserialize, Serialize};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::code_generator::{CodeOptions, GeneratedCode, generate_unique_code};
use crate::domain::promo_code::{EffectiveStatus, PromoCode, PromoCodeListQuery};
use crate::forms::promo_codes::{
    AddPromoCodeForm, EditPromoCodeForm, GenerateCodeQuery, RequestedCode,
};
use crate::repository::{PromoCodeReader, PromoCodeWriter};
use crate::services::{ServiceError, ServiceResult, paginate_in_memory};

/// Query parameters accepted by the promo codes index page.
#[derive(Debug, Default, Deserialize)]
pub struct PromoCodeQuery {
    /// Optional case-insensitive search applied to codes.
    pub search: Option<String>,
    /// Optional effective status filter, e.g. `fully_used`.
    pub status: Option<String>,
    /// Page number requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Promo code together with its status at the moment it was loaded.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PromoCodeView {
    #[serde(flatten)]
    pub promo_code: PromoCode,
    pub status: EffectiveStatus,
    pub status_label: &'static str,
}

impl PromoCodeView {
    /// Derive the view of `promo_code` at `now`.
    pub fn at(promo_code: PromoCode, now: NaiveDateTime) -> Self {
        let status = promo_code.effective_status(now);
        Self {
            promo_code,
            status,
            status_label: status.label(),
        }
    }
}

/// Data required to render the promo codes index template.
pub struct PromoCodesPageData {
    /// Paginated list of promo codes displayed in the table.
    pub promo_codes: Paginated<PromoCodeView>,
    /// Search query echoed back to the template when present.
    pub search: Option<String>,
    /// Active status filter echoed back to the template.
    pub status: Option<EffectiveStatus>,
}

/// Freshly generated code offered to the administrator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CodeSuggestion {
    pub code: String,
    /// Set when the timestamp fallback produced the code.
    pub fallback: bool,
}

impl From<GeneratedCode> for CodeSuggestion {
    fn from(value: GeneratedCode) -> Self {
        let fallback = value.is_fallback();
        Self {
            code: value.into_code(),
            fallback,
        }
    }
}

/// Fetches paginated promo codes for the authenticated user's hub.
pub fn load_promo_codes<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: PromoCodeQuery,
) -> ServiceResult<PromoCodesPageData>
where
    R: PromoCodeReader + ?Sized,
{
    load_promo_codes_at(repo, user, query, Utc::now().naive_utc())
}

/// Same as [`load_promo_codes`] with an explicit clock.
///
/// Status filtering needs the derived status of every candidate row, so a
/// status filter loads the hub's matching codes and paginates in memory.
pub fn load_promo_codes_at<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: PromoCodeQuery,
    now: NaiveDateTime,
) -> ServiceResult<PromoCodesPageData>
where
    R: PromoCodeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let PromoCodeQuery {
        search,
        status,
        page,
    } = query;
    let page = page.unwrap_or(1).max(1);

    let status = status
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::parse::<EffectiveStatus>)
        .transpose()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut list_query = PromoCodeListQuery::new(user.hub_id);
    if let Some(term) = search.as_ref() {
        list_query = list_query.search(term);
    }

    let promo_codes = match status {
        None => {
            list_query = list_query.paginate(page, DEFAULT_ITEMS_PER_PAGE);
            let (total, items) = repo
                .list_promo_codes(list_query)
                .map_err(ServiceError::from)?;
            let views = items
                .into_iter()
                .map(|promo_code| PromoCodeView::at(promo_code, now))
                .collect();
            let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
            Paginated::new(views, page.min(total_pages + 1), total_pages)
        }
        Some(wanted) => {
            let (_total, items) = repo
                .list_promo_codes(list_query)
                .map_err(ServiceError::from)?;
            let views: Vec<PromoCodeView> = items
                .into_iter()
                .map(|promo_code| PromoCodeView::at(promo_code, now))
                .filter(|view| view.status == wanted)
                .collect();
            let (views, total_pages) = paginate_in_memory(views, page, DEFAULT_ITEMS_PER_PAGE);
            Paginated::new(views, page.min(total_pages + 1), total_pages)
        }
    };

    Ok(PromoCodesPageData {
        promo_codes,
        search,
        status,
    })
}

/// Looks up a promo code by its code, ignoring case.
pub fn lookup_promo_code<R>(
    repo: &R,
    user: &AuthenticatedUser,
    code: &str,
) -> ServiceResult<PromoCodeView>
where
    R: PromoCodeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let promo_code = repo
        .find_promo_code_by_code(code, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    Ok(PromoCodeView::at(promo_code, Utc::now().naive_utc()))
}

/// Creates a new promo code, generating the code when the form left it blank.
pub fn create_promo_code<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddPromoCodeForm,
) -> ServiceResult<PromoCode>
where
    R: PromoCodeReader + PromoCodeWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let draft = form
        .into_draft()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let code = match draft.code {
        RequestedCode::Manual(code) => code,
        RequestedCode::Generate(options) => {
            generate_code_for_hub(repo, user.hub_id, &options)?.into_code()
        }
    };

    let new_promo_code = draft
        .terms
        .into_new_promo_code(user.hub_id, code, Utc::now().naive_utc());

    repo.create_promo_code(&new_promo_code)
        .map_err(ServiceError::from)
}

/// Updates an existing promo code for the authenticated user's hub.
pub fn modify_promo_code<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: EditPromoCodeForm,
) -> ServiceResult<PromoCode>
where
    R: PromoCodeWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let promo_code_id = form.promo_code_id;
    let update = form
        .into_update_promo_code(Utc::now().naive_utc())
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_promo_code(promo_code_id, user.hub_id, &update)
        .map_err(ServiceError::from)
}

/// Flips the administrator switch of a promo code.
pub fn toggle_promo_code<R>(
    repo: &R,
    user: &AuthenticatedUser,
    promo_code_id: i32,
) -> ServiceResult<PromoCode>
where
    R: PromoCodeReader + PromoCodeWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let current = repo
        .get_promo_code_by_id(promo_code_id, user.hub_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    repo.set_promo_code_active(
        promo_code_id,
        user.hub_id,
        !current.is_active,
        Utc::now().naive_utc(),
    )
    .map_err(ServiceError::from)
}

/// Offers a code that is not yet used in the authenticated user's hub.
pub fn suggest_promo_code<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: GenerateCodeQuery,
) -> ServiceResult<CodeSuggestion>
where
    R: PromoCodeReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let options = query
        .into_code_options()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    generate_code_for_hub(repo, user.hub_id, &options).map(CodeSuggestion::from)
}

fn generate_code_for_hub<R>(
    repo: &R,
    hub_id: i32,
    options: &CodeOptions,
) -> ServiceResult<GeneratedCode>
where
    R: PromoCodeReader + ?Sized,
{
    let existing = repo
        .list_promo_code_values(hub_id)
        .map_err(ServiceError::from)?;

    let generated = generate_unique_code(&existing, options);
    if let GeneratedCode::Fallback(code) = &generated {
        log::warn!(
            "Promo code generation for hub {hub_id} fell back to timestamp code {code} after exhausting random attempts"
        );
    }

    Ok(generated)
}
