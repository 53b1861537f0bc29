use log::info;
use rocket::State;
use rocket::http::uri::Origin;
use rocket::http::{RawStr, Status};
use rocket::response::Redirect;
use rocket::response::content::RawHtml;
use rocket::{Responder, Route, get};

use crate::AppState;
use crate::api::fairings::guards::auth::GuardAuth;
use crate::api::{AppError, AppResult, GuardResult};
use crate::models::filter::FilterParams;
use crate::models::listing::{AccessDenied, ListingRequest, PageRequest, resolve_listing};
use crate::templates::render_table_list;
use crate::visualization::registry::DashboardInput;

pub fn generate_target_routes() -> Vec<Route> {
    routes![index, target_list]
}

#[derive(Responder)]
pub enum ListingResponse {
    Page(RawHtml<String>),
    Login(Redirect),
}

fn login_redirect(uri: &Origin<'_>) -> Redirect {
    let next = uri.to_string();
    Redirect::to(format!("/login?next={}", RawStr::new(&next).percent_encode()))
}

#[get("/")]
pub fn index() -> Redirect {
    Redirect::to("/targets/")
}

#[get("/targets?<page>&<filter..>")]
pub async fn target_list(
    state: &State<AppState>,
    auth: GuardResult<GuardAuth>,
    uri: &Origin<'_>,
    page: Option<&str>,
    filter: FilterParams,
) -> AppResult<ListingResponse> {
    let user = match auth {
        Ok(GuardAuth(user)) => user,
        Err(err) if err.status == Status::Unauthorized => {
            info!("Anonymous listing request redirected to login: {:#}", err.error);
            return Ok(ListingResponse::Login(login_redirect(uri)));
        }
        Err(err) => return Err(err.into()),
    };

    let request = ListingRequest {
        filter,
        page: PageRequest::parse(page),
    };
    let store = state.store.clone();
    let viewer = user.clone();
    let listing = tokio::task::spawn_blocking(move || {
        resolve_listing(&store, Some(&viewer), &request)
    })
    .await?
    .map_err(|err| match err.downcast_ref::<AccessDenied>() {
        Some(AccessDenied::Unauthenticated) => AppError::with_status(Status::Unauthorized, err),
        Some(AccessDenied::MissingPermission { .. }) => {
            AppError::with_status(Status::Forbidden, err)
        }
        None => AppError::from(err),
    })?;

    let app = state.registry.get(&state.config.dashboard_app)?;
    let fragments = app.render(&DashboardInput {
        targets: &listing.page.items,
    })?;

    Ok(ListingResponse::Page(RawHtml(render_table_list(
        &user, &listing, &fragments,
    ))))
}
