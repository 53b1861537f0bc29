use log::{info, warn};
use rocket::form::Form;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::response::content::RawHtml;
use rocket::response::{Redirect, status};
use rocket::{FromForm, Responder, Route, State, get, post};

use crate::AppState;
use crate::api::AppResult;
use crate::api::claims::Claims;
use crate::api::fairings::utils::safe_next;
use crate::common::{JWT_COOKIE_NAME, JWT_LIFETIME_SECS};
use crate::templates::render_login;

pub fn generate_auth_routes() -> Vec<Route> {
    routes![login_page, login, logout]
}

#[derive(Debug, FromForm)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Responder)]
pub enum LoginResponse {
    Success(Redirect),
    Rejected(status::Custom<RawHtml<String>>),
}

#[get("/login?<next>")]
pub fn login_page(next: Option<&str>) -> RawHtml<String> {
    RawHtml(render_login(safe_next(next), None))
}

#[post("/login", data = "<form>")]
pub async fn login(
    state: &State<AppState>,
    cookies: &CookieJar<'_>,
    form: Form<LoginForm>,
) -> AppResult<LoginResponse> {
    let form = form.into_inner();
    let next = safe_next(form.next.as_deref()).to_string();

    let store = state.store.clone();
    let username = form.username.clone();
    let password = form.password;
    let verified = tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
        Ok(store
            .read_user_schema(&username)?
            .is_some_and(|user| user.verify_password(&password)))
    })
    .await??;

    if !verified {
        warn!("Rejected login for '{}'", form.username);
        return Ok(LoginResponse::Rejected(status::Custom(
            Status::Unauthorized,
            RawHtml(render_login(&next, Some("Invalid username or password."))),
        )));
    }

    let token = Claims::new(form.username.as_str()).encode_with_key(&state.config.jwt_secret_key())?;
    cookies.add(
        Cookie::build((JWT_COOKIE_NAME, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(rocket::time::Duration::seconds(JWT_LIFETIME_SECS as i64)),
    );
    info!("User '{}' logged in", form.username);
    Ok(LoginResponse::Success(Redirect::to(next)))
}

#[post("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Redirect {
    cookies.remove(Cookie::build(JWT_COOKIE_NAME).path("/"));
    Redirect::to("/login")
}
