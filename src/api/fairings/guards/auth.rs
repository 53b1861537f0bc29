use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};

use crate::AppState;
use crate::api::GuardError;
use crate::api::fairings::VALIDATION;
use crate::api::fairings::utils::try_jwt_cookie_auth;
use crate::models::user::User;

/// An authenticated session. Permissions are checked by the handlers.
pub struct GuardAuth(pub User);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GuardAuth {
    type Error = GuardError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(state) = req.rocket().state::<AppState>() else {
            return Outcome::Error((
                Status::InternalServerError,
                anyhow::anyhow!("AppState is not managed").into(),
            ));
        };
        match try_jwt_cookie_auth(req, state, &VALIDATION) {
            Ok(user) => Outcome::Success(GuardAuth(user)),
            Err(err) => Outcome::Error((
                Status::Unauthorized,
                err.context("Authentication error").into(),
            )),
        }
    }
}
