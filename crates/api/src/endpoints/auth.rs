//! Signup, login and logout pages.

use axum::{
    Form, Router,
    extract::{Query, State, rejection::FormRejection},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use yatube_common::{AppError, AppResult, FormErrors};
use yatube_core::{LoginInput, SignupInput};
use yatube_db::entities::user;

use crate::{
    extractors::MaybeSessionUser,
    middleware::{AppState, SESSION_COOKIE},
    response::{PageResponse, redirect},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup/", get(signup_form).post(signup))
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", get(logout))
}

/// Only same-site absolute paths are followed after login. Browsers read a
/// backslash as a slash, so any path holding one is refused.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .build()
}

/// Set the session cookie and move on.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: user::Model,
    to: &str,
) -> AppResult<Response> {
    let token = user
        .token
        .ok_or_else(|| AppError::Internal(format!("No session token for {}", user.username)))?;
    let jar = jar.add(session_cookie(state, token));
    Ok((jar, redirect(to)).into_response())
}

/// Signup form values echoed back on error. The password never is.
#[derive(Debug, Default, Serialize)]
struct SignupForm {
    username: String,
    name: Option<String>,
    errors: FormErrors,
}

fn render_signup(form: SignupForm) -> Response {
    PageResponse::page("auth/signup.html", json!({ "form": form })).into_response()
}

async fn signup_form() -> Response {
    render_signup(SignupForm::default())
}

async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<SignupInput>, FormRejection>,
) -> AppResult<Response> {
    let Form(input) = match form {
        Ok(form) => form,
        Err(rejection) => {
            return Ok(render_signup(SignupForm {
                errors: FormErrors::single("form", rejection.body_text()),
                ..SignupForm::default()
            }));
        }
    };

    let echo = SignupForm {
        username: input.username.clone(),
        name: input.name.clone(),
        errors: FormErrors::new(),
    };

    match state.user_service.signup(input).await {
        Ok(user) => start_session(&state, jar, user, "/"),
        Err(AppError::Validation(errors)) => Ok(render_signup(SignupForm { errors, ..echo })),
        Err(e) => Err(e),
    }
}

#[derive(Debug, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    next: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct LoginPage {
    username: String,
    next: Option<String>,
    errors: FormErrors,
}

fn render_login(form: LoginPage) -> Response {
    PageResponse::page("auth/login.html", json!({ "form": form })).into_response()
}

async fn login_form(
    MaybeSessionUser(user): MaybeSessionUser,
    Query(query): Query<NextQuery>,
) -> Response {
    // Already logged in: nothing to do here.
    if user.is_some() {
        return redirect(safe_next(query.next.as_deref()));
    }

    render_login(LoginPage {
        next: query.next,
        ..LoginPage::default()
    })
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            return Ok(render_login(LoginPage {
                errors: FormErrors::single("form", rejection.body_text()),
                ..LoginPage::default()
            }));
        }
    };

    let page = LoginPage {
        username: form.username.clone(),
        next: form.next.clone(),
        errors: FormErrors::new(),
    };
    let input = LoginInput {
        username: form.username,
        password: form.password,
    };

    match state.user_service.login(input).await {
        Ok(user) => {
            let to = safe_next(page.next.as_deref()).to_string();
            start_session(&state, jar, user, &to)
        }
        Err(AppError::Unauthorized) => Ok(render_login(LoginPage {
            errors: FormErrors::single(
                "form",
                "Please enter a correct username and password.",
            ),
            ..page
        })),
        Err(AppError::Validation(errors)) => Ok(render_login(LoginPage { errors, ..page })),
        Err(e) => Err(e),
    }
}

async fn logout(
    MaybeSessionUser(user): MaybeSessionUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(user) = user {
        state.user_service.logout(&user).await?;
        tracing::debug!(user_id = %user.id, "User logged out");
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, redirect("/")).into_response())
}
