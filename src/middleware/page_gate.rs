//! Filtro de páginas
//!
//! Comprobación de cookie delante de las rutas de páginas. Solo decide a
//! dónde va el navegador; cada handler sigue comprobando el rol.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::middleware::auth::{cookie_value, ACCESS_TOKEN_COOKIE};

pub const LOGIN_PAGE: &str = "/auth/login";
pub const DASHBOARD_PAGE: &str = "/dashboard";

fn is_protected_page(path: &str) -> bool {
    path.starts_with("/admin") || path.starts_with("/dashboard")
}

fn is_auth_page(path: &str) -> bool {
    path == "/auth" || path.starts_with("/auth/")
}

/// A dónde redirigir el navegador, si procede
pub fn redirect_target(path: &str, has_session_cookie: bool) -> Option<&'static str> {
    if is_protected_page(path) && !has_session_cookie {
        Some(LOGIN_PAGE)
    } else if is_auth_page(path) && has_session_cookie {
        Some(DASHBOARD_PAGE)
    } else {
        None
    }
}

pub async fn page_gate(request: Request, next: Next) -> Response {
    let has_cookie = cookie_value(request.headers(), ACCESS_TOKEN_COOKIE)
        .map_or(false, |token| !token.is_empty());

    match redirect_target(request.uri().path(), has_cookie) {
        Some(target) => Redirect::temporary(target).into_response(),
        None => next.run(request).await,
    }
}
