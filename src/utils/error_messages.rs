//! Represents all possible errors in the application

use axum::response::{Html, IntoResponse, Redirect, Response};
use http::StatusCode;
use log::error;
use thiserror::Error;

use crate::database::DBError;

pub const LOGIN_ERROR: &str = "Please enter a correct username and password.";

pub const INTERNAL_ERROR: &str = "Internal Server Error";

const NOT_FOUND_PAGE: &str = include_str!("../../templates/404.hbs");

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Page not found")]
    NotFound,

    #[error("Malformed payload")]
    MalformedPayload,

    /// L'utilisateur doit se connecter; contient le chemin à reprendre ensuite
    #[error("Login required")]
    LoginRequired(String),

    #[error(transparent)]
    Database(#[from] DBError),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Upload error: {0}")]
    Upload(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound
            | AppError::Database(
                DBError::InvalidUserID(_) | DBError::InvalidPostID(_) | DBError::InvalidGroupID(_),
            ) => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),

            AppError::MalformedPayload => {
                (StatusCode::BAD_REQUEST, Html("<h1>Bad Request</h1>")).into_response()
            }

            AppError::LoginRequired(next) => {
                let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
                Redirect::to(&format!("/auth/login/?next={next}")).into_response()
            }

            other => {
                error!("{other}");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("<h1>{INTERNAL_ERROR}</h1>")))
                    .into_response()
            }
        }
    }
}
