use crate::tree_view::escape_html;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid path")]
    InvalidPath,

    #[error("Only .md and .markdown files are allowed")]
    DisallowedExtension,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("failed to scan directory tree: {0}")]
    Scan(#[from] ignore::Error),

    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to render template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl AppError {
    /// Text shown to the client. Internal faults never expose their details.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidPath | AppError::DisallowedExtension | AppError::NotFound(_) => {
                self.to_string()
            }
            AppError::Read(_) => "The file could not be read".to_string(),
            AppError::Scan(_) | AppError::Template(_) | AppError::Blocking(_) => {
                "The page could not be rendered".to_string()
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidPath | AppError::DisallowedExtension => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Scan(_) | AppError::Read(_) | AppError::Template(_) | AppError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let reason = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\n<body>\n<h1>{reason}</h1>\n<p>{message}</p>\n</body>\n</html>\n",
            code = status.as_u16(),
            reason = reason,
            message = escape_html(&self.public_message()),
        );
        HttpResponse::build(status)
            .insert_header(ContentType::html())
            .body(body)
    }
}
