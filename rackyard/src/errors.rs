use actix_web::{HttpResponse, ResponseError};
use colored::Colorize;
use deadpool_sqlite::rusqlite;
use serde_json::json;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum RackyardError {
    // 400s
    MissingBody,
    InvalidContentType(String),
    MissingIdentifier(&'static str),
    MissingRequiredField(&'static str),
    ValidationError((String, String)),
    NotFound(String),
    // 400 | 500
    DbError(rusqlite::Error),
    // 500
    PoolError(String),
    SerdeError(serde_json::Error),
    InternalServerError(String),
}

impl fmt::Display for RackyardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RackyardError::MissingBody => write!(f, "Missing Body"),
            RackyardError::InvalidContentType(received) => {
                write!(f, "Invalid Content-Type: {}", received)
            }
            RackyardError::MissingIdentifier(what) => write!(f, "Missing Identifier: {}", what),
            RackyardError::MissingRequiredField(field) => {
                write!(f, "Missing Required Field: {}", field)
            }
            RackyardError::ValidationError((field, message)) => {
                write!(f, "Validation Error: {}: {}", field, message)
            }
            RackyardError::NotFound(e) => write!(f, "Not Found: {}", e),
            RackyardError::DbError(e) => write!(f, "Db Error: \n{}", e),
            RackyardError::PoolError(e) => write!(f, "Pool Error: \n{}", e),
            RackyardError::SerdeError(e) => write!(f, "Serde Error: \n{}", e),
            RackyardError::InternalServerError(e) => write!(f, "InternalServerError: \n{}", e),
        }
    }
}

impl Error for RackyardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RackyardError::MissingBody => None,
            RackyardError::InvalidContentType(_) => None,
            RackyardError::MissingIdentifier(_) => None,
            RackyardError::MissingRequiredField(_) => None,
            RackyardError::ValidationError(_) => None,
            RackyardError::NotFound(_) => None,
            RackyardError::DbError(e) => Some(e),
            RackyardError::PoolError(_) => None,
            RackyardError::SerdeError(e) => Some(e),
            RackyardError::InternalServerError(_) => None,
        }
    }
}

impl ResponseError for RackyardError {
    fn error_response(&self) -> HttpResponse {
        match self {
            RackyardError::MissingBody => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": "Request body is required"
            })),
            RackyardError::InvalidContentType(received) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": format!("Expected application/json, got '{}'", received)
            })),
            RackyardError::MissingIdentifier(what) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": format!("{} is required", what)
            })),
            RackyardError::MissingRequiredField(field) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": {*field: "is required"}
            })),
            RackyardError::ValidationError((field, message)) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": {field: message}
            })),
            RackyardError::NotFound(e) => HttpResponse::NotFound().json(json!({
                "status": 404,
                "message": e
            })),
            RackyardError::DbError(e) => match e {
                rusqlite::Error::QueryReturnedNoRows => HttpResponse::NotFound().json(json!({
                    "status": 404,
                    "message": e.to_string()
                })),
                _ => RackyardError::InternalServerError(format!("DbError: {}", e)).error_response(),
            },
            _ => {
                println!("Internal Server Error: {}", self.to_string().red());

                HttpResponse::InternalServerError().json(json!({
                    "status": 500,
                    "message": self.to_string()
                }))
            }
        }
    }
}

impl From<rusqlite::Error> for RackyardError {
    fn from(e: rusqlite::Error) -> Self {
        RackyardError::DbError(e)
    }
}

impl From<serde_json::Error> for RackyardError {
    fn from(e: serde_json::Error) -> Self {
        RackyardError::SerdeError(e)
    }
}
