use actix_web::HttpResponse;

use crate::errors::RackyardError;

pub type Response = Result<HttpResponse, RackyardError>;
