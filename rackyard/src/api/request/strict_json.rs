use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use log::error;
use serde::de::DeserializeOwned;

use crate::errors::RackyardError;

/// Strict replacement for `web::Json`: the declared content type and a
/// non-empty body are part of the request contract here, and violations
/// must surface as 400s from our own error type.
pub struct StrictJson<T>(pub T);

impl<T> StrictJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> FromRequest for StrictJson<T> {
    type Error = RackyardError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let content_type = req.content_type().to_string();
        let bytes_fut = web::Bytes::from_request(req, payload);

        Box::pin(async move {
            if content_type != "application/json" {
                return Err(RackyardError::InvalidContentType(content_type));
            }

            let bytes = bytes_fut.await.map_err(|e| {
                error!("Could not read request body. {}", e);

                RackyardError::ValidationError(("body".to_string(), e.to_string()))
            })?;

            if bytes.is_empty() {
                return Err(RackyardError::MissingBody);
            }

            serde_json::from_slice(&bytes)
                .map(StrictJson)
                .map_err(|e| RackyardError::ValidationError(("body".to_string(), e.to_string())))
        })
    }
}
