use actix_web::{HttpResponse, Responder, http::header};
use serde::Serialize;

use super::error::Res;

pub struct Success;
impl Success {
    pub fn ok<T: Serialize>(body: T) -> Res<impl Responder> {
        Result::Ok(HttpResponse::Ok().json(body))
    }
    /// Takes the location by value so the response never borrows from the caller.
    pub fn see_other(location: String) -> Res<impl Responder> {
        Result::Ok(
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, location))
                .finish(),
        )
    }
}
