use actix_web::web;

pub mod routes {
    pub mod usage;
}

mod service {
    pub(crate) mod usage;
}
mod dtos {
    pub(crate) mod usage;
}

pub fn mount_usage() -> actix_web::Scope {
    web::scope("/usage").service(routes::usage::get_usage)
}
