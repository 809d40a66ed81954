use actix_cors::Cors;

/// The gateway is called from arbitrary client sites: any origin, method and header.
pub fn middleware() -> Cors {
    Cors::permissive().max_age(3600)
}
