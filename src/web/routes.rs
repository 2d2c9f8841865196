use actix_web::web;

use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/talk", web::post().to(handlers::talk))
            .route("/hello", web::get().to(handlers::hello)),
    )
    .route("/", web::get().to(handlers::index))
    .route("/test", web::get().to(handlers::test_database));
}
