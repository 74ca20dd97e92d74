use actix_web::web;

use crate::ws::{controller, display};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(display::upgrade)))
        .service(web::resource("/ws/controller").route(web::get().to(controller::upgrade)));
}
