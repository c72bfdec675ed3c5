// Route exports
pub mod queue;

use actix_web::web;

pub use queue::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(queue::configure),
    );
}
