pub mod request;
pub mod types;

mod node_api;
mod role_api;


pub use node_api::*;
pub use role_api::*;

use actix_web::web;

/// Route table, shared between the server binary and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/environments/{environment_id}/nodes")
            .service(get_node)
            .service(update_node)
            .service(get_node_roles)
            .service(update_node_roles)
            .service(
                web::resource(["", "/"])
                    .route(web::get().to(get_nodes))
                    .route(web::put().to(update_node_missing_name)),
            ),
    );
}
