mod api;
mod app;
mod constants;
mod db;
mod errors;
mod models;

use actix_web::middleware::Logger;
use actix_web::{web, App as ActixWebApp, HttpServer};
use app::App;

#[tokio::main]
async fn main() {
    let app = App::new();
    let port = app.port();

    app.init().await;

    let app_web_data = web::Data::new(app);
    let db_pool_web_data = web::Data::from(app_web_data.db_pool.clone());

    HttpServer::new(move || {
        ActixWebApp::new()
            .wrap(Logger::new("%a %r %s %b %T"))
            .wrap(app_web_data.cors())
            .app_data(app_web_data.clone())
            .app_data(db_pool_web_data.clone())
            .configure(api::configure)
    })
    .bind(("0.0.0.0", port))
    .unwrap_or_else(|e| panic!("Could not bind to port {}.\n{}", port, e))
    .run()
    .await
    .unwrap_or_else(|e| panic!("Could not run server on port {}.\n{}", port, e));
}
