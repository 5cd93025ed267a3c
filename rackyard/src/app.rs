use std::sync::Arc;
use std::{env, fs};

use actix_cors::Cors;
use actix_web::http;
use deadpool_sqlite::Pool;
use toml::Value;

use crate::db;

#[derive(Clone)]
pub struct App {
    pub config: Value,
    pub db_pool: Arc<Pool>,
}

impl App {
    pub fn new() -> Self {
        dotenv::dotenv().ok();

        let env = env::var("ENV").expect("ENV must be set");
        let config_file = format!("config.{}.toml", env);
        let contents = fs::read_to_string(config_file).expect("Unable to read file");
        let config = contents.parse::<Value>().expect("Unable to parse TOML");

        let db_pool = db::init_pool(&config);

        Self {
            config,
            db_pool: Arc::new(db_pool),
        }
    }

    /// Init processes that need to be run on startup
    pub async fn init(&self) {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

        db::run_migrations(&self.db_pool)
            .await
            .unwrap_or_else(|e| panic!("Could not run schema migrations.\n{}", e));
    }

    pub fn cors(&self) -> Cors {
        let allowed_origin = self.config["allowed_origin"]
            .as_str()
            .expect("Missing allowed_origin")
            .to_string();

        Cors::default()
            .allowed_origin(allowed_origin.as_str())
            .allowed_methods(vec!["GET", "PUT"])
            .allowed_headers(vec![http::header::ACCEPT, http::header::CONTENT_TYPE])
            .max_age(3600)
    }

    pub fn port(&self) -> u16 {
        self.config["port"].as_integer().expect("Missing port") as u16
    }
}
