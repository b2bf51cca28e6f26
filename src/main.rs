mod auth;
mod config;
mod db;
mod domain;
mod dto;
mod entity;
mod error;
mod guard;
mod response;
mod routes;
mod services;
mod store;

use actix_web::{middleware, web, App, HttpServer};
use config::AppConfig;
use db::connect_db;
use log::info;
use response::json_error_handler;
use routes::{
    authentication, avatar, block_producer, comment, cors, email, like, moderation, password,
    profile, registration, user,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let config = AppConfig::from_env();
    let db = connect_db(&config).await;
    let server_port = config.server_port;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(middleware::Logger::default())
            .wrap(actix_web::middleware::from_fn(cors::cors_handler))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/users")
                            .configure(registration::config)
                            .configure(password::config)
                            .configure(email::config)
                            .configure(profile::config)
                            .configure(avatar::user_config)
                            .configure(user::config),
                    )
                    .service(web::scope("/authentication").configure(authentication::config))
                    .service(
                        web::scope("/block-producers")
                            .configure(like::config)
                            .configure(comment::config)
                            .configure(avatar::block_producer_config)
                            .configure(moderation::config)
                            .configure(block_producer::config),
                    ),
            )
    })
    .bind(("0.0.0.0", server_port))?;
    info!("server started at http://0.0.0.0:{}", server_port);
    server.run().await
}
