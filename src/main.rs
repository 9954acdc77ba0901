use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use tasklane::auth::AuthMiddleware;
use tasklane::config::Config;
use tasklane::reset::{self, AppResetService, PgCredentialStore, PgResetCodeStore, ResetService};
use tasklane::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // The delivery worker outlives every request; handlers only ever push
    // onto its queue.
    let delivery = reset::spawn_delivery_worker();
    let reset_service: web::Data<AppResetService> = web::Data::new(ResetService::new(
        PgResetCodeStore::new(pool.clone()),
        PgCredentialStore::new(pool.clone()),
        delivery,
    ));

    log::info!("Starting Tasklane server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(reset_service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
