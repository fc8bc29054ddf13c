use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use std::io;
use std::sync::Arc;

use taskforge::{
    auth::{AuthMiddleware, PasswordHasher, TokenService},
    db,
    routes,
    services::{IdentityService, TaskService},
    store::{PgTaskStore, PgUserStore},
    AppError, Config,
};

fn to_io(err: AppError) -> io::Error {
    error!("startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(to_io)?;

    let pool = db::connect(&config.database).await.map_err(to_io)?;
    db::migrate(&pool).await.map_err(to_io)?;

    let tokens = TokenService::from_config(&config.auth);
    let hasher = PasswordHasher::new(config.auth.bcrypt_cost).map_err(to_io)?;
    let identity = IdentityService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        hasher,
        tokens.clone(),
    );
    let tasks = TaskService::new(Arc::new(PgTaskStore::new(pool.clone())));

    if let Some(seed) = &config.default_user {
        let created = identity
            .ensure_user(&seed.username, &seed.username, &seed.password)
            .await
            .map_err(to_io)?;
        if created {
            info!("created default account {}", seed.username);
        }
    }

    let identity = web::Data::new(identity);
    let tasks = web::Data::new(tasks);

    info!("Starting TaskForge server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(identity.clone())
            .app_data(tasks.clone())
            .service(routes::health::health)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware::new(tokens.clone()))
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    pool.close().await;
    info!("server stopped");
    Ok(())
}
