use actix_web::dev::Server;
use actix_web::error::JsonPayloadError;
use actix_web::{web, App, HttpRequest, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthGate, AuthService, SystemClock, TokenCodec};
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::middleware::{JwtMiddleware, TraceIdMiddleware};
use crate::routes::{current_user, health_check, login, refresh, register};
use crate::users::UserRepository;

pub fn run(
    listener: TcpListener,
    users: Arc<dyn UserRepository>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let codec = TokenCodec::new(&settings.auth.secret_key, Arc::new(SystemClock));
    let auth_service = web::Data::new(AuthService::new(users.clone(), codec.clone(), &settings.auth));
    let gate = Arc::new(AuthGate::new(codec, users));
    let app_settings = web::Data::new(settings.application.clone());
    let base_path = settings.application.base_path();

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(TraceIdMiddleware)

            // Shared state
            .app_data(auth_service.clone())
            .app_data(app_settings.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error))

            .service(
                web::scope(&base_path)
                    .route("/health", web::get().to(health_check))
                    .service(
                        web::scope("/auth")
                            // Public routes
                            .route("/register", web::post().to(register))
                            .route("/login", web::post().to(login))
                            .route("/refresh", web::post().to(refresh))
                            // Protected routes
                            .service(
                                web::resource("/me")
                                    .wrap(JwtMiddleware::new(gate.clone()))
                                    .route(web::get().to(current_user)),
                            ),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Unparseable JSON bodies get the same error shape as every other failure
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(ValidationError::InvalidFormat(format!("request body ({})", err))).into()
}
