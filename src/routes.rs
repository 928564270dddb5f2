use crate::{
    api::{dashboard, denial_reason, employee, health, location, vacation_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    HttpRequest,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    middleware::from_fn,
    web,
};
use std::sync::Arc;

// Per-route limiter, refilling one slot every 60s / requests_per_min
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

// Extractor failures use the same `{"error": ...}` body as handler errors
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid JSON body: {err}")).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid query string: {err}")).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid path parameter: {err}")).into()
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(web::resource("/health").route(web::get().to(health::health)));

    // registered before the protected scope so it is matched first
    cfg.service(
        web::resource(format!("{}/login", config.api_prefix))
            .wrap(login_limiter)
            .route(web::post().to(handlers::login)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/locations")
                    .service(
                        web::resource("")
                            .route(web::get().to(location::list_locations))
                            .route(web::post().to(location::create_location)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(location::update_location))
                            .route(web::delete().to(location::delete_location)),
                    ),
            )
            .service(
                web::scope("/denial-reasons")
                    .service(
                        web::resource("")
                            .route(web::get().to(denial_reason::list_denial_reasons))
                            .route(web::post().to(denial_reason::create_denial_reason)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(denial_reason::update_denial_reason))
                            .route(web::delete().to(denial_reason::delete_denial_reason)),
                    ),
            )
            .service(
                web::scope("/vacation-requests")
                    // /vacation-requests
                    .service(
                        web::resource("")
                            .route(web::get().to(vacation_request::list_vacation_requests))
                            .route(web::post().to(vacation_request::create_vacation_request)),
                    )
                    // /vacation-requests/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(vacation_request::approve_vacation_request)),
                    )
                    // /vacation-requests/{id}/deny
                    .service(
                        web::resource("/{id}/deny")
                            .route(web::put().to(vacation_request::deny_vacation_request)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .route("/stats", web::get().to(dashboard::stats))
                    .route("/activity", web::get().to(dashboard::activity)),
            ),
    );
}
