use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    response::Redirect,
    routing::{get, get_service, post},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use cic_website::config::Config;
use cic_website::web::middleware::auth as auth_middleware;
use cic_website::web::routes::{
    admin, admin_donations, admin_events, admin_subscribers, admin_surveys, auth, donate, events,
    pages, registration, subscribe, surveys,
};
use cic_website::{database, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Arc::new(Config::from_env());

    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://site.db".to_string());
    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Cannot connect to database");
    database::init_schema(&pool)
        .await
        .expect("Schema bootstrap failed");

    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Back-office, everything behind the session cookie check.
    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard_handler))
        .route("/admin/pages", get(admin::pages_handler).post(admin::save_page_handler))
        .route(
            "/admin/events",
            get(admin_events::list_events_handler).post(admin_events::create_event_handler),
        )
        .route("/admin/events/:event_id", post(admin_events::update_event_handler))
        .route(
            "/admin/events/:event_id/status",
            post(admin_events::set_event_status_handler),
        )
        .route(
            "/admin/events/:event_id/registrations",
            get(admin_events::list_registrations_handler),
        )
        .route(
            "/admin/events/:event_id/registrations.csv",
            get(admin_events::registrations_csv_handler),
        )
        .route(
            "/admin/registrations/:registration_id/cancel",
            post(admin_events::cancel_registration_handler),
        )
        .route(
            "/admin/registrations/:registration_id/promote",
            post(admin_events::promote_registration_handler),
        )
        .route("/admin/donations", get(admin_donations::list_donations_handler))
        .route("/admin/donations.csv", get(admin_donations::donations_csv_handler))
        .route(
            "/admin/surveys",
            get(admin_surveys::list_surveys_handler).post(admin_surveys::create_survey_handler),
        )
        .route(
            "/admin/surveys/:survey_id",
            get(admin_surveys::survey_analytics_handler)
                .post(admin_surveys::update_survey_handler),
        )
        .route(
            "/admin/subscribers",
            get(admin_subscribers::list_subscribers_handler),
        )
        .route(
            "/admin/subscribers/email",
            post(admin_subscribers::bulk_email_handler),
        )
        .route("/admin/logout", post(auth::logout_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_admin,
        ));

    let app = Router::new()
        // Public site
        .route("/", get(|| async { Redirect::to("/events") }))
        .route("/events", get(events::events_handler))
        .route("/events/:event_id", get(events::event_detail_handler))
        .route("/donate", get(donate::donate_page_handler))
        .route("/pages/:slug", get(pages::page_handler))
        .route(
            "/registrations/:token/cancel",
            get(registration::cancel_registration_handler),
        )
        .route(
            "/registrations/:token/confirm",
            get(registration::confirm_attendance_handler),
        )
        .route("/unsubscribe/:token", get(subscribe::unsubscribe_handler))
        // Public JSON API
        .route(
            "/api/events/:event_id/registrations",
            post(registration::create_registration_handler),
        )
        .route("/api/subscribe", post(subscribe::subscribe_handler))
        .route(
            "/api/surveys/:survey_id/responses",
            post(surveys::submit_response_handler),
        )
        .route("/api/donate/checkout", post(donate::checkout_handler))
        .route("/api/stripe/webhook", post(donate::stripe_webhook_handler))
        // Admin login stays outside the auth layer
        .route(
            "/admin/login",
            get(auth::login_page).post(auth::login_handler),
        )
        .merge(admin_routes)
        // Static files
        .nest_service("/assets", get_service(ServeDir::new("assets")))
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // State
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Cannot parse host/port");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Cannot bind listener");

    let bound_addr = listener.local_addr().unwrap();
    println!(
        "🚀 Server running on http://{} (build {})",
        bound_addr,
        env!("SITE_BUILD_ID")
    );

    axum::serve(listener, app).await.unwrap();
}
