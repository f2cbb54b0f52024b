use actix_web::{error, middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::roster::parse_date;
use crate::schedule::{build_schedule, ScheduleInput, ScheduleOutcome, StatusBoard};

/// The most recent run, kept with the inputs that produced it
pub struct StoredRun {
    pub input: ScheduleInput,
    pub config: EngineConfig,
    pub outcome: ScheduleOutcome,
}

// In-memory storage; a new POST replaces the previous run
pub struct AppState {
    pub run: Mutex<Option<StoredRun>>,
    pub default_config: EngineConfig,
    pub admin_password: String,
}

impl AppState {
    pub fn new(default_config: EngineConfig, admin_password: String) -> Self {
        Self {
            run: Mutex::new(None),
            default_config,
            admin_password,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub input: ScheduleInput,
    /// Falls back to the server's configuration when absent
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

#[derive(Serialize)]
struct RunSummary {
    success: bool,
    sundays: usize,
    filled: usize,
    unfilled: usize,
}

fn lock_poisoned<T>(_: T) -> actix_web::Error {
    error::ErrorInternalServerError("schedule state is unavailable")
}

fn not_built() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "No schedule has been built yet"}))
}

// Admin endpoint: build a schedule from posted inputs
async fn post_schedule(
    req: HttpRequest,
    body: web::Json<ScheduleRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if password != state.admin_password {
        warn!("rejected schedule request with bad admin password");
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let ScheduleRequest { input, config } = body.into_inner();
    let config = config.unwrap_or_else(|| state.default_config.clone());

    match build_schedule(&input, config.clone()) {
        Ok(outcome) => {
            let summary = RunSummary {
                success: true,
                sundays: outcome.days.len(),
                filled: outcome.assignments.len(),
                unfilled: outcome.gaps.len(),
            };
            info!(filled = summary.filled, unfilled = summary.unfilled, "stored new schedule");
            *state.run.lock().map_err(lock_poisoned)? = Some(StoredRun { input, config, outcome });
            Ok(HttpResponse::Ok().json(summary))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": e.to_string()
        }))),
    }
}

async fn get_schedule(state: web::Data<AppState>) -> Result<HttpResponse> {
    let run = state.run.lock().map_err(lock_poisoned)?;
    match run.as_ref() {
        Some(run) => Ok(HttpResponse::Ok().json(&run.outcome)),
        None => Ok(not_built()),
    }
}

async fn get_gaps(state: web::Data<AppState>) -> Result<HttpResponse> {
    let run = state.run.lock().map_err(lock_poisoned)?;
    match run.as_ref() {
        Some(run) => Ok(HttpResponse::Ok().json(&run.outcome.gaps)),
        None => Ok(not_built()),
    }
}

async fn get_status(date: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let date = match parse_date(&date) {
        Ok(date) => date,
        Err(e) => return Ok(HttpResponse::BadRequest().json(serde_json::json!({"error": e.to_string()}))),
    };

    let run = state.run.lock().map_err(lock_poisoned)?;
    let Some(run) = run.as_ref() else {
        return Ok(not_built());
    };
    let board = StatusBoard::new(&run.input, &run.config, &run.outcome).map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(board.report(date)))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/schedule", web::post().to(post_schedule))
        .route("/api/schedule", web::get().to(get_schedule))
        .route("/api/gaps", web::get().to(get_gaps))
        .service(web::resource("/api/status/{date}").route(web::get().to(get_status)));
}

pub async fn start_server(port: u16, default_config: EngineConfig, admin_password: String) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(default_config, admin_password));

    info!(port, "starting web server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Person, Role};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::NaiveDate;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn request() -> ScheduleRequest {
        ScheduleRequest {
            input: ScheduleInput {
                roster: vec![
                    Person::new("A", [Role::WorshipLeader, Role::Backup]),
                    Person::new("B", [Role::WorshipLeader]).with_blockout(day(4, 13)),
                    Person::new("C", [Role::Backup]),
                ],
                calendar: vec![day(4, 6), day(4, 13)],
                rotation: vec!["A".into(), "B".into()],
                ..Default::default()
            },
            config: Some(EngineConfig {
                roles: vec![Role::WorshipLeader, Role::Backup],
                seed: Some(4),
                ..Default::default()
            }),
        }
    }

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(EngineConfig::default(), "secret".to_string()))
    }

    #[actix_web::test]
    async fn schedule_requires_admin_password() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .insert_header(("X-Admin-Password", "wrong"))
            .set_json(request())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get().uri("/api/schedule").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn built_schedule_is_served_back() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .insert_header(("X-Admin-Password", "secret"))
            .set_json(request())
            .to_request();
        let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["success"], true);
        assert_eq!(summary["sundays"], 2);

        let req = test::TestRequest::get().uri("/api/schedule").to_request();
        let outcome: ScheduleOutcome = test::call_and_read_body_json(&app, req).await;
        assert_eq!(outcome.days.len(), 2);
        assert_eq!(outcome.assignments.len() + outcome.gaps.len(), 4);

        let req = test::TestRequest::get().uri("/api/status/2025-04-13").to_request();
        let report: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report[1]["person"], "B");
        assert_eq!(report[1]["status"]["status"], "blocked_out");

        let req = test::TestRequest::get().uri("/api/status/13-04-2025").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn invalid_inputs_are_reported_not_stored() {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let mut body = request();
        body.input.calendar.clear();
        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .insert_header(("X-Admin-Password", "secret"))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let mut body = request();
        if let Some(config) = body.config.as_mut() {
            config.consecutive_sunday_limit = u32::MAX;
        }
        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .insert_header(("X-Admin-Password", "secret"))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let mut body = request();
        body.input.calendar = vec![day(4, 6), day(4, 12)];
        let req = test::TestRequest::post()
            .uri("/api/schedule")
            .insert_header(("X-Admin-Password", "secret"))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/gaps").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
