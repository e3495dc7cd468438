use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::{
        request::{StartQuizRequest, SubmitAnswerRequest},
        response::ApiResponse,
    },
};

#[post("/api/quizzes")]
async fn start_quiz(
    state: web::Data<AppState>,
    request: web::Json<StartQuizRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    log::info!(
        "[{}] Starting quiz on '{}'",
        get_request_id(&req).unwrap_or_default(),
        request.topic
    );

    let session = state.quiz_service.start_quiz(request).await.inspect_err(|e| {
        log::error!(
            "[{}] Could not start quiz: {}",
            get_request_id(&req).unwrap_or_default(),
            e
        );
    })?;

    Ok(HttpResponse::Created().json(ApiResponse {
        data: session,
        message: "Quiz started".to_string(),
    }))
}

#[get("/api/quizzes/{id}")]
async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.quiz_service.get_session(&id).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[get("/api/quizzes/{id}/question")]
async fn current_question(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let question = state.quiz_service.current_question(&id).await?;
    Ok(HttpResponse::Ok().json(question))
}

#[post("/api/quizzes/{id}/answers")]
async fn submit_answer(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    request: web::Json<SubmitAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let feedback = state
        .quiz_service
        .submit_answer(&id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(feedback))
}

#[get("/api/quizzes/{id}/report")]
async fn get_report(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let report = state.quiz_service.report(&id).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[delete("/api/quizzes/{id}")]
async fn discard_session(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let response = state.quiz_service.discard(&id).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Reports unreadable JSON bodies in the same shape as every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        log::warn!(
            "[{}] Rejected request body: {}",
            get_request_id(req).unwrap_or_default(),
            err
        );
        AppError::ValidationError(format!("invalid request body: {}", err)).into()
    })
}

/// Registers every quiz route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(start_quiz)
        .service(get_session)
        .service(current_question)
        .service(submit_answer)
        .service(get_report)
        .service(discard_session);
}
