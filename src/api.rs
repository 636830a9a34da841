use std::sync::Arc;

use axum::{
    Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartError, rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    clients::{
        smtp::MailTransport,
        template::{DEFAULT_BODY_TEMPLATE, TemplateRenderer},
    },
    config::Config,
    dispatcher::{CampaignRequest, Dispatcher},
    error::CampaignError,
    models::{
        contact::Contact,
        credentials::{Credentials, sender_name_from_address},
        health::HealthCheckResponse,
        response::{ApiResponse, CampaignResponse, PreviewResponse},
        template::{Sender, Template},
    },
    workspace::CampaignWorkspace,
};

pub struct AppState {
    config: Config,
    transport: Arc<dyn MailTransport>,
    dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(config: Config, transport: Arc<dyn MailTransport>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&transport),
            config.dispatch_settings(),
        ));

        Self {
            config,
            transport,
            dispatcher,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/test-connection", post(test_connection))
        .route("/api/preview-email", post(preview_email))
        .route("/api/send-emails", post(send_emails))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config, transport: Arc<dyn MailTransport>) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = router(Arc::new(AppState::new(config, transport)));

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Campaign server started");

    axum::serve(listener, app).await?;

    Ok(())
}

fn failure(status: StatusCode, error: String, message: &str) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error(error, message.to_string())),
    )
        .into_response()
}

fn invalid_json(rejection: JsonRejection) -> Response {
    warn!(error = %rejection.body_text(), "Rejected request body");
    failure(
        StatusCode::BAD_REQUEST,
        rejection.body_text(),
        "No data provided",
    )
}

async fn health_check() -> impl IntoResponse {
    Json(HealthCheckResponse::healthy(env!("CARGO_PKG_NAME")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub app_password: String,
}

async fn test_connection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TestConnectionRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_json(rejection),
    };

    if request.email.trim().is_empty() || request.app_password.is_empty() {
        return failure(
            StatusCode::BAD_REQUEST,
            "missing_credentials".to_string(),
            "Email and password required",
        );
    }

    let credentials = Credentials::new(request.email.trim(), request.app_password);

    match state.transport.verify(&credentials).await {
        Ok(()) => Json(ApiResponse::<()>::message("Connection successful".to_string()))
            .into_response(),
        Err(e) => {
            warn!(kind = %e.kind, "Connection test failed");
            failure(StatusCode::BAD_REQUEST, e.kind.to_string(), &e.user_message())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub hr_name: Option<String>,
    pub company: Option<String>,
    pub sender_email: Option<String>,
    pub sender_name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

async fn preview_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_json(rejection),
    };

    let sender_email = request
        .sender_email
        .unwrap_or_else(|| "sender@example.com".to_string());

    let template = Template::new(
        request
            .subject
            .unwrap_or_else(|| state.config.default_subject.clone()),
        request
            .body
            .unwrap_or_else(|| DEFAULT_BODY_TEMPLATE.to_string()),
    );

    let contact = Contact::new(
        request.hr_name.unwrap_or_else(|| "John Doe".to_string()),
        "preview@example.com",
        request.company.unwrap_or_else(|| "TechCorp Inc".to_string()),
    );

    let sender = Sender {
        name: request
            .sender_name
            .unwrap_or_else(|| sender_name_from_address(&sender_email)),
        email: sender_email,
    };

    match TemplateRenderer.render(&template, &contact, &sender) {
        Ok(rendered) => Json(ApiResponse::success(
            PreviewResponse {
                subject: rendered.subject,
                body: rendered.body,
            },
            "Preview generated".to_string(),
        ))
        .into_response(),
        Err(e) => failure(
            StatusCode::BAD_REQUEST,
            e.to_string(),
            "Error generating preview",
        ),
    }
}

#[derive(Debug, Default)]
struct CampaignForm {
    account: Option<String>,
    secret: Option<String>,
    subject: Option<String>,
    body: Option<String>,
    sender_name: Option<String>,
    has_contacts: bool,
    has_attachment: bool,
}

async fn read_campaign_form(
    mut multipart: Multipart,
    workspace: &mut CampaignWorkspace,
) -> Result<CampaignForm, Response> {
    let multipart_failure = |e: MultipartError| failure(e.status(), e.body_text(), "Invalid form data");
    let io_failure = |e: std::io::Error| {
        error!(error = %e, "Failed to store upload");
        failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
            "Failed to store upload",
        )
    };

    let mut form = CampaignForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_failure)? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            "gmailEmail" => form.account = Some(field.text().await.map_err(multipart_failure)?),
            "gmailPassword" => form.secret = Some(field.text().await.map_err(multipart_failure)?),
            "emailSubject" => form.subject = Some(field.text().await.map_err(multipart_failure)?),
            "emailBody" => form.body = Some(field.text().await.map_err(multipart_failure)?),
            "senderName" => {
                form.sender_name = Some(field.text().await.map_err(multipart_failure)?)
            }
            "contacts" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_failure)?;
                workspace
                    .store_contacts(&filename, &data)
                    .await
                    .map_err(io_failure)?;
                form.has_contacts = true;
            }
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_failure)?;
                workspace
                    .store_attachment(&filename, &data)
                    .await
                    .map_err(io_failure)?;
                form.has_attachment = true;
            }
            _ => continue,
        }
    }

    Ok(form)
}

async fn send_emails(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let mut workspace = match CampaignWorkspace::create() {
        Ok(workspace) => workspace,
        Err(e) => {
            error!(error = %e, "Failed to create campaign workspace");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "Server error",
            );
        }
    };

    let form = match read_campaign_form(multipart, &mut workspace).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let (Some(account), Some(secret), true, true) = (
        form.account.filter(|a| !a.trim().is_empty()),
        form.secret.filter(|s| !s.is_empty()),
        form.has_contacts,
        form.has_attachment,
    ) else {
        return failure(
            StatusCode::BAD_REQUEST,
            "missing_fields".to_string(),
            "Missing required data: gmailEmail, gmailPassword, contacts, resume",
        );
    };

    let subject = form
        .subject
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.config.default_subject.clone());
    let template = Template::new(subject, form.body.unwrap_or_default());

    let request = CampaignRequest::new(
        template,
        Credentials::new(account.trim(), secret),
        form.sender_name,
    );

    // Dropping the request future (client went away) cancels the remaining contacts.
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let dispatcher = Arc::clone(&state.dispatcher);
    let worker =
        tokio::spawn(async move { dispatcher.run_campaign(workspace, request, cancel).await });

    let joined = worker.await;
    let _ = guard.disarm();

    match joined {
        Ok(Ok(run)) => {
            let report = &run.report;
            let message = format!(
                "Email campaign completed. {}/{} emails sent successfully.",
                report.successful, report.total
            );

            Json(ApiResponse::success(
                CampaignResponse::new(report, run.rejected),
                message,
            ))
            .into_response()
        }
        Ok(Err(e @ (CampaignError::Ingest(_) | CampaignError::MissingBody))) => failure(
            StatusCode::BAD_REQUEST,
            e.to_string(),
            "Campaign could not start",
        ),
        Ok(Err(e)) => {
            error!(error = %e, "Campaign failed before dispatch");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "Server error",
            )
        }
        Err(e) => {
            error!(error = %e, "Campaign worker crashed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                "Server error",
            )
        }
    }
}
