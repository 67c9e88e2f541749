use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DrawStatus, DrawType};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::draw::list_draws,
        handlers::draw::create_draw,
        handlers::draw::get_draw,
        handlers::draw::update_draw,
        handlers::draw::delete_draw,
        handlers::draw::list_participants,
        handlers::draw::participate,
    ),
    components(
        schemas(
            DrawType,
            DrawStatus,
            CreateDrawRequest,
            UpdateDrawRequest,
            ParticipateRequest,
            DrawResponse,
            DrawSummaryResponse,
            DrawDetailResponse,
            BusinessResponse,
            ParticipationResponse,
            ParticipantResponse,
            ParticipantListResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "draws", description = "Restaurant prize draws API"),
    ),
    info(
        title = "Draws Backend API",
        version = "1.0.0",
        description = "Restaurant prize draws REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
