use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Assignment Bot API",
        version = "1.0.0",
        description = "Users and their assignments, the same data the chat bot manages.\n\n**Authentication:** every `/v1` endpoint requires an `api_key` header. Admin keys may read and write; read-only keys may only use GET."
    ),
    paths(
        crate::api::health::health_check,
        crate::api::users::get_overview,
        crate::api::users::get_users,
        crate::api::users::create_user,
        crate::api::users::get_assignments,
        crate::api::users::user_exists,
        crate::api::users::add_assignment,
        crate::api::users::delete_user,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::users::DeleteUserResponse,
            crate::models::UserOverview,
            crate::models::CreateUserRequest,
            crate::models::AddAssignmentRequest,
            crate::models::ActionResponse,
        )
    ),
    tags(
        (name = "Users", description = "Users and assignments."),
        (name = "Health", description = "Service and record store status."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("api_key"))),
            );
        }
    }
}
