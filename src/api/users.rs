use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    commands::deletion_message,
    models::{ActionResponse, AddAssignmentRequest, CreateUserRequest, UserOverview},
    services::user_service::{AddUserOutcome, AssignmentOutcome, UserRepository},
    utils::AppError,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteUserResponse {
    pub success: bool,
    pub deleted: u64,
    pub message: String,
}

/// GET /v1/overview - nome e quantidade de assignments de cada usuário
#[utoipa::path(
    get,
    path = "/v1/overview",
    tag = "Users",
    responses(
        (status = 200, description = "Every user with its assignment count", body = [UserOverview]),
        (status = 403, description = "Missing or invalid api_key")
    ),
    security(("api_key" = []))
)]
pub async fn get_overview(repo: web::Data<UserRepository>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /v1/overview");

    let overview = repo.list_overview().await?;
    Ok(HttpResponse::Ok().json(overview))
}

/// GET /v1/users - nomes em ordem de armazenamento
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "User names in storage order", body = [String]),
        (status = 403, description = "Missing or invalid api_key")
    ),
    security(("api_key" = []))
)]
pub async fn get_users(repo: web::Data<UserRepository>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /v1/users");

    let names = repo.list_user_names().await?;
    Ok(HttpResponse::Ok().json(names))
}

/// POST /v1/users - cria usuário se ainda não existir
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ActionResponse),
        (status = 200, description = "User already existed, nothing changed", body = ActionResponse),
        (status = 400, description = "Empty name"),
        (status = 403, description = "api_key is not an admin key")
    ),
    security(("api_key" = []))
)]
pub async fn create_user(
    repo: web::Data<UserRepository>,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /v1/users - name: {}", request.name);

    let name = request.name.trim();
    match repo.add_user(name).await? {
        AddUserOutcome::Created => Ok(HttpResponse::Created().json(ActionResponse {
            success: true,
            message: format!("Added {} to the database.", name),
        })),
        AddUserOutcome::AlreadyExists => Ok(HttpResponse::Ok().json(ActionResponse {
            success: false,
            message: format!("{} is already in the database.", name),
        })),
    }
}

/// GET /v1/users/{name} - assignments ordenadas por due_date
#[utoipa::path(
    get,
    path = "/v1/users/{name}",
    tag = "Users",
    params(("name" = String, Path, description = "User name")),
    responses(
        (status = 200, description = "Formatted assignments, or a single not-found message", body = [String]),
        (status = 403, description = "Missing or invalid api_key")
    ),
    security(("api_key" = []))
)]
pub async fn get_assignments(
    repo: web::Data<UserRepository>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /v1/users/{} - listing assignments", name);

    let listing = repo.list_assignments(&name).await?;
    Ok(HttpResponse::Ok().json(listing.into_lines()))
}

/// HEAD /v1/users/{name} - 200 se o usuário existe, 404 caso contrário
#[utoipa::path(
    head,
    path = "/v1/users/{name}",
    tag = "Users",
    params(("name" = String, Path, description = "User name")),
    responses(
        (status = 200, description = "User exists"),
        (status = 404, description = "No such user"),
        (status = 403, description = "Missing or invalid api_key")
    ),
    security(("api_key" = []))
)]
pub async fn user_exists(
    repo: web::Data<UserRepository>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::debug!("HEAD /v1/users/{}", name);

    if repo.user_exists(&name).await? {
        Ok(HttpResponse::Ok().finish())
    } else {
        Ok(HttpResponse::NotFound().finish())
    }
}

/// POST /v1/users/{name} - adiciona assignment a um usuário existente
#[utoipa::path(
    post,
    path = "/v1/users/{name}",
    tag = "Users",
    params(("name" = String, Path, description = "Owner of the assignment")),
    request_body = AddAssignmentRequest,
    responses(
        (status = 201, description = "Assignment added", body = ActionResponse),
        (status = 404, description = "No such user, nothing changed", body = ActionResponse),
        (status = 403, description = "api_key is not an admin key")
    ),
    security(("api_key" = []))
)]
pub async fn add_assignment(
    repo: web::Data<UserRepository>,
    name: web::Path<String>,
    request: web::Json<AddAssignmentRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /v1/users/{} - assignment: {}", name, request.name);

    let outcome = repo
        .add_assignment(&name, &request.name, request.due_date.as_deref())
        .await?;

    match outcome {
        AssignmentOutcome::Added => Ok(HttpResponse::Created().json(ActionResponse {
            success: true,
            message: format!("Added {} for {}.", request.name.trim(), name),
        })),
        AssignmentOutcome::UnknownUser => Ok(HttpResponse::NotFound().json(ActionResponse {
            success: false,
            message: format!("{} isn't in the database, assignment not added.", name),
        })),
    }
}

/// DELETE /v1/users/{name} - remove usuário e suas assignments
#[utoipa::path(
    delete,
    path = "/v1/users/{name}",
    tag = "Users",
    params(("name" = String, Path, description = "User to delete")),
    responses(
        (status = 200, description = "Deletion count message", body = DeleteUserResponse),
        (status = 403, description = "api_key is not an admin key")
    ),
    security(("api_key" = []))
)]
pub async fn delete_user(
    repo: web::Data<UserRepository>,
    name: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️  DELETE /v1/users/{}", name);

    let deleted = repo.delete_user(&name).await?;
    Ok(HttpResponse::Ok().json(DeleteUserResponse {
        success: deleted > 0,
        deleted,
        message: deletion_message(deleted),
    }))
}
