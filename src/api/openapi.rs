//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::user_handler;
use crate::domain::{PatchDocument, PatchOperation, User};

/// OpenAPI documentation for the user accounts API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BBank Users API",
        version = "0.1.0",
        description = "User registration, login and record management",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        user_handler::get_user,
        user_handler::register,
        user_handler::login,
        user_handler::replace_user,
        user_handler::patch_user,
        user_handler::delete_user,
    ),
    components(
        schemas(
            User,
            PatchOperation,
            PatchDocument,
            user_handler::RegisterRequest,
            user_handler::LoginRequest,
        )
    ),
    tags(
        (name = "Users", description = "User registration, login and management")
    )
)]
pub struct ApiDoc;
