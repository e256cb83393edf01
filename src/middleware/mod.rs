pub mod admin;
pub mod auth;
pub mod extract;
pub mod response;

pub use admin::admin_credentials_middleware;
pub use auth::{jwt_auth_middleware, AuthUser};
pub use extract::{AppJson, AppQuery};
pub use response::{ApiResponse, ApiResult};
