use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// `Json` whose rejections render as `ApiError` bodies
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejections render as `ApiError` bodies
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);
