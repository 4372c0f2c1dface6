pub mod rest;

use axum::{
    extract::Request,
    response::Html,
};
use axum_macros::debug_handler;

use crate::middleware::request_id::request_id;

#[debug_handler]
pub async fn root(request: Request) -> Html<&'static str> {
    tracing::info!(
        request_id = request_id(&request),
        uri = %request.uri(),
        "home page requested"
    );
    Html("<h1>Hello World!</h1>")
}
