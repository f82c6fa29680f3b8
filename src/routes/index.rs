use axum::response::Html;
use axum::routing::get;
use axum::Router;

/// GET / - the landing page.
async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

pub fn router() -> Router {
    Router::new().route("/", get(index))
}
