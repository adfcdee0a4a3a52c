use axum::response::Html;

/// Handle GET / - the single page
///
/// The page is embedded at compile time; there is no asset pipeline.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_serves_the_form() {
        let Html(body) = index().await;
        assert!(body.contains("Predict Price"));
        assert!(body.contains("/api/v1/predict"));
    }
}
