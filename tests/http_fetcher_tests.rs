// HTTP Fetcher Tests
//
// Purpose: Run HttpFetcher against a small axum site bound to 127.0.0.1
// Run with: cargo test --features api --test http_fetcher_tests

#[cfg(feature = "api")]
mod http_tests {
    use axum::{
        http::StatusCode,
        response::Html,
        routing::{get, post},
        Router,
    };
    use programmata::{
        load_catalog, DocumentFetcher, DocumentLoader, FetchError, HttpFetcher, ImagePaths,
        SourceResolver,
    };
    use std::sync::Arc;

    const YOUTH_PASS: &str = r#"<html><head><script type="application/json" id="program-data">
{"id":1,"title":"Youth Pass","ageMin":18,"ageMax":25,"fundFixed":200,"categories":["education"]}
</script></head></html>"#;

    // Helper: Serve a static site on an ephemeral port, returning its base URL
    async fn serve_site() -> String {
        let app = Router::new()
            .route(
                "/programmata/",
                get(|| async { Html(r#"<a href="youth-pass.html">Youth Pass</a>"#) }),
            )
            .route("/programmata/youth-pass.html", get(|| async { Html(YOUTH_PASS) }))
            .route(
                "/programmata/outage.html",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            // Host that refuses HEAD but serves GET
            .route(
                "/programmata/no-head.html",
                get(|| async { Html(YOUTH_PASS) }).head(|| async { StatusCode::METHOD_NOT_ALLOWED }),
            )
            .route("/programmata/post-only.html", post(|| async { "ok" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    // =========================================================================
    // Section 1: Fetching
    // =========================================================================

    #[tokio::test]
    async fn test_fetch_text_returns_body() {
        let fetcher = HttpFetcher::new(&serve_site().await).unwrap();
        let body = fetcher.fetch_text("programmata/youth-pass.html").await.unwrap();
        assert!(body.contains("Youth Pass"));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let fetcher = HttpFetcher::new(&serve_site().await).unwrap();

        match fetcher.fetch_text("programmata/outage.html").await {
            Err(FetchError::Status { status, url }) => {
                assert_eq!(status, 500);
                assert!(url.ends_with("/programmata/outage.html"));
            }
            other => panic!("expected status error, got {:?}", other),
        }

        match fetcher.fetch_text("programmata/gone.html").await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(&format!("http://{}", addr)).unwrap();
        let result = fetcher.fetch_text("programmata/").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
        assert!(!fetcher.exists("programmata/youth-pass.html").await);
    }

    // =========================================================================
    // Section 2: Existence Checks
    // =========================================================================

    #[tokio::test]
    async fn test_exists_uses_head() {
        let fetcher = HttpFetcher::new(&serve_site().await).unwrap();
        assert!(fetcher.exists("programmata/youth-pass.html").await);
        assert!(!fetcher.exists("programmata/gone.html").await);
        assert!(!fetcher.exists("programmata/outage.html").await);
    }

    #[tokio::test]
    async fn test_exists_falls_back_to_get_when_head_is_refused() {
        let fetcher = HttpFetcher::new(&serve_site().await).unwrap();
        assert!(fetcher.exists("programmata/no-head.html").await);
        // GET is refused too, so the fallback reports missing
        assert!(!fetcher.exists("programmata/post-only.html").await);
    }

    // =========================================================================
    // Section 3: Catalog over HTTP
    // =========================================================================

    #[tokio::test]
    async fn test_catalog_builds_from_http_site() {
        let fetcher = Arc::new(HttpFetcher::new(&serve_site().await).unwrap());
        let resolver = SourceResolver::new(fetcher.clone(), "programmata/", Vec::new());
        let loader = DocumentLoader::new(fetcher, ImagePaths::default());

        let state = load_catalog(&resolver, &loader).await;
        let catalog = state.catalog().expect("listing should resolve over HTTP");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].title, "Youth Pass");
    }
}
