use async_trait::async_trait;
use mockito::Matcher;
use recipe_ingest::{FetchedPage, HtmlFetcher, ImportError, RecipeImporter};
use serde_json::json;
use std::time::Duration;

const RECIPE_HTML: &str = r#"<html><head><script type="application/ld+json">{"@type": "Recipe", "name": "Proxy Pad Thai", "recipeIngredient": ["8 oz rice noodles"]}</script></head></html>"#;

#[tokio::test]
async fn test_proxy_success() {
    let mut server = mockito::Server::new_async().await;
    let target = "https://www.example.com/pad-thai";
    let proxy = server
        .mock("POST", "/api/fetch")
        .match_body(Matcher::Json(json!({ "url": target })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"success": true, "html": RECIPE_HTML, "url": target}).to_string())
        .create_async()
        .await;

    let importer = RecipeImporter::builder()
        .proxy_url(format!("{}/api/fetch", server.url()))
        .direct_fetch(false)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let result = importer.import_url(target).await;
    proxy.assert_async().await;
    let recipe = result.recipe().unwrap();
    assert_eq!(recipe.name, "Proxy Pad Thai");
    assert_eq!(recipe.source_url.as_deref(), Some(target));
    assert_eq!(recipe.ingredients[0].unit, "oz");
}

#[tokio::test]
async fn test_proxy_error_payload_is_final() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/fetch")
        .with_status(403)
        .with_body(json!({"error": "Domain not allowed"}).to_string())
        .create_async()
        .await;
    let origin = server
        .mock("GET", "/recipe")
        .with_status(200)
        .with_body(RECIPE_HTML)
        .expect(0)
        .create_async()
        .await;

    let importer = RecipeImporter::builder()
        .proxy_url(format!("{}/api/fetch", server.url()))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let err = importer
        .try_import_url(&format!("{}/recipe", server.url()))
        .await
        .unwrap_err();
    origin.assert_async().await;
    assert!(matches!(err, ImportError::ProxyRejected(ref msg) if msg == "Domain not allowed"));
}

#[tokio::test]
async fn test_proxy_failure_falls_back_to_direct_fetch() {
    let mut server = mockito::Server::new_async().await;
    let proxy = server
        .mock("POST", "/api/fetch")
        .with_status(502)
        .with_body("Bad gateway")
        .create_async()
        .await;
    let origin = server
        .mock("GET", "/recipe")
        .with_status(200)
        .with_body(RECIPE_HTML)
        .create_async()
        .await;

    let importer = RecipeImporter::builder()
        .proxy_url(format!("{}/api/fetch", server.url()))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let recipe = importer
        .try_import_url(&format!("{}/recipe", server.url()))
        .await
        .unwrap();
    proxy.assert_async().await;
    origin.assert_async().await;
    assert_eq!(recipe.name, "Proxy Pad Thai");
}

#[tokio::test]
async fn test_proxy_failure_without_direct_fetch() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/fetch")
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;
    let origin = server
        .mock("GET", "/recipe")
        .expect(0)
        .create_async()
        .await;

    let importer = RecipeImporter::builder()
        .proxy_url(format!("{}/api/fetch", server.url()))
        .direct_fetch(false)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let err = importer
        .try_import_url(&format!("{}/recipe", server.url()))
        .await
        .unwrap_err();
    origin.assert_async().await;
    assert!(matches!(err, ImportError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_amp_flow_makes_at_most_three_requests() {
    let mut server = mockito::Server::new_async().await;
    // regular page via proxy, then AMP page via proxy and direct
    let proxy = server
        .mock("POST", "/api/fetch")
        .with_status(503)
        .with_body("unavailable")
        .expect(2)
        .create_async()
        .await;
    let amp_origin = server
        .mock("GET", "/recipe/amp")
        .with_status(200)
        .with_body("<html amp><body>AMP</body></html>")
        .expect(1)
        .create_async()
        .await;
    let regular_origin = server
        .mock("GET", "/recipe")
        .expect(0)
        .create_async()
        .await;

    let importer = RecipeImporter::builder()
        .proxy_url(format!("{}/api/fetch", server.url()))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let result = importer
        .import_url(&format!("{}/recipe/amp", server.url()))
        .await;
    proxy.assert_async().await;
    amp_origin.assert_async().await;
    regular_origin.assert_async().await;
    assert!(result.errors()[0].contains("AMP pages often lack recipe data"));
}

struct StaticFetcher;

#[async_trait]
impl HtmlFetcher for StaticFetcher {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage, ImportError> {
        Ok(FetchedPage {
            html: RECIPE_HTML.to_string(),
            url: url.to_string(),
        })
    }
}

#[tokio::test]
async fn test_builder_with_custom_fetcher() {
    let importer = RecipeImporter::builder()
        .fetcher(StaticFetcher)
        .build()
        .unwrap();

    let result = importer.import_url("https://example.com/anything").await;
    assert!(result.is_success());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["recipe"]["name"], "Proxy Pad Thai");
    assert_eq!(json["recipe"]["sourceUrl"], "https://example.com/anything");
    assert_eq!(json["recipe"]["isCustom"], true);
}
