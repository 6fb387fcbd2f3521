//! End-to-end pipeline scenarios against a local HTTP fixture server and a
//! scripted chat client, covering the happy path and each phase's
//! zero-success failure (SPEC_FULL.md §8 scenarios).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_client::types::{Choice, ResponseMessage};
use ai_client::{AiClientError, ChatClient, ChatRequest, ChatResponse, Usage};
use theodore_core::config::Config;
use theodore_core::orchestrator::Orchestrator;
use theodore_core::types::Options;
use theodore_core::TheodoreError;

/// A `ChatClient` that returns a fixed sequence of canned responses, one per
/// call, in order. Used to script the selector's then the distiller's reply.
struct ScriptedChatClient {
    responses: Mutex<Vec<Result<String, AiClientError>>>,
}

impl ScriptedChatClient {
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|s| Ok(s.to_string())).rev().collect()),
        }
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, AiClientError> {
        let mut queue = self.responses.lock().await;
        let next = queue
            .pop()
            .unwrap_or_else(|| Ok("{}".to_string()))?;
        Ok(ChatResponse {
            model: "test-model".to_string(),
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some(next),
                },
            }],
            usage: Some(Usage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            }),
        })
    }

    fn provider(&self) -> &'static str {
        "scripted-test-client"
    }
}

fn test_config() -> Config {
    Config {
        open_router_api_key: "test-key".to_string(),
        model_id: "openai/gpt-4o-mini".to_string(),
    }
}

fn fast_options() -> Options {
    Options {
        concurrency: 4,
        max_content_per_page: 15_000,
        selector_timeout_seconds: 5,
        distiller_timeout_seconds: 5,
        page_fetch_timeout_seconds: 5,
        discovery_timeout_seconds: 5,
        min_selection_confidence: 0.6,
    }
}

const ABOUT_PAGE: &str = r#"<html><head><title>About Acme</title></head>
<body><article><p>Acme builds payroll software for small businesses across North
America, helping thousands of teams pay their people correctly and on time every
single month of the year.</p></article></body></html>"#;

const TEAM_PAGE: &str = r#"<html><body><article><p>Our leadership team has shipped
fintech products for over a decade and cares deeply about reliability, security,
and customer trust in every release the company ships to its customers.</p>
</article></body></html>"#;

async fn mount_happy_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nSitemap: /sitemap.xml\n"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0"?><urlset>
                <url><loc>{base}/about</loc></url>
                <url><loc>{base}/team</loc></url>
            </urlset>"#,
            base = server.uri()
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABOUT_PAGE))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/team"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TEAM_PAGE))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_pipeline_succeeds_end_to_end() {
    let server = MockServer::start().await;
    mount_happy_site(&server).await;

    let client = Arc::new(ScriptedChatClient::new(vec![
        r#"{"selected_paths": ["/about", "/team"], "path_explanations": {"/about": "bio"}}"#,
        r#"{"company_name": "Acme", "industry": "fintech", "business_model": "saas",
            "headquarters_location": "Toronto", "value_proposition": "payroll for small business"}"#,
    ]));

    let orchestrator = Orchestrator::new(test_config(), client);
    let result = orchestrator
        .research(server.uri(), &fast_options(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.selection.selected.len(), 2);
    assert_eq!(result.crawl.success_count, 2);
    assert!(result.distillation.fields.len() >= 5);
    assert!(result.totals.cost_usd > 0.0);
    assert!(result.totals.tokens > 0);
}

#[tokio::test]
async fn discovery_fails_when_site_has_no_discoverable_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = Arc::new(ScriptedChatClient::new(vec![]));
    let orchestrator = Orchestrator::new(test_config(), client);
    let result = orchestrator
        .research(server.uri(), &fast_options(), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(TheodoreError::DiscoveryFailed)));
}

#[tokio::test]
async fn selection_fails_on_unparseable_model_response() {
    let server = MockServer::start().await;
    mount_happy_site(&server).await;

    let client = Arc::new(ScriptedChatClient::new(vec!["I'm sorry, I can't do that."]));
    let orchestrator = Orchestrator::new(test_config(), client);
    let result = orchestrator
        .research(server.uri(), &fast_options(), CancellationToken::new())
        .await;

    assert!(matches!(result, Err(TheodoreError::SelectionFailed { .. })));
}

#[tokio::test]
async fn extraction_fails_when_every_selected_page_404s() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Sitemap: /sitemap.xml\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<?xml version=\"1.0\"?><urlset><url><loc>{}/ghost</loc></url></urlset>",
            server.uri()
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = Arc::new(ScriptedChatClient::new(vec![
        r#"{"selected_paths": ["/ghost"]}"#,
    ]));
    let orchestrator = Orchestrator::new(test_config(), client);
    let result = orchestrator
        .research(server.uri(), &fast_options(), CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(TheodoreError::ExtractionFailed { attempted: 1 })
    ));
}

#[tokio::test]
async fn distillation_fails_when_schema_is_underfilled() {
    let server = MockServer::start().await;
    mount_happy_site(&server).await;

    let client = Arc::new(ScriptedChatClient::new(vec![
        r#"{"selected_paths": ["/about", "/team"]}"#,
        r#"{"company_name": "Acme"}"#,
    ]));
    let orchestrator = Orchestrator::new(test_config(), client);
    let result = orchestrator
        .research(server.uri(), &fast_options(), CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(TheodoreError::DistillationFailed { .. })
    ));
}
