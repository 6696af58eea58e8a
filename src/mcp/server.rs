

use rmcp::{
    handler::server::{
        router::tool::ToolRouter,
        router::prompt::PromptRouter,
        wrapper::Parameters,
    },
    model::*,
    tool, tool_handler, tool_router,
    prompt, prompt_handler, prompt_router,
    transport::stdio,
    service::RequestContext,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::core::config::ExpertConfig;
use crate::core::error::ExpertError;
use crate::matching::IngestOutcome;
use crate::service::ExpertService;


#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct RecommendExpertsParams {
    #[schemars(description = "Project description or question, in any language")]
    pub question: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct IngestExpertParams {
    #[schemars(description = "Expert key (e-mail address)")]
    pub expert_key: String,
    #[schemars(description = "Free-form skills text; replaces whatever was stored for this expert")]
    pub skills: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct DeleteExpertParams {
    #[schemars(description = "Expert key (e-mail address)")]
    pub expert_key: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct ExtractKeywordsParams {
    #[schemars(description = "Skills or biography text")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct ProjectBriefArgs {
    #[schemars(description = "Short description of the project")]
    pub project: String,
    #[schemars(description = "Optional constraints (timeline, budget, clinical setting)")]
    pub constraints: Option<String>,
}


#[derive(Clone)]
pub struct ExpertMcpServer {
    service: Arc<ExpertService>,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl ExpertMcpServer {
    pub fn new(service: Arc<ExpertService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    fn convert_error(err: ExpertError) -> McpError {
        let data = Some(json!({ "kind": err.kind(), "retryable": err.is_retryable() }));
        match err {
            ExpertError::EmptyQuery | ExpertError::InvalidInput(_) => {
                McpError::invalid_params(err.to_string(), data)
            }
            _ => McpError::internal_error(err.to_string(), data),
        }
    }

    fn result_to_json<T: Serialize>(result: T) -> Result<String, McpError> {
        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_router]
impl ExpertMcpServer {
    #[tool(description = "Recommend directory experts for a project. The question is split into generic expert profiles and each profile lists up to 5 experts by ascending distance. Returns: [{profile, display_profile, experts: [{expert_key, distance}]}]")]
    async fn recommend_experts(
        &self,
        Parameters(params): Parameters<RecommendExpertsParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("🔍 Recommending experts: '{}'", crate::safe_truncate(&params.question, 50));

        let recommendation = self
            .service
            .get_experts_recommendation(&params.question)
            .await
            .map_err(Self::convert_error)?;

        info!("✅ {} profile(s)", recommendation.len());

        let json = Self::result_to_json(&recommendation)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Add or update an expert's skills. Unchanged text is a no-op. Returns: {status: 'unchanged'|'replaced', removed, added}")]
    async fn ingest_expert(
        &self,
        Parameters(params): Parameters<IngestExpertParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("✏️ Ingesting skills for {}", params.expert_key);

        let outcome = self
            .service
            .ingest_or_update(&params.expert_key, &params.skills)
            .await
            .map_err(Self::convert_error)?;

        if let IngestOutcome::Replaced { removed, added } = outcome {
            info!("✅ {}: -{} +{}", params.expert_key, removed, added);
        }

        let json = Self::result_to_json(&outcome)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Remove every skill sentence of an expert. Returns: {expert_key, removed}")]
    async fn delete_expert(
        &self,
        Parameters(params): Parameters<DeleteExpertParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("🗑️ Deleting {}", params.expert_key);

        let removed = self
            .service
            .delete(&params.expert_key)
            .await
            .map_err(Self::convert_error)?;

        let json = Self::result_to_json(json!({ "expert_key": params.expert_key.trim(), "removed": removed }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Extract upper-cased skill keywords from a text. Returns: [keyword]")]
    async fn extract_keywords(
        &self,
        Parameters(params): Parameters<ExtractKeywordsParams>,
    ) -> Result<CallToolResult, McpError> {
        let keywords = self
            .service
            .extract_keywords(&params.text)
            .await
            .map_err(Self::convert_error)?;

        info!("✅ {} keyword(s)", keywords.len());

        let json = Self::result_to_json(&keywords)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}


#[prompt_router]
impl ExpertMcpServer {
    #[prompt(
        name = "project_brief",
        description = "Turn a project idea into a question for recommend_experts"
    )]
    async fn project_brief(
        &self,
        Parameters(args): Parameters<ProjectBriefArgs>,
    ) -> Result<GetPromptResult, McpError> {
        let constraints = args
            .constraints
            .map(|c| format!("\nConstraints: {}", c))
            .unwrap_or_default();

        let messages = vec![PromptMessage::new_text(
            PromptMessageRole::User,
            format!(
                "I am planning this healthcare AI project: {}{}

Rewrite it as one clear question describing what the project needs, then call recommend_experts with that question.
For each profile in the result, explain in one sentence why it matters to the project and list the suggested experts.",
                args.project, constraints
            ),
        )];

        Ok(GetPromptResult {
            description: Some("Expert search brief".to_string()),
            messages,
        })
    }
}


#[tool_handler]
#[prompt_handler]
impl ServerHandler for ExpertMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "expert-finder".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Expert recommendation for a healthcare AI research directory. Use recommend_experts \
                 with a project description, ingest_expert and delete_expert to maintain the directory."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new("config://experts", "experts-config".to_string()).no_annotation(),
                RawResource::new("status://index", "index-status".to_string()).no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match uri.as_str() {
            "config://experts" => {
                let config = self.service.config();
                let content = Self::result_to_json(json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "llm": {
                        "provider": config.llm_provider,
                        "model": config.llm_model,
                    },
                    "embedding": {
                        "provider": config.embedding_provider,
                        "model": config.embedding_model,
                    },
                    "languages": {
                        "working": config.working_language,
                        "display": config.display_language,
                        "keywords": config.keyword_language,
                        "translation_enabled": config.translation_enabled,
                    },
                    "matching": config.match_policy(),
                    "collection": config.collection_name,
                    "tools": ["recommend_experts", "ingest_expert", "delete_expert", "extract_keywords"],
                }))?;

                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            "status://index" => {
                let content = Self::result_to_json(self.service.status().await)?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            _ => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}


pub async fn run_server() -> anyhow::Result<()> {
    info!("🚀 Initializing expert MCP server...");

    let config = ExpertConfig::from_env()?;
    info!("   🤖 LLM: {}/{}", config.llm_provider, config.llm_model);
    info!("   📊 Collection: {}", config.collection_path().display());

    let service = ExpertService::start(config);
    let server = ExpertMcpServer::new(service);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
