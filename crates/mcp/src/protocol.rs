//! Minimal MCP server: newline-delimited JSON-RPC 2.0 with tool and
//! resource registries.

use futures_util::future::BoxFuture;
use schemars::schema_for;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// JSON-RPC version string.
pub const JSONRPC_VERSION: &str = "2.0";
/// MCP protocol revision implemented here.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
/// Invalid JSON received.
pub const PARSE_ERROR: i32 = -32700;
/// Not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// Unknown method.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Bad method parameters.
pub const INVALID_PARAMS: i32 = -32602;

/// Incoming request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`.
    pub jsonrpc: String,
    /// Request id; absent for notifications. An explicit `null` is still an id.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    /// Method name.
    pub method: String,
    /// Method parameters.
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Check the protocol version.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err("Invalid JSON-RPC version, expected 2.0");
        }
        Ok(())
    }

    /// Requests without an id expect no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Successful response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Id of the request being answered.
    pub id: Value,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Response for `id`.
    pub fn new(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }

    /// Serialize to a single line.
    pub fn to_json(&self) -> String {
        to_line(self)
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Id of the failed request, null if unknown.
    pub id: Value,
    /// Error details.
    pub error: ErrorObject,
}

impl JsonRpcError {
    /// Error for `id` with `code`.
    pub fn new(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error: ErrorObject {
                code,
                message: message.into(),
            },
        }
    }

    /// Input was not JSON.
    pub fn parse_error() -> Self {
        Self::new(Value::Null, PARSE_ERROR, "Parse error")
    }

    /// Input was JSON but not a request.
    pub fn invalid_request(id: Value, message: impl Into<String>) -> Self {
        Self::new(id, INVALID_REQUEST, message)
    }

    /// Unknown method.
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::new(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Bad parameters.
    pub fn invalid_params(id: Value, message: impl Into<String>) -> Self {
        Self::new(id, INVALID_PARAMS, message)
    }

    /// Serialize to a single line.
    pub fn to_json(&self) -> String {
        to_line(self)
    }
}

/// Code and message of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorObject {
    /// JSON-RPC error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
}

fn to_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize JSON-RPC message: {}", e);
        format!(
            r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":-32603,"message":"Serialization failed: {}"}}}}"#,
            e.to_string().replace('"', "'")
        )
    })
}

/// Listed resource.
#[derive(Debug, Serialize, Clone)]
pub struct Resource {
    /// Resource URI.
    pub uri: String,
    /// Short name.
    pub name: String,
    /// What the resource holds.
    pub description: String,
    /// Content type.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// Body of a read resource.
#[derive(Debug, Serialize)]
pub struct ResourceContent {
    /// Resource URI.
    pub uri: String,
    /// Content type.
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Content.
    pub text: String,
}

/// Listed tool.
#[derive(Debug, Serialize, Clone)]
pub struct Tool {
    /// Tool name.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON schema of the arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Outcome of a tool call.
#[derive(Debug, Serialize)]
pub struct ToolResult {
    /// Output blocks.
    pub content: Vec<ContentBlock>,
    /// Whether the call failed.
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    /// Successful text result.
    pub fn success(text: String) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    /// Failed result with a message.
    pub fn error(text: String) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: true,
        }
    }

    /// Successful result holding `value` as pretty JSON.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::success(text),
            Err(e) => Self::error(format!("Failed to serialize results: {e}")),
        }
    }
}

/// A text block of tool output.
#[derive(Debug, Serialize)]
pub struct ContentBlock {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub content_type: String,
    /// The text.
    pub text: String,
}

impl ContentBlock {
    /// Text block.
    pub fn text(text: String) -> Self {
        Self {
            content_type: "text".to_string(),
            text,
        }
    }
}

/// Type-erased tool handler.
pub type ToolHandler<C> = Arc<dyn Fn(Arc<C>, Value) -> BoxFuture<'static, ToolResult> + Send + Sync>;
/// Type-erased resource handler.
pub type ResourceHandler<C> =
    Arc<dyn Fn(Arc<C>) -> BoxFuture<'static, Result<String, String>> + Send + Sync>;

struct ToolDef<C> {
    description: String,
    input_schema: Value,
    handler: ToolHandler<C>,
}

struct ResourceDef<C> {
    name: String,
    description: String,
    mime_type: String,
    handler: ResourceHandler<C>,
}

/// MCP server over a shared context `C`.
pub struct McpServer<C> {
    name: String,
    version: String,
    ctx: Arc<C>,
    tools: BTreeMap<String, ToolDef<C>>,
    resources: BTreeMap<String, ResourceDef<C>>,
}

impl<C> fmt::Debug for McpServer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McpServer")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync + 'static> McpServer<C> {
    /// Server named `name`/`version` around `ctx`.
    pub fn new(name: impl Into<String>, version: impl Into<String>, ctx: C) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ctx: Arc::new(ctx),
            tools: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    /// Register a tool whose arguments deserialize into `A`.
    pub fn tool<A, F, Fut>(mut self, name: &str, description: &str, handler: F) -> Self
    where
        A: DeserializeOwned + schemars::JsonSchema + Send + 'static,
        F: Fn(Arc<C>, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        let schema = schema_for!(A);
        let input_schema =
            serde_json::to_value(&schema).unwrap_or_else(|_| json!({ "type": "object" }));
        let handler = Arc::new(handler);
        let handler: ToolHandler<C> = Arc::new(move |ctx: Arc<C>, arguments: Value| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                // Tools without arguments may be called with none at all
                let arguments = if arguments.is_null() {
                    json!({})
                } else {
                    arguments
                };
                match serde_json::from_value::<A>(arguments) {
                    Ok(args) => handler(ctx, args).await,
                    Err(err) => ToolResult::error(format!("Invalid tool arguments: {err}")),
                }
            })
        });

        self.tools.insert(
            name.to_string(),
            ToolDef {
                description: description.to_string(),
                input_schema,
                handler,
            },
        );
        self
    }

    /// Register a resource.
    pub fn resource<F, Fut>(
        mut self,
        uri: &str,
        name: &str,
        description: &str,
        mime_type: &str,
        handler: F,
    ) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, String>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let handler: ResourceHandler<C> = Arc::new(move |ctx: Arc<C>| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler(ctx).await })
        });
        self.resources.insert(
            uri.to_string(),
            ResourceDef {
                name: name.to_string(),
                description: description.to_string(),
                mime_type: mime_type.to_string(),
                handler,
            },
        );
        self
    }

    /// Registered tools, sorted by name.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|(name, def)| Tool {
                name: name.clone(),
                description: def.description.clone(),
                input_schema: def.input_schema.clone(),
            })
            .collect()
    }

    /// Registered resources, sorted by URI.
    pub fn list_resources(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .map(|(uri, def)| Resource {
                uri: uri.clone(),
                name: def.name.clone(),
                description: def.description.clone(),
                mime_type: def.mime_type.clone(),
            })
            .collect()
    }

    /// Invoke a tool by name.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| format!("Unknown tool: {name}"))?;
        Ok((tool.handler)(Arc::clone(&self.ctx), arguments).await)
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceContent, String> {
        let resource = self
            .resources
            .get(uri)
            .ok_or_else(|| format!("Resource not found: {uri}"))?;
        let text = (resource.handler)(Arc::clone(&self.ctx)).await?;
        Ok(ResourceContent {
            uri: uri.to_string(),
            mime_type: resource.mime_type.clone(),
            text,
        })
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "resources": {},
                "tools": {},
            },
            "serverInfo": {
                "name": self.name,
                "version": self.version,
            }
        })
    }

    /// Serve requests on stdin/stdout until EOF.
    pub async fn run_stdio(&self) -> Result<(), String> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited requests from `reader`, answering on `writer`,
    /// until `reader` reaches EOF.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("MCP server '{}' ready", self.name);
        let mut line = String::new();

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| format!("Error reading request: {e}"))?;
            if read == 0 {
                tracing::info!("MCP input closed, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(trimmed).await {
                write_line(&mut writer, &response).await?;
            }
        }

        Ok(())
    }

    /// Handle one message, returning the response line if one is due.
    pub async fn handle_message(&self, msg: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(msg) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Unparseable message: {}", e);
                return Some(JsonRpcError::parse_error().to_json());
            }
        };

        let id_hint = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => return Some(JsonRpcError::invalid_request(id_hint, e.to_string()).to_json()),
        };

        if let Err(e) = request.validate() {
            return Some(JsonRpcError::invalid_request(id_hint, e).to_json());
        }

        if request.is_notification() {
            tracing::debug!("Notification '{}'", request.method);
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        let params = request.params.unwrap_or(Value::Null);
        tracing::debug!("Request '{}'", request.method);

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::new(id, self.initialize_result()).to_json(),
            "ping" => JsonRpcResponse::new(id, json!({})).to_json(),
            "resources/list" => {
                JsonRpcResponse::new(id, json!({ "resources": self.list_resources() })).to_json()
            }
            "resources/read" => self.handle_resources_read(id, &params).await,
            "tools/list" => JsonRpcResponse::new(id, json!({ "tools": self.list_tools() })).to_json(),
            "tools/call" => self.handle_tools_call(id, &params).await,
            method => JsonRpcError::method_not_found(id, method).to_json(),
        };

        Some(response)
    }

    async fn handle_resources_read(&self, id: Value, params: &Value) -> String {
        let Some(uri) = params.get("uri").and_then(|v| v.as_str()) else {
            return JsonRpcError::invalid_params(id, "Missing 'uri' parameter").to_json();
        };

        match self.read_resource(uri).await {
            Ok(content) => JsonRpcResponse::new(id, json!({ "contents": [content] })).to_json(),
            Err(err) => JsonRpcError::invalid_params(id, err).to_json(),
        }
    }

    async fn handle_tools_call(&self, id: Value, params: &Value) -> String {
        let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcError::invalid_params(id, "Missing 'name' parameter").to_json();
        };

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        match self.call_tool(tool_name, arguments).await {
            Ok(result) => match serde_json::to_value(result) {
                Ok(result) => JsonRpcResponse::new(id, result).to_json(),
                Err(e) => JsonRpcError::invalid_params(id, e.to_string()).to_json(),
            },
            Err(err) => JsonRpcError::invalid_params(id, err).to_json(),
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, response: &str) -> Result<(), String> {
    writer
        .write_all(response.as_bytes())
        .await
        .map_err(|e| format!("Failed to write response: {e}"))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| format!("Failed to write newline: {e}"))?;
    writer
        .flush()
        .await
        .map_err(|e| format!("Failed to flush output: {e}"))
}
