use super::{ConfigFormat, TemplateFilter, TemplateRef, ZabbixApi};
use crate::config::ZabbixConfig;
use crate::import::ImportRules;
use crate::{Result, TemplateToolError};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::cell::Cell;
use std::fmt;
use std::io::Read;

/// Sends one JSON-RPC request body and returns the raw response body.
pub trait Transport {
    fn post(&self, body: &str, bearer: Option<&str>) -> Result<String>;
}

/// HTTP(S) transport backed by `ureq`.
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn post(&self, body: &str, bearer: Option<&str>) -> Result<String> {
        let mut request = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json-rpc");

        if let Some(token) = bearer {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        let response = request.send_string(body)?;

        // into_string() caps bodies at 10 MB; large exports exceed that.
        let mut content = String::new();
        response.into_reader().read_to_string(&mut content)?;
        Ok(content)
    }
}

/// Server API version as reported by `apiinfo.version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.trim().split('.');
        let mut next = || -> Result<u32> {
            parts
                .next()
                .and_then(|part| part.parse().ok())
                .ok_or_else(|| {
                    TemplateToolError::InvalidResponse(format!("Unrecognised API version: {}", raw))
                })
        };

        Ok(Self {
            major: next()?,
            minor: next()?,
        })
    }

    /// `user.login` takes `username` instead of `user` since 5.4.
    pub fn uses_username_login(&self) -> bool {
        *self >= ApiVersion { major: 5, minor: 4 }
    }

    /// Session tokens go into an `Authorization` header since 6.4.
    pub fn uses_bearer_auth(&self) -> bool {
        *self >= ApiVersion { major: 6, minor: 4 }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcError {
    fn into_error(self) -> TemplateToolError {
        let data = match self.data {
            Some(Value::String(text)) => text,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        TemplateToolError::Api {
            code: self.code,
            message: self.message,
            data,
        }
    }
}

/// Authenticated JSON-RPC session against one Zabbix server.
pub struct ZabbixClient<T: Transport> {
    transport: T,
    version: ApiVersion,
    token: Option<String>,
    next_id: Cell<u64>,
}

impl ZabbixClient<HttpTransport> {
    /// Open a session using the configured endpoint and credentials.
    pub fn connect(config: &ZabbixConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.api_endpoint());
        tracing::debug!("Connecting to Zabbix API at {}", transport.endpoint());
        Self::login(transport, &config.username, &config.password)
    }
}

impl<T: Transport> ZabbixClient<T> {
    /// Query the server version, then log in.
    pub fn login(transport: T, username: &str, password: &str) -> Result<Self> {
        let mut client = Self {
            transport,
            version: ApiVersion { major: 0, minor: 0 },
            token: None,
            next_id: Cell::new(1),
        };

        let raw_version = client.call("apiinfo.version", json!([]))?;
        let raw_version = raw_version.as_str().ok_or_else(|| {
            TemplateToolError::InvalidResponse("apiinfo.version did not return a string".to_string())
        })?;
        client.version = ApiVersion::parse(raw_version)?;
        tracing::debug!("Zabbix API version {}", raw_version);

        let user_key = if client.version.uses_username_login() {
            "username"
        } else {
            "user"
        };
        let mut credentials = Map::new();
        credentials.insert(user_key.to_string(), Value::from(username));
        credentials.insert("password".to_string(), Value::from(password));

        let token = client.call("user.login", Value::Object(credentials))?;
        let token = token.as_str().ok_or_else(|| {
            TemplateToolError::InvalidResponse("user.login did not return a session id".to_string())
        })?;
        client.token = Some(token.to_string());

        tracing::debug!("Logged in to Zabbix API {} as {}", client.version, username);
        Ok(client)
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one remote call and return its `result` member.
    pub fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let mut request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        let bearer = match &self.token {
            Some(token) if self.version.uses_bearer_auth() => Some(token.as_str()),
            Some(token) => {
                request["auth"] = Value::String(token.clone());
                None
            }
            None => None,
        };

        tracing::debug!("Calling {} (request id {})", method, id);
        let body = self.transport.post(&serde_json::to_string(&request)?, bearer)?;

        let response: RpcResponse = serde_json::from_str(&body).map_err(|e| {
            TemplateToolError::InvalidResponse(format!("{}: {}", method, e))
        })?;

        if let Some(error) = response.error {
            return Err(error.into_error());
        }

        response.result.ok_or_else(|| {
            TemplateToolError::InvalidResponse(format!("{} returned no result", method))
        })
    }
}

impl<T: Transport> ZabbixApi for ZabbixClient<T> {
    fn get_templates(&self, filter: &TemplateFilter) -> Result<Vec<TemplateRef>> {
        let mut params = json!({ "output": ["templateid", "host", "name"] });
        match filter {
            TemplateFilter::All => {}
            TemplateFilter::Host(host) => params["filter"] = json!({ "host": host }),
            TemplateFilter::VisibleName(name) => params["filter"] = json!({ "name": name }),
        }

        let result = self.call("template.get", params)?;
        serde_json::from_value(result)
            .map_err(|e| TemplateToolError::InvalidResponse(format!("template.get: {}", e)))
    }

    fn export_configuration(&self, format: ConfigFormat, template_ids: &[String]) -> Result<String> {
        let params = json!({
            "format": format.as_str(),
            "options": { "templates": template_ids },
        });

        match self.call("configuration.export", params)? {
            Value::String(document) => Ok(document),
            other => Err(TemplateToolError::InvalidResponse(format!(
                "configuration.export returned {} instead of a document",
                other
            ))),
        }
    }

    fn import_configuration(
        &self,
        format: ConfigFormat,
        rules: &ImportRules,
        source: &str,
    ) -> Result<()> {
        let params = json!({
            "format": format.as_str(),
            "rules": serde_json::to_value(rules)?,
            "source": source,
        });

        let result = self.call("configuration.import", params)?;
        tracing::debug!("configuration.import returned {}", result);
        Ok(())
    }
}
