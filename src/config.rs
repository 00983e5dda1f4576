#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub plan_cache_ttl_secs: u64,
    pub plan_cache_capacity: u64,
    pub max_body_bytes: usize,
    pub slack_webhook_url: Option<String>,
    pub crm_base_url: Option<String>,
    pub crm_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            plan_cache_ttl_secs: 3600,
            plan_cache_capacity: 10_000,
            max_body_bytes: 5 * 1024 * 1024,
            slack_webhook_url: None,
            crm_base_url: None,
            crm_token: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!(
            "Plan cache: {}s TTL, {} max entries",
            config.plan_cache_ttl_secs,
            config.plan_cache_capacity
        );
        if config.slack_webhook_url.is_some() {
            tracing::info!("Slack distribution configured");
        }
        if let Some(ref crm) = config.crm_base_url {
            tracing::info!("CRM distribution configured: {}", crm);
        }

        Ok(config)
    }

    /// Builds a config from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            port: get("PORT")
                .map(|v| v.trim().parse::<u16>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?
                .unwrap_or(defaults.port),
            plan_cache_ttl_secs: positive(get("PLAN_CACHE_TTL_SECS"), "PLAN_CACHE_TTL_SECS")?
                .unwrap_or(defaults.plan_cache_ttl_secs),
            plan_cache_capacity: positive(get("PLAN_CACHE_CAPACITY"), "PLAN_CACHE_CAPACITY")?
                .unwrap_or(defaults.plan_cache_capacity),
            max_body_bytes: positive(get("MAX_BODY_BYTES"), "MAX_BODY_BYTES")?
                .map(|v| v as usize)
                .unwrap_or(defaults.max_body_bytes),
            slack_webhook_url: get("SLACK_WEBHOOK_URL")
                .map(|url| http_url(url, "SLACK_WEBHOOK_URL"))
                .transpose()?,
            crm_base_url: get("CRM_BASE_URL")
                .map(|url| http_url(url, "CRM_BASE_URL"))
                .transpose()?
                .map(|url| url.trim_end_matches('/').to_string()),
            crm_token: get("CRM_TOKEN"),
        };

        if config.crm_base_url.is_some() && config.crm_token.is_none() {
            anyhow::bail!("CRM_TOKEN is required when CRM_BASE_URL is set");
        }

        Ok(config)
    }
}

fn positive(value: Option<String>, name: &str) -> anyhow::Result<Option<u64>> {
    value
        .map(|v| match v.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(anyhow::anyhow!("{} must be a positive integer", name)),
        })
        .transpose()
}

fn http_url(value: String, name: &str) -> anyhow::Result<String> {
    let trimmed = value.trim().to_string();
    let parsed = url::Url::parse(&trimmed)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(trimmed)
}
