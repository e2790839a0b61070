use anyhow::{Context, Result, bail};

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Postgres URL; the process-local store is used when unset.
    pub database_url: Option<String>,
    pub http_addr: String,
    pub admin_api_token: String,
    /// `MEMORY_SCHOOLS`, as `id:name` pairs separated by `;`. Seeds the
    /// in-process directory when no database is configured.
    pub memory_schools: Vec<(String, String)>,
    /// `MEMORY_STUDENTS`, comma separated.
    pub memory_students: Vec<String>,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        default_http_addr: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let admin_api_token = present("ADMIN_API_TOKEN").context("ADMIN_API_TOKEN is required")?;
        let database_url = present("DATABASE_URL");
        let http_addr = present("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let memory_schools = present("MEMORY_SCHOOLS")
            .map(|raw| parse_schools(&raw))
            .transpose()?
            .unwrap_or_default();
        let memory_students = present("MEMORY_STUDENTS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            http_addr,
            admin_api_token,
            memory_schools,
            memory_students,
        })
    }
}

fn parse_schools(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (id, name) = pair
                .split_once(':')
                .with_context(|| format!("MEMORY_SCHOOLS entry {pair:?} must be id:name"))?;
            let (id, name) = (id.trim(), name.trim());
            if id.is_empty() || name.is_empty() {
                bail!("MEMORY_SCHOOLS entry {pair:?} must be id:name");
            }
            Ok((id.to_string(), name.to_string()))
        })
        .collect()
}
