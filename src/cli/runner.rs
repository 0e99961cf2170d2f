//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ListArgs, OutputFormat};
use crate::client::{Client, StoreClient};
use crate::error::{Error, Result};
use crate::loader::{load_job, validate_job, ListingJob};
use crate::pagination::all_items;
use crate::types::JsonValue;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List(args) => self.list(args).await,
            Commands::Paginators { store } => self.paginators(store.as_deref()),
            Commands::Validate => self.validate(),
        }
    }

    /// Load the job file, or the defaults when none was given
    fn load_job(&self) -> Result<ListingJob> {
        match &self.cli.job {
            Some(path) => load_job(path),
            None => Ok(ListingJob::default()),
        }
    }

    /// List items
    async fn list(&self, args: &ListArgs) -> Result<()> {
        let job = apply_overrides(self.load_job()?, args)?;
        validate_job(&job)?;

        let client = store_client(&job)?;
        let started = Instant::now();

        let mut items = all_items(
            &client,
            job.paginator.as_str(),
            job.response_key.as_str(),
            job.pagination_params(),
        );

        let mut count: u64 = 0;
        while let Some(item) = items.next().await {
            self.print_item(&item?)?;
            count += 1;
        }

        info!(
            "Listed {} items from {} pages in {:.2}s",
            count,
            items.pages_fetched(),
            started.elapsed().as_secs_f64()
        );
        if let Some(token) = items.resume_token() {
            info!("More items available, resume with --starting-token {}", token);
        }

        Ok(())
    }

    /// List paginators
    fn paginators(&self, store: Option<&str>) -> Result<()> {
        let mut job = self.load_job()?;
        if let Some(store) = store {
            job.store = store.to_string();
        }
        let client = store_client(&job)?;
        for name in client.operation_names() {
            println!("{name}");
        }
        Ok(())
    }

    /// Validate job file
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .job
            .as_ref()
            .ok_or_else(|| Error::config("Job file not specified (use -j flag)"))?;
        let job = load_job(path)?;
        println!(
            "✓ Job is valid: {} over '{}' from {}",
            job.paginator, job.response_key, job.store
        );
        Ok(())
    }

    fn print_item(&self, item: &JsonValue) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(item)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(item)?,
        };
        println!("{line}");
        Ok(())
    }
}

/// Build the store client a job lists from
pub fn store_client(job: &ListingJob) -> Result<StoreClient> {
    let client = StoreClient::from_location(&job.store)?;
    Ok(match &job.region {
        Some(region) => client.with_region(region.as_str()),
        None => client,
    })
}

/// Apply `list` flags on top of a job
pub fn apply_overrides(mut job: ListingJob, args: &ListArgs) -> Result<ListingJob> {
    if let Some(store) = &args.store {
        job.store.clone_from(store);
    }
    if args.region.is_some() {
        job.region.clone_from(&args.region);
    }
    if let Some(paginator) = &args.paginator {
        job.paginator.clone_from(paginator);
    }
    if let Some(key) = &args.key {
        job.response_key.clone_from(key);
    }
    if let Some(bucket) = &args.bucket {
        job.set_param("Bucket", bucket.as_str());
    }
    if let Some(prefix) = &args.prefix {
        job.set_param("Prefix", prefix.as_str());
    }
    for raw in &args.params {
        let (name, value) = parse_param(raw)?;
        job.set_param(name, value);
    }
    if args.max_items.is_some() {
        job.pagination.max_items = args.max_items;
    }
    if args.page_size.is_some() {
        job.pagination.page_size = args.page_size;
    }
    if args.starting_token.is_some() {
        job.pagination.starting_token.clone_from(&args.starting_token);
    }
    Ok(job)
}

/// Parse a `KEY=VALUE` parameter; VALUE is JSON when it parses as JSON
pub fn parse_param(raw: &str) -> Result<(String, JsonValue)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::config(format!("Invalid --param '{raw}': expected KEY=VALUE")))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::config(format!(
            "Invalid --param '{raw}': parameter name is empty"
        )));
    }

    let value =
        serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PaginationConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("Prefix=raw/", "Prefix", json!("raw/") ; "plain string")]
    #[test_case("MaxKeys=10", "MaxKeys", json!(10) ; "number")]
    #[test_case("Flag=true", "Flag", json!(true) ; "boolean")]
    #[test_case("Expr=a=b", "Expr", json!("a=b") ; "value with equals")]
    #[test_case("Quoted=\"x\"", "Quoted", json!("x") ; "json string")]
    fn test_parse_param(raw: &str, name: &str, value: JsonValue) {
        assert_eq!(parse_param(raw).unwrap(), (name.to_string(), value));
    }

    #[test_case("NoEquals" ; "missing equals")]
    #[test_case("=value" ; "empty name")]
    fn test_parse_param_invalid(raw: &str) {
        assert!(parse_param(raw).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut job = ListingJob::default();
        job.set_param("Bucket", "from-file");
        job.pagination = PaginationConfig::new().with_page_size(50);

        let args = ListArgs {
            store: Some("/srv/buckets".to_string()),
            bucket: Some("from-flag".to_string()),
            prefix: Some("logs/".to_string()),
            params: vec!["Marker=logs/0001".to_string()],
            max_items: Some(10),
            ..Default::default()
        };

        let job = apply_overrides(job, &args).unwrap();
        assert_eq!(job.store, "/srv/buckets");
        assert_eq!(job.paginator, "list_objects");
        assert_eq!(
            JsonValue::Object(job.params.clone()),
            json!({"Bucket": "from-flag", "Prefix": "logs/", "Marker": "logs/0001"})
        );
        assert_eq!(
            job.pagination,
            PaginationConfig::new().with_max_items(10).with_page_size(50)
        );
    }

    #[test]
    fn test_region_flag_reaches_store_client() {
        let job = apply_overrides(
            ListingJob::default(),
            &ListArgs {
                region: Some("eu-west-1".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(job.region.as_deref(), Some("eu-west-1"));

        let client = store_client(&job).unwrap();
        assert_eq!(client.region(), Some("eu-west-1"));

        let client = store_client(&ListingJob::default()).unwrap();
        assert_eq!(client.region(), None);
    }

    #[test]
    fn test_apply_overrides_keeps_job_without_flags() {
        let mut job = ListingJob::default();
        job.set_param("Bucket", "data");

        let result = apply_overrides(job.clone(), &ListArgs::default()).unwrap();
        assert_eq!(result, job);
    }
}
