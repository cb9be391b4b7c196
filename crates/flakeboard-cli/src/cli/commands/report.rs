//! `flakeboard`: print the pull and periodic flaky-test reports.
//!
//! Config layering: file (`--config`, `--env-file` or `./userconfig.json`),
//! then `FLAKEBOARD_*` environment variables, then flags.

use std::path::Path;

use chrono::Utc;
use flakeboard_core::{BlobCache, CiClient, FlakeResult, LogFetcher, Pipeline, ReportConfig};
use tracing::{info, warn};

use super::super::args::{ReportArgs, DEFAULT_CONFIG_FILE};
use crate::exit_codes::EXIT_SUCCESS;

pub(crate) async fn run(args: ReportArgs) -> anyhow::Result<i32> {
    match execute(&args).await {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("error: {e}");
            Ok(e.exit_code())
        }
    }
}

async fn execute(args: &ReportArgs) -> FlakeResult<i32> {
    let config = load_config(args)?;
    if !config.pull && !config.periodic {
        warn!("pull and periodic reports are both disabled, nothing to do");
        return Ok(EXIT_SUCCESS);
    }

    // Cache problems are fatal before any request goes out.
    let cache = BlobCache::open(&config.cache_dir).await?;
    let client = CiClient::new(&config)?;
    let fetcher = LogFetcher::new(client.clone(), cache, &config);
    let pipeline = Pipeline::new(&config, &client, &fetcher)?;

    info!(
        org = %config.repo_org,
        repo = %config.repo_name,
        max_age = %config.max_age,
        "building flaky test report"
    );

    let mut code = EXIT_SUCCESS;
    for (run_type, result) in pipeline.run_enabled(Utc::now()).await {
        match result {
            Ok(report) => println!("{}", report.to_markdown()),
            Err(e) => {
                eprintln!("error: {run_type} report failed: {e}");
                if code == EXIT_SUCCESS {
                    code = e.exit_code();
                }
            }
        }
    }
    Ok(code)
}

pub(crate) fn load_config(args: &ReportArgs) -> FlakeResult<ReportConfig> {
    let default_file = Path::new(DEFAULT_CONFIG_FILE);
    let base = match (&args.config, &args.env_file) {
        (Some(path), _) => ReportConfig::from_json_file(path)?,
        (None, Some(path)) => ReportConfig::from_env_file(path)?,
        (None, None) if default_file.exists() => ReportConfig::from_json_file(default_file)?,
        (None, None) => ReportConfig::default(),
    };

    let config = apply_args(base.with_env()?, args);
    config.validate()?;
    Ok(config)
}

fn apply_args(mut config: ReportConfig, args: &ReportArgs) -> ReportConfig {
    if let Some(org) = &args.repo_org {
        config.repo_org = org.clone();
    }
    if let Some(name) = &args.repo_name {
        config.repo_name = name.clone();
    }
    if let Some(search) = &args.search {
        config.search_str = search.clone();
    }
    if let Some(pattern) = &args.strip_regex {
        config.regex = Some(pattern.clone());
    }
    if let Some(branch) = &args.branch {
        config.branch = branch.clone();
    }
    if let Some(max_age) = &args.max_age {
        config.max_age = max_age.clone();
    }
    if args.no_pull {
        config.pull = false;
    }
    if args.no_periodic {
        config.periodic = false;
    }
    if let Some(policy) = args.failure_policy {
        config.failure_policy = policy;
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(url) = &args.search_url {
        config.search_url = url.clone();
    }
    if let Some(url) = &args.storage_url {
        config.storage_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use flakeboard_core::{FailurePolicy, FlakeError};
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_config() {
        let base = ReportConfig::default().with_repo("file-org", "file-repo");
        let args = ReportArgs {
            repo_name: Some("flag-repo".to_string()),
            max_age: Some("48h".to_string()),
            no_pull: true,
            failure_policy: Some(FailurePolicy::Abort),
            timeout: Some(3),
            ..ReportArgs::default()
        };

        let config = apply_args(base, &args);
        assert_eq!(config.repo_org, "file-org");
        assert_eq!(config.repo_name, "flag-repo");
        assert_eq!(config.window_days(), Some(2));
        assert!(!config.pull);
        assert!(config.periodic);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    #[serial]
    fn test_load_config_from_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("userconfig.json");
        fs::write(
            &path,
            r#"{"repoOrg": "redhat-developer", "repoName": "odo", "branch": "main"}"#,
        )
        .unwrap();

        let args = ReportArgs {
            config: Some(path),
            ..ReportArgs::default()
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.repo_org, "redhat-developer");
        assert_eq!(config.branch, "main");
        assert_eq!(config.max_age, "336h");
    }

    #[test]
    #[serial]
    fn test_load_config_from_env_file_with_flag_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("userconfig.env");
        fs::write(&path, "repoOrg=openshift,repoName=odo,\nperiodic=false").unwrap();

        let args = ReportArgs {
            env_file: Some(path),
            repo_name: Some("console".to_string()),
            ..ReportArgs::default()
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.repo_org, "openshift");
        assert_eq!(config.repo_name, "console");
        assert!(!config.periodic);
    }

    #[test]
    #[serial]
    fn test_load_config_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("userconfig.json");
        fs::write(&path, r#"{"repoOrg": "o", "repoName": "r", "maxAge": "2w"}"#).unwrap();

        let args = ReportArgs {
            config: Some(path),
            ..ReportArgs::default()
        };
        let err = load_config(&args).unwrap_err();
        assert!(matches!(err, FlakeError::Config { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
