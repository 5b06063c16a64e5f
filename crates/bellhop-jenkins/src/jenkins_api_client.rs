use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::{CiClient, JenkinsConfig, STATUS_ERROR, STATUS_IN_PROGRESS};

#[derive(Debug, Clone, Deserialize)]
struct JenkinsJobListResponse {
    #[serde(default)]
    jobs: Vec<JenkinsJobSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct JenkinsJobSummary {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct JenkinsLastBuildResponse {
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Clone)]
/// Reqwest-backed [`CiClient`] speaking the Jenkins JSON API with basic auth
/// and a fixed per-request timeout.
pub struct JenkinsClient {
    http: reqwest::Client,
    config: JenkinsConfig,
}

impl JenkinsClient {
    pub fn new(config: JenkinsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create jenkins api client")?;
        let config = JenkinsConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };
        Ok(Self { http, config })
    }

    fn job_url(&self, job_name: &str, tail: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.config.base_url)
            .with_context(|| format!("invalid jenkins base url '{}'", self.config.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("jenkins base url cannot be a base"))?
            .push("job")
            .push(job_name)
            .extend(tail);
        Ok(url)
    }

    async fn fetch_job_list(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/json", self.config.base_url);
        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .send()
            .await
            .context("jenkins job list request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("jenkins job list failed with status {}", status.as_u16());
        }
        let decoded = response
            .json::<JenkinsJobListResponse>()
            .await
            .context("failed to decode jenkins job list")?;
        Ok(decoded.jobs.into_iter().map(|job| job.name).collect())
    }

    async fn post_trigger(&self, job_name: &str) -> Result<()> {
        let url = self.job_url(job_name, &["build"])?;
        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .send()
            .await
            .context("jenkins trigger request failed")?;
        let status = response.status().as_u16();
        // Jenkins answers 201 Created; older proxies have been seen returning
        // a plain 200.
        if !matches!(status, 200 | 201) {
            bail!("jenkins trigger failed with status {status}");
        }
        Ok(())
    }

    async fn fetch_last_build(&self, job_name: &str) -> Result<JenkinsLastBuildResponse> {
        let url = self.job_url(job_name, &["lastBuild", "api", "json"])?;
        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.api_token))
            .send()
            .await
            .context("jenkins last-build request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("jenkins last-build failed with status {}", status.as_u16());
        }
        response
            .json::<JenkinsLastBuildResponse>()
            .await
            .context("failed to decode jenkins last-build")
    }
}

#[async_trait]
impl CiClient for JenkinsClient {
    async fn list_jobs(&self) -> Vec<String> {
        match self.fetch_job_list().await {
            Ok(jobs) => jobs,
            Err(error) => {
                tracing::warn!(%error, "failed to list jenkins jobs");
                Vec::new()
            }
        }
    }

    async fn trigger_build(&self, job_name: &str) -> bool {
        match self.post_trigger(job_name).await {
            Ok(()) => {
                tracing::info!(job = job_name, "triggered jenkins build");
                true
            }
            Err(error) => {
                tracing::warn!(job = job_name, %error, "failed to trigger jenkins build");
                false
            }
        }
    }

    async fn latest_build_number(&self, job_name: &str) -> Option<u64> {
        match self.fetch_last_build(job_name).await {
            Ok(build) => build.number,
            Err(error) => {
                tracing::warn!(job = job_name, %error, "failed to fetch jenkins build number");
                None
            }
        }
    }

    async fn job_status(&self, job_name: &str) -> String {
        match self.fetch_last_build(job_name).await {
            Ok(build) => build
                .result
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| STATUS_IN_PROGRESS.to_string()),
            Err(error) => {
                tracing::warn!(job = job_name, %error, "failed to fetch jenkins job status");
                STATUS_ERROR.to_string()
            }
        }
    }
}
