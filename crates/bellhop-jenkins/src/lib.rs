//! Jenkins REST client used by the Bellhop dialogue flow.
//!
//! Every operation is best-effort: transport failures and non-success
//! responses degrade to an empty or failure value instead of propagating, so
//! the dialogue engine only ever sees typed results.

use async_trait::async_trait;

mod jenkins_api_client;

pub use jenkins_api_client::JenkinsClient;

/// Result tag reported while the latest build has not concluded.
pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
/// Result tag reported when the build status could not be retrieved at all.
pub const STATUS_ERROR: &str = "ERROR";

#[derive(Debug, Clone)]
/// Connection settings for one Jenkins server.
pub struct JenkinsConfig {
    pub base_url: String,
    pub username: String,
    pub api_token: String,
    pub request_timeout_ms: u64,
}

/// CI operations the dialogue engine depends on. Implementations must not
/// error: a failed remote call becomes the empty/failure value of the
/// operation's return type.
#[async_trait]
pub trait CiClient: Send + Sync {
    /// All job names known to the CI server, in server order. Empty on any
    /// failure.
    async fn list_jobs(&self) -> Vec<String>;

    /// Subsequence of `list_jobs` whose names start with `prefix`,
    /// case-insensitive.
    async fn list_jobs_by_prefix(&self, prefix: &str) -> Vec<String> {
        let needle = prefix.to_lowercase();
        self.list_jobs()
            .await
            .into_iter()
            .filter(|job| job.to_lowercase().starts_with(&needle))
            .collect()
    }

    /// True iff the server accepted the trigger request.
    async fn trigger_build(&self, job_name: &str) -> bool;

    /// Number of the job's latest build, when one is known.
    async fn latest_build_number(&self, job_name: &str) -> Option<u64>;

    /// Terminal result of the latest build, [`STATUS_IN_PROGRESS`] while it
    /// has not concluded, or [`STATUS_ERROR`] when the fetch failed.
    async fn job_status(&self, job_name: &str) -> String;
}
