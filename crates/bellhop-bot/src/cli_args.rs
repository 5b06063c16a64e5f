use std::path::PathBuf;

use clap::Parser;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "bellhop",
    about = "Chat-driven concierge for triggering and watching Jenkins jobs",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "BELLHOP_BIND",
        default_value = "0.0.0.0:8080",
        help = "Socket address the webhook gateway listens on"
    )]
    pub bind: String,

    #[arg(
        long = "verify-token",
        env = "BELLHOP_VERIFY_TOKEN",
        help = "Static token echoed back during webhook subscription verification"
    )]
    pub verify_token: String,

    #[arg(
        long = "session-store",
        env = "BELLHOP_SESSION_STORE",
        default_value = ".bellhop/sessions.json",
        help = "Session store path; a .sqlite or .db extension selects the SQLite backend"
    )]
    pub session_store: PathBuf,

    #[arg(long = "jenkins-url", env = "BELLHOP_JENKINS_URL", help = "Jenkins base URL")]
    pub jenkins_url: String,

    #[arg(
        long = "jenkins-username",
        env = "BELLHOP_JENKINS_USERNAME",
        help = "Jenkins user the API token belongs to"
    )]
    pub jenkins_username: String,

    #[arg(
        long = "jenkins-token",
        env = "BELLHOP_JENKINS_TOKEN",
        help = "Jenkins API token"
    )]
    pub jenkins_token: String,

    #[arg(
        long = "whatsapp-api-base",
        env = "BELLHOP_WHATSAPP_API_BASE",
        default_value = "https://graph.facebook.com/v19.0",
        help = "WhatsApp Cloud API base URL"
    )]
    pub whatsapp_api_base: String,

    #[arg(
        long = "whatsapp-phone-id",
        env = "BELLHOP_WHATSAPP_PHONE_ID",
        help = "Phone number id the outbound messages are sent from"
    )]
    pub whatsapp_phone_id: String,

    #[arg(
        long = "whatsapp-token",
        env = "BELLHOP_WHATSAPP_TOKEN",
        help = "WhatsApp Cloud API bearer token"
    )]
    pub whatsapp_token: String,

    #[arg(
        long,
        env = "BELLHOP_CUSTOMERS",
        value_delimiter = ',',
        default_value = "goognu,hiringgo",
        help = "Customer scopes offered in the greeting menu, matched as job-name prefixes"
    )]
    pub customers: Vec<String>,

    #[arg(
        long = "request-timeout-ms",
        env = "BELLHOP_REQUEST_TIMEOUT_MS",
        default_value_t = 5_000,
        help = "Fixed timeout applied to every Jenkins and WhatsApp request"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "poll-retry-max-attempts",
        env = "BELLHOP_POLL_RETRY_MAX_ATTEMPTS",
        default_value_t = 5,
        value_parser = parse_positive_usize,
        help = "Build-number poll attempts after a successful trigger"
    )]
    pub poll_retry_max_attempts: usize,

    #[arg(
        long = "poll-retry-delay-ms",
        env = "BELLHOP_POLL_RETRY_DELAY_MS",
        default_value_t = 2_000,
        help = "Fixed delay between build-number poll attempts"
    )]
    pub poll_retry_delay_ms: u64,
}
