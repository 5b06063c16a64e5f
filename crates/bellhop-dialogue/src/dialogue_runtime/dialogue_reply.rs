//! Reply texts and menu payloads produced by the dialogue steps.

use bellhop_whatsapp::{OutboundPayload, ReplyOption, MAX_BUTTONS, MAX_LIST_ROWS};

use super::CUSTOM_SCOPE;

pub(super) const GREETING_BODY: &str = "Welcome to Bellhop! Select a customer:";
pub(super) const CUSTOM_SCOPE_TITLE: &str = "Customize Selection";
pub(super) const INVALID_SELECTION_TEXT: &str = "Invalid selection. Type 'hi' to restart.";
pub(super) const INVALID_JOB_TEXT: &str = "Invalid job. Type 'hi' to restart.";
pub(super) const INVALID_ACTION_TEXT: &str = "Invalid action. Type 'hi' to restart.";
pub(super) const TERMINATED_TEXT: &str = "Session terminated. Type 'hi' to start again.";
pub(super) const INTERNAL_ERROR_TEXT: &str = "Something went wrong. Type 'hi' to restart.";

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Greeting menu: the configured customers (as many as the button cap leaves
/// room for) plus the unscoped "custom" entry.
pub(super) fn customer_menu(customers: &[String]) -> OutboundPayload {
    let mut options = customers
        .iter()
        .take(MAX_BUTTONS - 1)
        .map(|customer| ReplyOption::new(customer.to_lowercase(), title_case(customer)))
        .collect::<Vec<_>>();
    options.push(ReplyOption::new(CUSTOM_SCOPE, CUSTOM_SCOPE_TITLE));
    OutboundPayload::buttons(GREETING_BODY, options)
}

/// Job menu for a named customer scope. Only the first three candidates fit
/// on buttons; the rest stay selectable via their stored names only.
pub(super) fn job_button_menu(jobs: &[String]) -> OutboundPayload {
    let options = jobs
        .iter()
        .take(MAX_BUTTONS)
        .map(|job| ReplyOption::new(job.clone(), job.clone()))
        .collect();
    OutboundPayload::buttons("Select Job to Trigger", options)
}

/// Job menu for the unscoped flow, as a list capped at ten rows.
pub(super) fn job_list_menu(jobs: &[String]) -> OutboundPayload {
    let rows = jobs
        .iter()
        .take(MAX_LIST_ROWS)
        .map(|job| ReplyOption::new(job.clone(), job.clone()))
        .collect();
    OutboundPayload::list(
        "Select Jenkins Job",
        "Choose a job to trigger or check status.",
        "Show Jobs",
        "All Jenkins Jobs",
        rows,
    )
}

pub(super) fn job_action_menu(job_name: &str) -> OutboundPayload {
    OutboundPayload::buttons(
        format!("Job: {job_name}\nChoose action:"),
        vec![
            ReplyOption::new("trigger", "Trigger Build"),
            ReplyOption::new("status", "Check Status"),
            ReplyOption::new("terminate", "Terminate Session"),
        ],
    )
}

pub(super) fn no_jobs_text(scope: Option<&str>) -> OutboundPayload {
    match scope {
        Some(customer) => OutboundPayload::text(format!(
            "No jobs found for {customer}. Type 'hi' to restart."
        )),
        None => OutboundPayload::text("No jobs found. Type 'hi' to restart."),
    }
}

pub(super) fn trigger_success_text(
    job_name: &str,
    build_number: Option<u64>,
    status: &str,
) -> OutboundPayload {
    let build_label = build_number
        .map(|number| format!("#{number}"))
        .unwrap_or_else(|| "N/A".to_string());
    OutboundPayload::text(format!(
        "Job '{job_name}' triggered.\nBuild: {build_label}\nStatus: {status}\nType 'hi' to restart."
    ))
}

pub(super) fn trigger_failure_text(job_name: &str) -> OutboundPayload {
    OutboundPayload::text(format!(
        "Failed to trigger job '{job_name}'. Type 'hi' to restart."
    ))
}

pub(super) fn job_status_text(job_name: &str, status: &str) -> OutboundPayload {
    OutboundPayload::text(format!(
        "Job '{job_name}' status: {status}\nType 'hi' to restart."
    ))
}
