//! Terminal rendering of availability reports.

use crate::availability::{AvailabilityReport, ResolveOutcome, ServerAvailability, Status};
use crate::ombi::SubmitError;
use std::fmt::Write;
use yansi::Paint;

fn status_marker(status: Status) -> String {
    let dot = "●";
    match status {
        Status::Available => dot.green().to_string(),
        Status::Requested => dot.rgb(255, 165, 0).to_string(),
        Status::Unavailable => dot.bright_black().to_string(),
        Status::Error => dot.red().to_string(),
    }
}

/// The action a row offers, mirroring the popup's buttons.
fn row_action(row: &ServerAvailability, movie_title: &str) -> String {
    match row.status {
        Status::Available => match &row.plex_url {
            Some(url) => format!("Watch: {url}"),
            None => "Available".to_owned(),
        },
        Status::Requested => "Requested".to_owned(),
        Status::Unavailable => match &row.id {
            Some(id) => format!(
                "Request: plexboxd request --server {:?} --movie-id {id} --title {movie_title:?}",
                row.server_name
            ),
            None => "Unavailable".to_owned(),
        },
        Status::Error => "Error".to_owned(),
    }
}

pub fn render_report(movie_title: &str, report: &AvailabilityReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", movie_title.bold());

    let width = report
        .per_server
        .iter()
        .map(|r| r.server_name.chars().count())
        .max()
        .unwrap_or(0);

    for row in &report.per_server {
        let cached = if row.cached {
            " (cached)".dim().to_string()
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "  {} {:<width$}  {}{cached}",
            status_marker(row.status),
            row.server_name,
            row_action(row, movie_title),
        );
    }

    if report.any_available {
        let _ = writeln!(out, "{}", "✓ Available on at least one server".green());
    }
    out
}

pub fn render_outcome(movie_title: &str, outcome: &ResolveOutcome) -> String {
    match outcome {
        ResolveOutcome::Disabled => {
            "Availability checks are disabled (plexboxd settings enable)\n".to_owned()
        }
        ResolveOutcome::NoMovieIdentity => {
            "No movie information found. Pass --title or --tmdb-id.\n".to_owned()
        }
        ResolveOutcome::NoServersConfigured => {
            "No servers configured. Add one with `plexboxd servers add`.\n".to_owned()
        }
        ResolveOutcome::Resolved(report) => render_report(movie_title, report),
    }
}

/// User-facing message for a failed submission; each kind reads differently.
pub fn submit_error_message(error: &SubmitError) -> String {
    match error {
        SubmitError::AuthenticationFailed => {
            "Authentication failed. Please check your API key in the server settings.".to_owned()
        }
        SubmitError::ServerError => {
            "Server error. Please verify your Ombi configuration and API key.".to_owned()
        }
        SubmitError::SubmissionFailed {
            status: Some(status),
            ..
        } => format!(
            "Failed to make request ({status}). Please check the server logs for more details."
        ),
        SubmitError::SubmissionFailed { status: None, .. } => {
            "Failed to make request. Please check if the server is running and accessible."
                .to_owned()
        }
        other => other.to_string(),
    }
}
