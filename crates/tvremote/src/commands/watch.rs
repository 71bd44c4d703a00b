//! `watch`: hold a session open and stream its events.
//!
//! Unlike the one-shot commands this uses the profile's reconnect policy,
//! so the session survives the TV dropping off the network.

use owo_colors::OwoColorize;
use serde_json::json;
use tokio_stream::StreamExt;

use tvremote_core::{AuthStatus, SessionController, SessionEvent, SessionPhase};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let mut target = config::resolve_target(global)?;
    let session_config = config::session_config(&target, global)?;

    let controller = SessionController::new(session_config);
    let mut events = controller.events();
    controller.connect()?;

    let color = output::should_color(&global.color);
    let mut state = controller.state();
    let ended = state.wait_for(|s| match s.phase {
        SessionPhase::Failed => true,
        SessionPhase::Disconnected => s.last_error.is_some(),
        _ => false,
    });
    tokio::pin!(ended);

    let result = loop {
        tokio::select! {
            biased;
            next = events.next() => {
                let Some(next) = next else { break Ok(()) };
                let Ok(event) = next else {
                    tracing::warn!("event stream lagged; some events were skipped");
                    continue;
                };

                if let SessionEvent::TokenRefreshed(ref token) = event {
                    if let Err(e) = config::persist_token(&mut target, token) {
                        break Err(e);
                    }
                }
                output::print_output(&render(&event, &global.output, color), global.quiet);

                if matches!(
                    event,
                    SessionEvent::AuthorizationChanged { status: AuthStatus::Denied, .. }
                ) {
                    break Err(CliError::PairingDenied);
                }
            }
            res = &mut ended => {
                let error = res.ok().and_then(|s| s.last_error.clone());
                break Err(error.map_or_else(
                    || CliError::ConnectionLost { reason: "session ended".into() },
                    CliError::from,
                ));
            }
            _ = tokio::signal::ctrl_c() => break Ok(()),
        }
    };

    controller.disconnect();
    result
}

fn detail(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Connected { reconnect } => {
            if *reconnect { "reconnected".into() } else { String::new() }
        }
        SessionEvent::Disconnected { reason, code } => match code {
            Some(code) => format!("{reason} (code {code})"),
            None => reason.clone(),
        },
        SessionEvent::AuthorizationChanged { status, .. } => status.to_string(),
        SessionEvent::TokenRefreshed(_) => "(token hidden)".into(),
        SessionEvent::CommandWritten(command) => command.label().to_string(),
        SessionEvent::Error(e) => e.to_string(),
        SessionEvent::TextReceived(text) => text.clone(),
        SessionEvent::Reconnecting { attempt, delay } => {
            format!("attempt {attempt} in {}s", delay.as_secs())
        }
    }
}

fn render(event: &SessionEvent, format: &OutputFormat, color: bool) -> String {
    let name = event.name();
    let detail = detail(event);
    match format {
        OutputFormat::Json => json!({ "event": name, "detail": detail }).to_string(),
        OutputFormat::Plain => format!("{name}\t{detail}"),
        OutputFormat::Table if !color => format!("{name:<22} {detail}"),
        OutputFormat::Table => {
            let padded = format!("{name:<22}");
            let painted = match event {
                SessionEvent::Error(_) => padded.red().to_string(),
                SessionEvent::Reconnecting { .. } | SessionEvent::Disconnected { .. } => {
                    padded.yellow().to_string()
                }
                SessionEvent::Connected { .. } | SessionEvent::AuthorizationChanged { .. } => {
                    padded.green().to_string()
                }
                _ => padded.dimmed().to_string(),
            };
            format!("{painted} {detail}")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn renders_events_per_format() {
        let event = SessionEvent::Reconnecting {
            attempt: 2,
            delay: Duration::from_secs(5),
        };
        assert_eq!(
            render(&event, &OutputFormat::Plain, false),
            "reconnecting\tattempt 2 in 5s"
        );
        assert_eq!(
            render(&event, &OutputFormat::Json, false),
            r#"{"detail":"attempt 2 in 5s","event":"reconnecting"}"#
        );
    }

    #[test]
    fn never_prints_tokens() {
        let event = SessionEvent::TokenRefreshed("s3cret".to_string().into());
        assert!(!render(&event, &OutputFormat::Table, false).contains("s3cret"));
    }
}
