//! Opening a paired session for one-shot commands.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::ExposeSecret;
use tokio::sync::broadcast;

use tvremote_core::{AuthStatus, ErrorKind, ReconnectPolicy, SessionController, SessionEvent};

use crate::cli::GlobalOpts;
use crate::config::{self, Target, TokenStore};
use crate::error::CliError;

/// A connected, authorized session.
pub struct Session {
    pub controller: SessionController,
    pub target: Target,
    /// Where a newly issued token was persisted, if one was.
    pub stored: Option<TokenStore>,
    events: broadcast::Receiver<SessionEvent>,
    write_timeout: Duration,
}

/// Connect to the target TV and wait for it to allow this client.
///
/// One-shot commands never reconnect: a failure is reported instead.
/// A token the TV issued (or refreshed) is persisted when `save_token`.
pub async fn open(global: &GlobalOpts, save_token: bool) -> Result<Session, CliError> {
    let mut target = config::resolve_target(global)?;
    let mut session_config = config::session_config(&target, global)?;
    session_config.reconnect = ReconnectPolicy::disabled();

    let initial_token = session_config
        .token
        .as_ref()
        .map(|t| t.expose_secret().to_owned());
    let wait = session_config.connect_timeout + session_config.pairing_timeout;
    let write_timeout = session_config.connect_timeout;

    let controller = SessionController::new(session_config);
    let events = controller.subscribe();
    controller.connect()?;

    let spinner = pairing_spinner(global, initial_token.is_none());
    let outcome = controller.wait_for_authorization(wait).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        Ok(AuthStatus::Allowed) => {}
        Ok(AuthStatus::Denied) => {
            controller.disconnect();
            return Err(CliError::PairingDenied);
        }
        Ok(AuthStatus::Unauthorized) => {
            controller.disconnect();
            return Err(CliError::PairingEnded);
        }
        Err(e) => {
            controller.disconnect();
            return Err(e.into());
        }
    }

    let mut stored = None;
    if save_token {
        if let Some(token) = controller.token() {
            if initial_token.as_deref() != Some(token.expose_secret()) {
                let store = config::persist_token(&mut target, &token)?;
                tracing::info!(profile = %target.profile_name, ?store, "stored pairing token");
                stored = Some(store);
            }
        }
    }

    Ok(Session {
        controller,
        target,
        stored,
        events,
        write_timeout,
    })
}

fn pairing_spinner(global: &GlobalOpts, first_pairing: bool) -> Option<ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(if first_pairing {
        "Waiting for you to allow access on the TV..."
    } else {
        "Connecting..."
    });
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

impl Session {
    /// Wait until `count` queued commands have been written to the socket.
    pub async fn flush(&mut self, count: usize) -> Result<(), CliError> {
        let timeout = self.write_timeout;
        let waited = tokio::time::timeout(timeout, async {
            let mut written = 0;
            while written < count {
                match self.events.recv().await {
                    Ok(SessionEvent::CommandWritten(command)) => {
                        tracing::debug!(command = command.label(), "written");
                        written += 1;
                    }
                    Ok(SessionEvent::Error(e)) if e.kind() == ErrorKind::Protocol => {
                        tracing::warn!(error = %e, "ignoring protocol error");
                    }
                    Ok(SessionEvent::Error(e)) => return Err(e.into()),
                    Ok(SessionEvent::Disconnected { reason, .. }) => {
                        return Err(CliError::ConnectionLost { reason });
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(CliError::ConnectionLost {
                            reason: "session ended".into(),
                        });
                    }
                }
            }
            Ok(())
        })
        .await;

        waited.unwrap_or_else(|_| {
            Err(CliError::Timeout {
                seconds: timeout.as_secs(),
            })
        })
    }

    pub fn close(self) {
        self.controller.disconnect();
    }
}
