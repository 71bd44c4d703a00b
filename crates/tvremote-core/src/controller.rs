// ── Session controller ──
//
// Full lifecycle management for one logical session with a device.
// Opens the socket, infers pairing from the frames the device volunteers,
// gates and serializes outbound commands, and re-opens the socket after
// transport failures according to the reconnect policy.
//
// Every connect() spawns one session task tagged with a fresh generation.
// The task is the only code that touches the socket; caller-facing calls
// only flip state and push into the command queue, so none of them block
// on network I/O.

use std::future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Instrument, debug, info, warn};

use tvremote_api::decoder::{FrameOutcome, decode_frame};
use tvremote_api::protocol::{ControlKey, RemoteCommand};
use tvremote_api::websocket::{Inbound, SessionTransport};

use crate::config::SessionConfig;
use crate::dispatcher::{self, CommandQueue, Delivery, Dispatcher};
use crate::error::CoreError;
use crate::event::SessionEvent;
use crate::reconnect::ReconnectState;
use crate::state::{AuthStatus, SessionPhase, SessionState};

const EVENT_CHANNEL_SIZE: usize = 256;
const CLOSE_GRACE: Duration = Duration::from_secs(1);

// ── SessionController ────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. At most one session task
/// (and therefore one socket) is live per controller at any time.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: SessionConfig,
    state: watch::Sender<SessionState>,
    event_tx: broadcast::Sender<SessionEvent>,
    token: RwLock<Option<SecretString>>,
    session: Mutex<Option<ActiveSession>>,
    /// Task of the last disconnected session, possibly still closing its
    /// socket. The next session waits for it before connecting.
    retiring: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
    log_dispatch: Option<tracing::Dispatch>,
}

struct ActiveSession {
    generation: u64,
    cancel: CancellationToken,
    queue: CommandQueue,
    handle: JoinHandle<()>,
}

impl ActiveSession {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl SessionController {
    /// Create a controller. Does NOT connect -- call
    /// [`connect()`](Self::connect) to start the session.
    pub fn new(config: SessionConfig) -> Self {
        Self::build(config, None)
    }

    /// Like [`new`](Self::new), but session logs go to `dispatch` instead
    /// of the ambient subscriber.
    pub fn with_log_dispatch(config: SessionConfig, dispatch: tracing::Dispatch) -> Self {
        Self::build(config, Some(dispatch))
    }

    fn build(config: SessionConfig, log_dispatch: Option<tracing::Dispatch>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let token = RwLock::new(config.token.clone());

        Self {
            inner: Arc::new(ControllerInner {
                config,
                state,
                event_tx,
                token,
                session: Mutex::new(None),
                retiring: Mutex::new(None),
                generation: AtomicU64::new(0),
                log_dispatch,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Start the session in the background.
    ///
    /// Returns immediately; progress is reported through [`state()`](Self::state)
    /// and [`subscribe()`](Self::subscribe). Fails with
    /// [`CoreError::AlreadyConnected`] while a session is live: call
    /// [`disconnect()`](Self::disconnect) or [`reconnect()`](Self::reconnect)
    /// instead of opening a second socket.
    pub fn connect(&self) -> Result<(), CoreError> {
        let inner = &self.inner;
        let mut slot = inner.lock_session();
        if slot.as_ref().is_some_and(ActiveSession::is_live) {
            return Err(CoreError::AlreadyConnected);
        }

        inner.config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            CoreError::Internal("connect() must be called inside a Tokio runtime".into())
        })?;

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        inner.state.send_replace(SessionState {
            phase: SessionPhase::Connecting,
            generation,
            ..SessionState::default()
        });

        let (queue, dispatcher) = dispatcher::channel();
        let cancel = CancellationToken::new();
        let task = SessionTask {
            inner: Arc::clone(inner),
            generation,
            cancel: cancel.clone(),
            previous: inner.lock_retiring().take(),
            dispatcher,
            reconnect: ReconnectState::new(inner.config.reconnect.clone()),
        };

        let host = inner.config.host;
        let make_span = || tracing::info_span!("tv_session", %host, generation);
        let handle = match &inner.log_dispatch {
            Some(dispatch) => {
                let span = tracing::dispatcher::with_default(dispatch, make_span);
                runtime.spawn(task.run().instrument(span).with_subscriber(dispatch.clone()))
            }
            None => runtime.spawn(task.run().instrument(make_span())),
        };

        *slot = Some(ActiveSession {
            generation,
            cancel,
            queue,
            handle,
        });
        Ok(())
    }

    /// Tear the session down.
    ///
    /// Safe to call from anywhere and at any time. Cancels the session task
    /// (including its watchdog and back-off timers), drops queued commands
    /// and forces [`AuthStatus::Unauthorized`]. Anything the old task was
    /// still doing completes as a no-op. The old socket finishes closing in
    /// the background; a following [`connect()`](Self::connect) does not
    /// open its socket until then.
    pub fn disconnect(&self) {
        let inner = &self.inner;
        let mut slot = inner.lock_session();
        let active = slot.take();

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let was_live = active.as_ref().is_some_and(ActiveSession::is_live);
        if let Some(active) = active {
            active.cancel.cancel();
            *inner.lock_retiring() = Some(active.handle);
        }
        inner.state.send_replace(SessionState {
            generation,
            ..SessionState::default()
        });
        drop(slot);

        if was_live {
            info!(host = %inner.config.host, "session disconnected");
            let _ = inner.event_tx.send(SessionEvent::Disconnected {
                reason: "manual disconnect".into(),
                code: None,
            });
        }
    }

    /// Disconnect, then connect with the current token.
    pub fn reconnect(&self) -> Result<(), CoreError> {
        self.disconnect();
        self.connect()
    }

    /// Whether a session task is running (regardless of pairing).
    pub fn is_connected(&self) -> bool {
        self.inner
            .lock_session()
            .as_ref()
            .is_some_and(ActiveSession::is_live)
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Queue a command for delivery.
    ///
    /// Rejected up front with [`CoreError::NotConnected`] when no session
    /// is live and [`CoreError::NotAuthorized`] unless the device has
    /// allowed this client; nothing is queued in either case. Delivery
    /// outcomes are reported as [`SessionEvent::CommandWritten`] or
    /// [`SessionEvent::Error`].
    pub fn send_command(&self, command: RemoteCommand) -> Result<(), CoreError> {
        self.enqueue_all([command])
    }

    pub fn send_key(&self, key: ControlKey) -> Result<(), CoreError> {
        self.send_command(RemoteCommand::key(key))
    }

    /// Queue several keys back to back; no other caller's commands are
    /// interleaved.
    pub fn send_keys(&self, keys: impl IntoIterator<Item = ControlKey>) -> Result<(), CoreError> {
        self.enqueue_all(keys.into_iter().map(RemoteCommand::key))
    }

    pub fn move_mouse(&self, dx: i32, dy: i32) -> Result<(), CoreError> {
        self.send_command(RemoteCommand::mouse_move(dx, dy))
    }

    pub fn left_click(&self) -> Result<(), CoreError> {
        self.send_command(RemoteCommand::left_click())
    }

    /// Type `text` into the focused input field on the device.
    pub fn send_text(&self, text: &str) -> Result<(), CoreError> {
        self.send_command(RemoteCommand::input_text(text))
    }

    fn enqueue_all(
        &self,
        commands: impl IntoIterator<Item = RemoteCommand>,
    ) -> Result<(), CoreError> {
        let slot = self.inner.lock_session();
        let active = slot
            .as_ref()
            .filter(|a| a.is_live())
            .ok_or(CoreError::NotConnected)?;

        let status = self.inner.state.borrow().auth;
        if status != AuthStatus::Allowed {
            return Err(CoreError::NotAuthorized { status });
        }

        for command in commands {
            active.queue.enqueue(command)?;
        }
        Ok(())
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Session events as a `Stream`, for use with `StreamExt` combinators.
    pub fn events(&self) -> BroadcastStream<SessionEvent> {
        BroadcastStream::new(self.subscribe())
    }

    /// Subscribe to session state changes.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.inner.state.borrow().auth
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase
    }

    /// The latest token the device issued, or the configured one.
    pub fn token(&self) -> Option<SecretString> {
        self.inner.read_token().clone()
    }

    /// Wait until the handshake settles.
    ///
    /// `Ok(Allowed)` or `Ok(Denied)` once the device answered; the error
    /// that stopped the session if it failed or ended; `Timeout` if
    /// nothing settled in time. Automatic reconnects keep waiting.
    pub async fn wait_for_authorization(&self, timeout: Duration) -> Result<AuthStatus, CoreError> {
        let mut rx = self.state();
        let settled = match tokio::time::timeout(timeout, rx.wait_for(|s| s.phase.is_settled())).await
        {
            Ok(Ok(state)) => state.clone(),
            Ok(Err(_)) => return Err(CoreError::NotConnected),
            Err(_) => {
                return Err(CoreError::Timeout {
                    timeout_secs: timeout.as_secs(),
                });
            }
        };

        match settled.phase {
            SessionPhase::Allowed => Ok(AuthStatus::Allowed),
            SessionPhase::Denied => Ok(AuthStatus::Denied),
            _ => Err(settled.last_error.unwrap_or(CoreError::NotConnected)),
        }
    }
}

impl ControllerInner {
    fn lock_session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_retiring(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.retiring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_token(&self) -> std::sync::RwLockReadGuard<'_, Option<SecretString>> {
        self.token.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn token_for_url(&self) -> Option<String> {
        self.read_token()
            .as_ref()
            .map(|t| t.expose_secret().to_owned())
    }

    /// Apply `f` to the published state if `generation` is still current.
    fn update(&self, generation: u64, f: impl FnOnce(&mut SessionState)) {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            let before = state.clone();
            f(state);
            *state != before
        });
    }

    /// Broadcast `event` if `generation` is still current. The state read
    /// lock is held across the send so a concurrent disconnect() cannot
    /// slip in between the check and the send.
    fn emit(&self, generation: u64, event: SessionEvent) {
        let state = self.state.borrow();
        if state.generation == generation {
            debug!(event = event.name(), "session event");
            let _ = self.event_tx.send(event);
        }
    }

    fn store_token(&self, generation: u64, token: SecretString) {
        let state = self.state.borrow();
        if state.generation == generation {
            *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        }
    }

    /// Forget the session slot if it still belongs to `generation`.
    fn release(&self, generation: u64) {
        let mut slot = self.lock_session();
        if slot.as_ref().is_some_and(|a| a.generation == generation) {
            *slot = None;
        }
    }
}

// ── Session task ─────────────────────────────────────────────────

/// How one connection ended.
enum Exit {
    /// disconnect() was called; state is already published.
    Cancelled,
    /// The device ended the session on purpose. No reconnect.
    Ended { reason: String, error: CoreError },
    /// Transport failure or watchdog expiry. `opened` is set when the
    /// socket had been established.
    Failed { error: CoreError, opened: bool },
    /// Nothing a retry could fix.
    Fatal(CoreError),
}

struct SessionTask {
    inner: Arc<ControllerInner>,
    generation: u64,
    cancel: CancellationToken,
    previous: Option<JoinHandle<()>>,
    dispatcher: Dispatcher,
    reconnect: ReconnectState,
}

impl SessionTask {
    async fn run(mut self) {
        debug!("session task started");

        // Awaited even if cancelled meanwhile: a session queued behind this
        // one must not open its socket before the older one is closed.
        if let Some(previous) = self.previous.take() {
            if previous.await.is_err() {
                debug!("previous session task aborted");
            }
        }

        loop {
            match self.connect_once().await {
                Exit::Cancelled => {
                    debug!("session cancelled");
                    break;
                }
                Exit::Ended { reason, error } => {
                    info!(%reason, "session ended by device");
                    self.finish(vec![SessionEvent::Disconnected { reason, code: None }], |s| {
                        s.phase = SessionPhase::Disconnected;
                        s.auth = AuthStatus::Unauthorized;
                        s.reconnecting = false;
                        s.attempt = 0;
                        s.last_error = Some(error);
                    });
                    break;
                }
                Exit::Fatal(error) => {
                    warn!(error = %error, "session cannot start");
                    self.finish(vec![SessionEvent::Error(error.clone())], |s| {
                        s.phase = SessionPhase::Failed;
                        s.last_error = Some(error);
                    });
                    break;
                }
                Exit::Failed { error, opened } => {
                    if !self.recover(error, opened).await {
                        break;
                    }
                }
            }
        }

        self.inner.release(self.generation);
        debug!("session task finished");
    }

    /// Apply the reconnect policy after a failure. Returns `false` when
    /// the session is over.
    async fn recover(&mut self, error: CoreError, opened: bool) -> bool {
        let authorized = self.inner.state.borrow().is_authorized();
        warn!(
            error = %error,
            reconnecting = self.reconnect.is_reconnecting(),
            authorized,
            "connection failed"
        );

        let mut events = Vec::new();
        if self.reconnect.should_report(authorized) {
            events.push(SessionEvent::Error(error.clone()));
        }
        if opened {
            let code = match &error {
                CoreError::ConnectionLost { code, .. } => Some(*code),
                _ => None,
            };
            events.push(SessionEvent::Disconnected {
                reason: error.to_string(),
                code,
            });
        }

        let Some(delay) = self.reconnect.next_delay() else {
            let attempts = self.reconnect.attempt();
            if attempts > 0 {
                warn!(attempts, "giving up reconnecting");
                events.push(SessionEvent::Error(CoreError::ReconnectExhausted { attempts }));
            }
            self.finish(events, |s| {
                s.phase = SessionPhase::Failed;
                s.reconnecting = false;
                s.last_error = Some(error);
            });
            return false;
        };

        for event in events {
            self.emit(event);
        }

        let attempt = self.reconnect.attempt();
        self.update(|s| {
            s.phase = SessionPhase::Connecting;
            s.reconnecting = true;
            s.attempt = attempt;
            s.last_error = Some(error);
        });
        info!(attempt, ?delay, "reconnect scheduled");
        self.emit(SessionEvent::Reconnecting { attempt, delay });

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }

    /// Open one socket and run it until it ends.
    async fn connect_once(&mut self) -> Exit {
        let reconnect = self.reconnect.is_reconnecting();
        // The watchdog only guards the first connection.
        let mut deadline =
            (!reconnect).then(|| Instant::now() + self.inner.config.pairing_timeout);

        let url = match self.inner.config.session_url(self.inner.token_for_url().as_deref()) {
            Ok(url) => url,
            Err(e) => return Exit::Fatal(e),
        };
        self.update(|s| s.phase = SessionPhase::Connecting);

        let transport_config = self.inner.config.transport();
        let mut transport = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Exit::Cancelled,
            () = watchdog(deadline) => {
                return Exit::Failed { error: self.pairing_timed_out(), opened: false };
            }
            result = SessionTransport::connect(&url, &transport_config) => match result {
                Ok(transport) => transport,
                Err(e) => {
                    return Exit::Failed { error: self.connect_error(e), opened: false };
                }
            },
        };

        self.update(|s| s.phase = SessionPhase::Authorizing);
        info!(reconnect, "socket open, waiting for pairing answer");
        self.emit(SessionEvent::Connected { reconnect });

        let exit = self.pump(&mut transport, &mut deadline).await;
        if tokio::time::timeout(CLOSE_GRACE, transport.close()).await.is_err() {
            debug!("close handshake timed out");
        }
        exit
    }

    /// Read frames and deliver commands until the connection ends. Only
    /// one read is outstanding at a time, and commands flow only while the
    /// session is allowed.
    async fn pump(
        &mut self,
        transport: &mut SessionTransport,
        deadline: &mut Option<Instant>,
    ) -> Exit {
        loop {
            let allowed = self.inner.state.borrow().phase == SessionPhase::Allowed;

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Exit::Cancelled,
                () = watchdog(*deadline) => {
                    return Exit::Failed { error: self.pairing_timed_out(), opened: true };
                }
                frame = transport.next_frame() => match frame {
                    Ok(Inbound::Closed { code, reason }) => {
                        return Exit::Failed {
                            error: CoreError::ConnectionLost { code, reason },
                            opened: true,
                        };
                    }
                    Ok(inbound) => {
                        if let Some(exit) = self.handle_frame(&inbound, deadline) {
                            return exit;
                        }
                    }
                    Err(e) => return Exit::Failed { error: e.into(), opened: true },
                },
                head = self.dispatcher.next(), if allowed => {
                    let Some(head) = head else { return Exit::Cancelled };
                    if let Some(exit) = self.deliver(head, transport).await {
                        return exit;
                    }
                }
            }
        }
    }

    /// Apply one inbound frame to the session.
    fn handle_frame(&mut self, inbound: &Inbound, deadline: &mut Option<Instant>) -> Option<Exit> {
        let payload = inbound.payload()?;
        if let Inbound::Text(text) = inbound {
            self.emit(SessionEvent::TextReceived(text.clone()));
        }

        let frame = match decode_frame(payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "ignoring malformed frame");
                self.emit(SessionEvent::Error(e.into()));
                return None;
            }
        };

        let reconnect = self.reconnect.is_reconnecting();
        match frame.outcome {
            FrameOutcome::Authorized { token } => {
                *deadline = None;
                if let Some(token) = &token {
                    self.inner
                        .store_token(self.generation, SecretString::from(token.clone()));
                }
                info!(reconnect, "pairing allowed");
                self.update(|s| {
                    s.phase = SessionPhase::Allowed;
                    s.auth = AuthStatus::Allowed;
                    s.reconnecting = false;
                    s.attempt = 0;
                    s.last_error = None;
                });
                self.reconnect.reset();
                self.emit(SessionEvent::AuthorizationChanged {
                    status: AuthStatus::Allowed,
                    reconnect,
                });

                match token {
                    Some(token) => self.emit(SessionEvent::TokenRefreshed(SecretString::from(token))),
                    None => {
                        warn!("connect frame carried no token");
                        self.emit(SessionEvent::Error(CoreError::MissingToken));
                    }
                }
            }
            FrameOutcome::Denied => {
                *deadline = None;
                self.update(|s| {
                    s.phase = SessionPhase::Denied;
                    s.auth = AuthStatus::Denied;
                });
                warn!("pairing denied on the device");
                self.emit(SessionEvent::AuthorizationChanged {
                    status: AuthStatus::Denied,
                    reconnect,
                });
            }
            FrameOutcome::TimedOut => {
                self.update(|s| s.auth = AuthStatus::Unauthorized);
                self.emit(SessionEvent::AuthorizationChanged {
                    status: AuthStatus::Unauthorized,
                    reconnect,
                });
                return Some(Exit::Ended {
                    reason: "device ended the pairing attempt".into(),
                    error: CoreError::PairingEnded,
                });
            }
            FrameOutcome::Unexpected(event) => {
                debug!(%event, "unexpected channel event");
                self.emit(SessionEvent::Error(CoreError::UnexpectedEvent {
                    event: event.to_string(),
                }));
            }
        }
        None
    }

    /// Drain the command queue onto the socket.
    async fn deliver(
        &mut self,
        head: RemoteCommand,
        transport: &mut SessionTransport,
    ) -> Option<Exit> {
        let inner = &self.inner;
        let generation = self.generation;
        let drain = self.dispatcher.drain(head, transport, |delivery| match delivery {
            Delivery::Written(command) => {
                inner.emit(generation, SessionEvent::CommandWritten(command));
            }
            Delivery::Rejected { error, .. } => inner.emit(generation, SessionEvent::Error(error)),
        });

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Some(Exit::Cancelled),
            result = drain => match result {
                Ok(_) => None,
                Err(error) => {
                    inner.emit(generation, SessionEvent::Error(error.clone()));
                    Some(Exit::Failed { error, opened: true })
                }
            },
        }
    }

    fn update(&self, f: impl FnOnce(&mut SessionState)) {
        self.inner.update(self.generation, f);
    }

    /// End the session for good. The slot is freed first, so an observer
    /// reacting to any of the final events or the final state can call
    /// connect() straight away. Commands still queued are reported as
    /// dropped, then `events` go out, then the state write.
    fn finish(&mut self, events: Vec<SessionEvent>, f: impl FnOnce(&mut SessionState)) {
        self.inner.release(self.generation);

        for command in self.dispatcher.discard() {
            warn!(command = command.label(), "dropping undelivered command");
            self.emit(SessionEvent::Error(CoreError::CommandDropped {
                command: command.label().to_string(),
            }));
        }
        for event in events {
            self.emit(event);
        }
        self.update(f);
    }

    fn emit(&self, event: SessionEvent) {
        self.inner.emit(self.generation, event);
    }

    fn pairing_timed_out(&self) -> CoreError {
        CoreError::PairingTimedOut {
            timeout_secs: self.inner.config.pairing_timeout.as_secs(),
        }
    }

    /// Name the endpoint (never the token) in connect failures.
    fn connect_error(&self, err: tvremote_api::Error) -> CoreError {
        match CoreError::from(err) {
            CoreError::ConnectionFailed { reason, .. } => {
                let config = &self.inner.config;
                CoreError::ConnectionFailed {
                    url: format!(
                        "{}://{}",
                        config.scheme,
                        std::net::SocketAddr::new(config.host, config.port)
                    ),
                    reason,
                }
            }
            other => other,
        }
    }
}

async fn watchdog(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SessionController {
        SessionController::new(SessionConfig::new("127.0.0.1", "tvremote-test").unwrap())
    }

    #[test]
    fn sends_are_rejected_before_connect() {
        let ctrl = controller();
        assert_eq!(ctrl.send_key(ControlKey::Home), Err(CoreError::NotConnected));
        assert_eq!(ctrl.send_text("hi"), Err(CoreError::NotConnected));
        assert_eq!(ctrl.phase(), SessionPhase::Disconnected);
        assert_eq!(ctrl.auth_status(), AuthStatus::Unauthorized);
    }

    #[test]
    fn connect_outside_runtime_is_an_error() {
        let ctrl = controller();
        assert!(matches!(ctrl.connect(), Err(CoreError::Internal(_))));
        assert!(!ctrl.is_connected());
    }

    #[test]
    fn configured_token_is_initial_token() {
        let config = SessionConfig::new("127.0.0.1", "tvremote-test")
            .unwrap()
            .with_token(Some(SecretString::from("abc".to_string())));
        let ctrl = SessionController::new(config);
        assert_eq!(
            ctrl.token().map(|t| t.expose_secret().to_owned()),
            Some("abc".to_string())
        );
    }

    #[tokio::test]
    async fn wait_before_connect_is_not_connected() {
        let ctrl = controller();
        assert_eq!(
            ctrl.wait_for_authorization(Duration::from_millis(50)).await,
            Err(CoreError::NotConnected)
        );
    }

    #[tokio::test]
    async fn disconnect_without_session_is_quiet() {
        let ctrl = controller();
        let mut events = ctrl.subscribe();
        ctrl.disconnect();
        ctrl.disconnect();
        assert!(events.try_recv().is_err());
        assert_eq!(ctrl.phase(), SessionPhase::Disconnected);
    }
}
