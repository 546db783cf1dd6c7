use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::Id as TaskId;
use tokio::task::JoinError;
use tokio::task::JoinHandle;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::Instrument;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::PreviewBackend;
use crate::PreviewRequest;
use crate::PreviewResponse;
use crate::ProomptError;
use crate::ProomptResult;
use crate::ResolutionResult;
use crate::ValueMap;

/// Default quiet window before a submitted template is resolved.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
	/// Only the last submission within this window is resolved.
	pub debounce: Duration,
}

impl Default for SessionOptions {
	fn default() -> Self {
		Self {
			debounce: DEFAULT_DEBOUNCE,
		}
	}
}

/// Where the most recent submission is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
	/// Nothing submitted yet, or the session was cancelled.
	#[default]
	Idle,
	/// Waiting for the debounce window to pass.
	Scheduled,
	/// A backend request is in flight.
	Resolving,
	/// The latest request finished, successfully or not.
	Settled,
}

/// Observable state of a preview session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
	pub phase: SessionPhase,
	/// Id of the newest request. Responses tagged with any other id are stale.
	pub latest_request_id: u64,
	/// Result of the last settled request. A failed request stores an empty
	/// result here.
	pub last_result: Option<ResolutionResult>,
}

/// Notifications delivered to the session's consumer. Stale responses never
/// produce an event.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum PreviewEvent {
	/// The debounce window passed and a backend request was started.
	Resolving { request_id: u64 },
	/// The latest request completed.
	Settled {
		request_id: u64,
		result: ResolutionResult,
	},
	/// The latest request failed. The session stays usable.
	Failed {
		request_id: u64,
		error: Arc<ProomptError>,
	},
}

enum SessionCommand {
	Submit(PreviewRequest),
	Cancel,
}

/// Handle to a debounced preview session.
///
/// The session runs as a single tokio task that owns all of its state.
/// Submissions are debounced, every fired request gets a fresh id and only the
/// response carrying the latest id is emitted, so the last submit wins even
/// when responses arrive out of order. Dropping the handle tears the session
/// down.
#[derive(Debug)]
pub struct PreviewSession {
	commands: mpsc::UnboundedSender<SessionCommand>,
	snapshot: watch::Receiver<SessionSnapshot>,
	task: JoinHandle<()>,
}

impl PreviewSession {
	/// Start a session on the current tokio runtime. Returns the handle and
	/// the receiving end of its event stream.
	pub fn spawn<B: PreviewBackend>(
		backend: B,
		options: SessionOptions,
	) -> (Self, mpsc::UnboundedReceiver<PreviewEvent>) {
		let (command_tx, command_rx) = mpsc::unbounded_channel();
		let (event_tx, event_rx) = mpsc::unbounded_channel();
		let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());

		let actor = SessionActor {
			backend: Arc::new(backend),
			debounce: options.debounce,
			pending: None,
			deadline: None,
			latest_request_id: 0,
			in_flight: JoinSet::new(),
			requests: HashMap::new(),
			events: event_tx,
			snapshot: snapshot_tx,
		};
		let task = tokio::spawn(actor.run(command_rx).in_current_span());

		let session = Self {
			commands: command_tx,
			snapshot: snapshot_rx,
			task,
		};

		(session, event_rx)
	}

	/// Schedule a preview of `content`, replacing any submission still
	/// waiting for its debounce window.
	pub fn submit(&self, content: impl Into<String>, variables: ValueMap) -> ProomptResult<()> {
		let request = PreviewRequest {
			content: content.into(),
			variables,
		};

		self.commands
			.send(SessionCommand::Submit(request))
			.map_err(|_| ProomptError::SessionClosed)
	}

	/// Drop any scheduled submission and mark every in-flight request stale.
	pub fn cancel(&self) -> ProomptResult<()> {
		self.commands
			.send(SessionCommand::Cancel)
			.map_err(|_| ProomptError::SessionClosed)
	}

	pub fn snapshot(&self) -> SessionSnapshot {
		self.snapshot.borrow().clone()
	}

	/// Cancel outstanding work and wait for the session task to finish.
	pub async fn shutdown(self) {
		let Self { commands, task, .. } = self;
		drop(commands);
		let _ = task.await;
	}
}

struct SessionActor<B> {
	backend: Arc<B>,
	debounce: Duration,
	/// The submission waiting for the debounce deadline.
	pending: Option<PreviewRequest>,
	deadline: Option<Instant>,
	latest_request_id: u64,
	in_flight: JoinSet<ProomptResult<PreviewResponse>>,
	/// Request id of every task in `in_flight`.
	requests: HashMap<TaskId, u64>,
	events: mpsc::UnboundedSender<PreviewEvent>,
	snapshot: watch::Sender<SessionSnapshot>,
}

impl<B: PreviewBackend> SessionActor<B> {
	async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) {
		loop {
			let deadline = self.deadline;

			tokio::select! {
				command = commands.recv() => {
					match command {
						Some(SessionCommand::Submit(request)) => self.schedule(request),
						Some(SessionCommand::Cancel) => self.cancel(),
						None => {
							self.cancel();
							break;
						}
					}
				}
				() = wait_until(deadline), if deadline.is_some() => self.fire(),
				Some(joined) = self.in_flight.join_next_with_id(), if !self.in_flight.is_empty() => {
					self.settle(joined);
				}
				() = self.events.closed() => {
					debug!("preview events receiver dropped");
					self.cancel();
					break;
				}
			}
		}

		debug!("preview session closed");
	}

	fn schedule(&mut self, request: PreviewRequest) {
		if self.pending.is_some() {
			trace!("replacing scheduled preview");
		}

		self.pending = Some(request);
		self.deadline = Some(Instant::now() + self.debounce);
		self.snapshot
			.send_modify(|snapshot| snapshot.phase = SessionPhase::Scheduled);
	}

	fn fire(&mut self) {
		self.deadline = None;
		let Some(request) = self.pending.take() else {
			return;
		};

		self.latest_request_id += 1;
		let request_id = self.latest_request_id;
		let backend = Arc::clone(&self.backend);
		let handle = self
			.in_flight
			.spawn(async move { backend.preview(request).await });
		self.requests.insert(handle.id(), request_id);

		debug!(request_id, "resolving preview");
		self.snapshot.send_modify(|snapshot| {
			snapshot.phase = SessionPhase::Resolving;
			snapshot.latest_request_id = request_id;
		});
		let _ = self.events.send(PreviewEvent::Resolving { request_id });
	}

	fn settle(&mut self, joined: Result<(TaskId, ProomptResult<PreviewResponse>), JoinError>) {
		let (task_id, outcome) = match joined {
			Ok(done) => done,
			Err(error) if error.is_cancelled() => {
				self.requests.remove(&error.id());
				return;
			}
			Err(error) => {
				let reason = format!("preview task panicked: {error}");
				(error.id(), Err(ProomptError::Backend(reason)))
			}
		};

		let Some(request_id) = self.requests.remove(&task_id) else {
			return;
		};

		if request_id != self.latest_request_id {
			trace!(
				request_id,
				latest_request_id = self.latest_request_id,
				"discarding stale preview response"
			);
			return;
		}

		// A newer submission may already be waiting for its debounce window.
		let phase = if self.deadline.is_some() {
			SessionPhase::Scheduled
		} else {
			SessionPhase::Settled
		};

		match outcome {
			Ok(response) => {
				let result = ResolutionResult::from(response);
				debug!(request_id, warnings = result.warnings.len(), "preview settled");
				self.snapshot.send_modify(|snapshot| {
					snapshot.phase = phase;
					snapshot.last_result = Some(result.clone());
				});
				let _ = self.events.send(PreviewEvent::Settled { request_id, result });
			}
			Err(error) => {
				warn!(request_id, %error, "preview request failed");
				self.snapshot.send_modify(|snapshot| {
					snapshot.phase = phase;
					snapshot.last_result = Some(ResolutionResult::default());
				});
				let _ = self.events.send(PreviewEvent::Failed {
					request_id,
					error: Arc::new(error),
				});
			}
		}
	}

	fn cancel(&mut self) {
		self.pending = None;
		self.deadline = None;
		// Anything still in flight now carries an older id than the latest.
		self.latest_request_id += 1;
		self.in_flight.abort_all();

		let latest_request_id = self.latest_request_id;
		debug!(latest_request_id, "preview session cancelled");
		self.snapshot.send_modify(|snapshot| {
			snapshot.phase = SessionPhase::Idle;
			snapshot.latest_request_id = latest_request_id;
		});
	}
}

async fn wait_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => tokio::time::sleep_until(deadline).await,
		None => std::future::pending().await,
	}
}
