//! Asynchronous shell processes and the per-turn drain.
//!
//! Each async proc is a child of the configured shell with its stdout piped
//! through a reader task into a channel; the event loop drains at most one
//! chunk per proc per turn, with TTY input taking priority over proc output.

use std::process::Stdio;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tracing::{debug, warn};

use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::input::PollOutcome;
use crate::view::ViewId;

/// Bytes read from a proc pipe per chunk.
const PROC_CHUNK: usize = 1024;
/// Bounded wait on the TTY when no proc data is pending.
const ASYNC_WAIT: Duration = Duration::from_secs(1);

/// Stable handle to an async proc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcId(pub(crate) u32);

/// One message from a proc's reader task.
pub(crate) enum ProcChunk {
	Data(Vec<u8>),
	Err(String),
	Eof,
}

/// Callback invoked with proc output; called once more with `is_done` when
/// the proc is torn down.
pub type AsyncCallback = fn(&mut Editor, &ProcEvent);

/// One delivery to an async-proc callback.
#[derive(Debug)]
pub struct ProcEvent {
	pub proc: ProcId,
	pub invoker: ViewId,
	pub bytes: Vec<u8>,
	pub is_error: bool,
	pub is_eof: bool,
	pub is_done: bool,
}

/// A running asynchronous shell command bound to a view.
pub struct AsyncProc {
	pub id: ProcId,
	pub invoker: ViewId,
	pub deadline: Instant,
	/// Set by user cancellation; the next drain turn tears the proc down.
	pub is_done: bool,
	callback: AsyncCallback,
	rx: Receiver<ProcChunk>,
	saw_eof: bool,
	// Held so kill_on_drop terminates the child when the proc is destroyed.
	_child: Child,
}

/// What the multiplexer found this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
	/// The TTY is ready; service user input before any proc output.
	InputReady,
	/// Work may remain; run the drain again before reading input.
	CallAgain,
	/// Input polling failed; stop draining this turn.
	Stop,
}

impl Editor {
	/// Spawns `cmd` through the configured shell as an async proc bound to
	/// `invoker`. Output is delivered to `callback` during event-loop turns.
	pub fn spawn_async_proc(
		&mut self,
		cmd: &str,
		invoker: ViewId,
		timeout: Duration,
		callback: AsyncCallback,
	) -> Result<ProcId> {
		let mut child = {
			// Spawning needs an active runtime context; the guard must not
			// outlive this block, which mutates the editor below.
			let _guard = self.runtime().enter();
			tokio::process::Command::new(self.options.shell.clone())
				.arg("-c")
				.arg(cmd)
				.stdin(Stdio::null())
				.stdout(Stdio::piped())
				.stderr(Stdio::null())
				.kill_on_drop(true)
				.spawn()
				.map_err(|error| Error::Spawn {
					cmd: cmd.to_string(),
					error,
				})?
		};
		let stdout = child.stdout.take().ok_or_else(|| Error::Spawn {
			cmd: cmd.to_string(),
			error: std::io::Error::other("failed to capture stdout"),
		})?;

		let (tx, rx) = std::sync::mpsc::channel();
		self.runtime().spawn(read_pipe(stdout, tx));

		let id = self.next_proc_id();
		debug!(proc = id.0, cmd, "spawned async proc");
		self.async_procs.push(AsyncProc {
			id,
			invoker,
			deadline: Instant::now() + timeout,
			is_done: false,
			callback,
			rx,
			saw_eof: false,
			_child: child,
		});
		if let Some(view) = self.views.get_mut(&invoker) {
			view.async_proc = Some(id);
		}
		Ok(id)
	}

	/// Number of live async procs.
	pub fn async_proc_count(&self) -> usize {
		self.async_procs.len()
	}

	/// Marks a proc for teardown; the next drain delivers its final event.
	pub fn cancel_async_proc(&mut self, id: ProcId) {
		if let Some(proc) = self.async_procs.iter_mut().find(|p| p.id == id) {
			proc.is_done = true;
		}
	}

	/// One multiplexer turn over the TTY and every proc pipe.
	///
	/// TTY readiness wins immediately; otherwise each proc gets at most one
	/// buffered chunk, and procs that hit EOF, error, cancellation, or their
	/// deadline get a final `is_done` delivery and are destroyed. Deliveries
	/// whose invoker view has been closed are dropped silently.
	pub fn drain_async_procs(&mut self) -> DrainOutcome {
		match self.input.poll(Duration::ZERO) {
			Ok(PollOutcome::Ready) => return DrainOutcome::InputReady,
			Ok(_) => {}
			Err(err) => {
				warn!(%err, "input poll failed during async drain");
				return DrainOutcome::Stop;
			}
		}

		let now = Instant::now();
		let mut procs = std::mem::take(&mut self.async_procs);
		let mut kept = Vec::with_capacity(procs.len());
		let mut activity = false;

		for mut proc in procs.drain(..) {
			let mut is_error = false;
			match proc.rx.try_recv() {
				Ok(ProcChunk::Data(bytes)) => {
					activity = true;
					self.deliver(&proc, bytes, false, false, false);
				}
				Ok(ProcChunk::Eof) => {
					activity = true;
					proc.saw_eof = true;
				}
				Ok(ProcChunk::Err(err)) => {
					activity = true;
					is_error = true;
					warn!(proc = proc.id.0, %err, "async proc read error");
				}
				Err(TryRecvError::Empty) => {}
				Err(TryRecvError::Disconnected) => proc.saw_eof = true,
			}

			if is_error || proc.saw_eof || proc.is_done || now >= proc.deadline {
				activity = true;
				if now >= proc.deadline && !proc.saw_eof && !proc.is_done {
					debug!(proc = proc.id.0, "async proc hit deadline");
				}
				self.deliver(&proc, Vec::new(), is_error, proc.saw_eof, true);
				if let Some(view) = self.views.get_mut(&proc.invoker) {
					view.async_proc = None;
				}
				// Dropping the proc kills the child if still running.
			} else {
				kept.push(proc);
			}
		}

		// Callbacks may have spawned new procs.
		kept.append(&mut self.async_procs);
		self.async_procs = kept;

		if activity {
			return DrainOutcome::CallAgain;
		}

		match self.input.poll(ASYNC_WAIT) {
			Ok(PollOutcome::Ready) => DrainOutcome::InputReady,
			Ok(_) => DrainOutcome::CallAgain,
			Err(err) => {
				warn!(%err, "input poll failed during async drain");
				DrainOutcome::Stop
			}
		}
	}

	fn deliver(&mut self, proc: &AsyncProc, bytes: Vec<u8>, is_error: bool, is_eof: bool, is_done: bool) {
		if !self.views.contains_key(&proc.invoker) {
			return;
		}
		(proc.callback)(
			self,
			&ProcEvent {
				proc: proc.id,
				invoker: proc.invoker,
				bytes,
				is_error,
				is_eof,
				is_done,
			},
		);
	}
}

/// Reader task: forwards up-to-1-KiB chunks from a proc pipe.
async fn read_pipe(mut stdout: tokio::process::ChildStdout, tx: std::sync::mpsc::Sender<ProcChunk>) {
	let mut buf = [0u8; PROC_CHUNK];
	loop {
		match stdout.read(&mut buf).await {
			Ok(0) => {
				let _ = tx.send(ProcChunk::Eof);
				return;
			}
			Ok(n) => {
				if tx.send(ProcChunk::Data(buf[..n].to_vec())).is_err() {
					return;
				}
			}
			Err(err) => {
				let _ = tx.send(ProcChunk::Err(err.to_string()));
				return;
			}
		}
	}
}

impl Editor {
	/// Runs a shell command to completion, feeding optional stdin and
	/// collecting stdout, bounded by `timeout`.
	pub fn shell_exec(
		&mut self,
		cmd: &str,
		shell: &str,
		timeout: Duration,
		input: Option<&[u8]>,
	) -> Result<Vec<u8>> {
		let _guard = self.runtime().enter();
		let mut child = tokio::process::Command::new(shell)
			.arg("-c")
			.arg(cmd)
			.stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
			.stdout(Stdio::piped())
			.stderr(Stdio::null())
			.kill_on_drop(true)
			.spawn()
			.map_err(|error| Error::Spawn {
				cmd: cmd.to_string(),
				error,
			})?;

		if let Some(input) = input
			&& let Some(mut stdin) = child.stdin.take()
		{
			let data = input.to_vec();
			self.runtime().spawn(async move {
				use tokio::io::AsyncWriteExt;
				let _ = stdin.write_all(&data).await;
			});
		}

		let stdout = child.stdout.take().ok_or_else(|| Error::Spawn {
			cmd: cmd.to_string(),
			error: std::io::Error::other("failed to capture stdout"),
		})?;
		let (tx, rx) = std::sync::mpsc::channel();
		self.runtime().spawn(read_pipe(stdout, tx));

		let deadline = Instant::now() + timeout;
		let mut output = Vec::new();
		loop {
			let now = Instant::now();
			if now >= deadline {
				return Err(Error::ShellTimeout(cmd.to_string()));
			}
			match rx.recv_timeout(deadline - now) {
				Ok(ProcChunk::Data(bytes)) => output.extend_from_slice(&bytes),
				Ok(ProcChunk::Eof) => return Ok(output),
				Ok(ProcChunk::Err(err)) => {
					return Err(Error::Io(std::io::Error::other(err)));
				}
				Err(_) => return Err(Error::ShellTimeout(cmd.to_string())),
			}
		}
	}
}

/// Quotes a string for safe interpolation into a shell command line.
pub fn shell_escape(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('\'');
	for c in s.chars() {
		if c == '\'' {
			out.push_str("'\\''");
		} else {
			out.push(c);
		}
	}
	out.push('\'');
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shell_escape_quotes_single_quotes() {
		assert_eq!(shell_escape("plain"), "'plain'");
		assert_eq!(shell_escape("it's"), "'it'\\''s'");
		assert_eq!(shell_escape("a b;c"), "'a b;c'");
	}
}
