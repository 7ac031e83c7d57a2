//! Input sources: the terminal event reader, or a scripted queue.
//!
//! The scripted variant drives the same event loop from tests and headless
//! runs. Scripted keys are separated by pause markers so they behave like
//! sequential typing; [`InputSource::push_burst`] omits the markers, making
//! the keys look simultaneously ready, the way a terminal paste does.
//! Exhaustion is reported explicitly so a loop reading past the end of a
//! script fails loudly instead of spinning.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use mle_primitives::{Key, KeyCode};
use termina::EventReader;
use termina::event::{Event, KeyEvent, KeyEventKind, KeyEventState, Modifiers as TmModifiers};

/// Result of polling an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
	/// An event is ready to read.
	Ready,
	/// The wait timed out with nothing available.
	Idle,
	/// A scripted source has no events left.
	Exhausted,
}

pub enum ScriptItem {
	Event(Event),
	/// Boundary between separately-typed keys; a zero-timeout poll does not
	/// see past it.
	Pause,
}

/// Where keystrokes come from.
pub enum InputSource {
	Tty(EventReader),
	Scripted(VecDeque<ScriptItem>),
}

impl InputSource {
	pub fn tty(reader: EventReader) -> Self {
		Self::Tty(reader)
	}

	pub fn scripted<I: IntoIterator<Item = Event>>(events: I) -> Self {
		let mut source = Self::Scripted(VecDeque::new());
		if let Self::Scripted(items) = &mut source {
			for event in events {
				items.push_back(ScriptItem::Pause);
				items.push_back(ScriptItem::Event(event));
			}
		}
		source
	}

	/// Waits up to `timeout` for an event.
	pub fn poll(&mut self, timeout: Duration) -> io::Result<PollOutcome> {
		match self {
			Self::Tty(reader) => {
				let ready = reader.poll(Some(timeout), &mut |_: &Event| true)?;
				Ok(if ready { PollOutcome::Ready } else { PollOutcome::Idle })
			}
			Self::Scripted(items) => {
				if timeout.is_zero() {
					return Ok(match items.front() {
						Some(ScriptItem::Event(_)) => PollOutcome::Ready,
						Some(ScriptItem::Pause) => PollOutcome::Idle,
						None => PollOutcome::Exhausted,
					});
				}
				while matches!(items.front(), Some(ScriptItem::Pause)) {
					items.pop_front();
				}
				if items.is_empty() {
					// Emulate the blocking wait so drain loops over a dry
					// script do not spin.
					std::thread::sleep(timeout.min(Duration::from_millis(10)));
					Ok(PollOutcome::Exhausted)
				} else {
					Ok(PollOutcome::Ready)
				}
			}
		}
	}

	/// Reads the next event. Only call after a `Ready` poll.
	pub fn read(&mut self) -> io::Result<Event> {
		match self {
			Self::Tty(reader) => reader.read(&mut |_: &Event| true),
			Self::Scripted(items) => loop {
				match items.pop_front() {
					Some(ScriptItem::Event(event)) => return Ok(event),
					Some(ScriptItem::Pause) => continue,
					None => {
						return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted"));
					}
				}
			},
		}
	}

	/// Appends a key press to a scripted source, preceded by a pause so it
	/// reads as separately typed. No-op for a real terminal.
	pub fn push_key(&mut self, key: Key) {
		if let Self::Scripted(items) = self {
			items.push_back(ScriptItem::Pause);
			items.push_back(ScriptItem::Event(Event::Key(key_event(key))));
		}
	}

	pub fn push_keys<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
		for key in keys {
			self.push_key(key);
		}
	}

	/// Appends keys with no pauses between them: all become ready at once,
	/// like a paste burst arriving from the terminal.
	pub fn push_burst<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
		if let Self::Scripted(items) = self {
			for key in keys {
				items.push_back(ScriptItem::Event(Event::Key(key_event(key))));
			}
		}
	}
}

/// Builds a termina key-press event for a [`Key`]; used by scripted input.
pub fn key_event(key: Key) -> KeyEvent {
	use termina::event::KeyCode as TmKeyCode;

	let mut modifiers = TmModifiers::empty();
	if key.modifiers.ctrl {
		modifiers |= TmModifiers::CONTROL;
	}
	if key.modifiers.alt {
		modifiers |= TmModifiers::ALT;
	}
	if key.modifiers.shift {
		modifiers |= TmModifiers::SHIFT;
	}

	let code = match key.code {
		KeyCode::Char(c) => TmKeyCode::Char(c),
		KeyCode::Esc => TmKeyCode::Escape,
		KeyCode::Enter => TmKeyCode::Enter,
		KeyCode::BackTab => TmKeyCode::BackTab,
		KeyCode::Tab => TmKeyCode::Tab,
		KeyCode::Space => TmKeyCode::Char(' '),
		KeyCode::Backspace => TmKeyCode::Backspace,
		KeyCode::Delete => TmKeyCode::Delete,
		KeyCode::Insert => TmKeyCode::Insert,
		KeyCode::Home => TmKeyCode::Home,
		KeyCode::End => TmKeyCode::End,
		KeyCode::PageUp => TmKeyCode::PageUp,
		KeyCode::PageDown => TmKeyCode::PageDown,
		KeyCode::Up => TmKeyCode::Up,
		KeyCode::Down => TmKeyCode::Down,
		KeyCode::Left => TmKeyCode::Left,
		KeyCode::Right => TmKeyCode::Right,
		KeyCode::F(n) => TmKeyCode::Function(n),
	};

	KeyEvent {
		code,
		modifiers,
		kind: KeyEventKind::Press,
		state: KeyEventState::NONE,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scripted_reports_exhaustion() {
		let mut source = InputSource::scripted([]);
		assert_eq!(source.poll(Duration::ZERO).unwrap(), PollOutcome::Exhausted);
		assert!(source.read().is_err());
	}

	#[test]
	fn scripted_round_trips_keys() {
		let mut source = InputSource::scripted([]);
		source.push_keys([Key::char('a'), Key::ctrl('x')]);
		assert_eq!(source.poll(Duration::from_millis(1)).unwrap(), PollOutcome::Ready);

		let Event::Key(event) = source.read().unwrap() else {
			panic!("expected key event");
		};
		assert_eq!(Key::try_from(event).unwrap(), Key::char('a'));

		let Event::Key(event) = source.read().unwrap() else {
			panic!("expected key event");
		};
		assert_eq!(Key::try_from(event).unwrap(), Key::ctrl('x'));
	}

	#[test]
	fn pauses_hide_keys_from_zero_timeout_polls() {
		let mut source = InputSource::scripted([]);
		source.push_key(Key::char('a'));
		source.push_key(Key::char('b'));

		// 'a' becomes ready only after a blocking poll.
		assert_eq!(source.poll(Duration::ZERO).unwrap(), PollOutcome::Idle);
		assert_eq!(source.poll(Duration::from_millis(1)).unwrap(), PollOutcome::Ready);
		source.read().unwrap();

		// 'b' sits behind its own pause, invisible to a burst peek.
		assert_eq!(source.poll(Duration::ZERO).unwrap(), PollOutcome::Idle);
	}

	#[test]
	fn bursts_are_immediately_ready() {
		let mut source = InputSource::scripted([]);
		source.push_burst([Key::char('a'), Key::char('b')]);
		assert_eq!(source.poll(Duration::ZERO).unwrap(), PollOutcome::Ready);
		source.read().unwrap();
		assert_eq!(source.poll(Duration::ZERO).unwrap(), PollOutcome::Ready);
	}
}
