/// Modifier keys active for a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
	pub ctrl: bool,
	pub alt: bool,
	pub shift: bool,
}

impl Modifiers {
	pub const NONE: Self = Self {
		ctrl: false,
		alt: false,
		shift: false,
	};
	pub const CTRL: Self = Self { ctrl: true, ..Self::NONE };
	pub const ALT: Self = Self { alt: true, ..Self::NONE };
	pub const SHIFT: Self = Self { shift: true, ..Self::NONE };

	/// Returns true when no modifier is active.
	pub const fn is_empty(&self) -> bool {
		!self.ctrl && !self.alt && !self.shift
	}
}
