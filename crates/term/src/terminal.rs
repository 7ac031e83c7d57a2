//! Terminal setup and restoration.

use std::io::{self, Write};

use termina::escape::csi::{Csi, DecPrivateMode, DecPrivateModeCode, Mode};
use termina::{PlatformTerminal, Terminal as _};

fn alternate_screen(enable: bool) -> Csi {
	let code = DecPrivateMode::Code(DecPrivateModeCode::ClearAndEnableAlternateScreen);
	if enable {
		Csi::Mode(Mode::SetDecPrivateMode(code))
	} else {
		Csi::Mode(Mode::ResetDecPrivateMode(code))
	}
}

/// Enters raw mode on the alternate screen.
pub fn enable_terminal_features(terminal: &mut PlatformTerminal) -> io::Result<()> {
	terminal.enter_raw_mode()?;
	write!(terminal, "{}", alternate_screen(true))?;
	terminal.flush()
}

/// Installs a panic hook that restores the terminal before the panic
/// message prints.
pub fn install_panic_hook(terminal: &mut PlatformTerminal) {
	terminal.set_panic_hook(move |handle| {
		let _ = write!(handle, "{}", alternate_screen(false));
		let _ = handle.flush();
	});
}
