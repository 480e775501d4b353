//! Raw mode control
//!
//! A [`ModeController`] switches the controlling input device into raw mode
//! and back. [`RawModeSession`] is the scoped handle: the saved state is
//! restored exactly once, either through [`RawModeSession::release`] or when
//! the session is dropped (early return, `?`, panic unwinding).

use std::io;

use bitflags::bitflags;
use tracing::{debug, warn};

use crate::error::{PromptError, Result};

bitflags! {
    /// Line discipline features cleared while in raw mode.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Discipline: u8 {
        /// Echo typed characters
        const ECHO         = 0b0001;
        /// Echo newline even when ECHO is off
        const ECHO_NEWLINE = 0b0010;
        /// Line-buffered (canonical) input
        const CANONICAL    = 0b0100;
        /// Ctrl+C / Ctrl+Z generate signals
        const SIGNALS      = 0b1000;
    }
}

impl Default for Discipline {
    fn default() -> Self {
        Discipline::all()
    }
}

/// Opaque snapshot of the line discipline before raw mode was entered.
#[derive(Clone)]
pub struct TermModeState(Saved);

#[derive(Clone)]
enum Saved {
    #[cfg(unix)]
    Termios(libc::termios),
    #[cfg(windows)]
    Console { input: u32, output: Option<u32> },
    Detached,
}

impl std::fmt::Debug for TermModeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.0 {
            #[cfg(unix)]
            Saved::Termios(_) => "termios",
            #[cfg(windows)]
            Saved::Console { .. } => "console",
            Saved::Detached => "detached",
        };
        f.debug_tuple("TermModeState").field(&kind).finish()
    }
}

impl TermModeState {
    /// State for controllers that do not touch a real device.
    pub fn detached() -> Self {
        TermModeState(Saved::Detached)
    }
}

/// Acquires and releases raw input mode on one device.
pub trait ModeController {
    /// Save the current settings and switch to raw mode.
    fn acquire(&mut self) -> io::Result<TermModeState>;

    /// Put back settings previously returned by `acquire`.
    fn restore(&mut self, state: TermModeState) -> io::Result<()>;
}

/// Scoped raw mode acquisition.
pub struct RawModeSession<'a> {
    controller: &'a mut dyn ModeController,
    saved: Option<TermModeState>,
}

impl<'a> RawModeSession<'a> {
    pub fn acquire(controller: &'a mut dyn ModeController) -> Result<Self> {
        let saved = controller
            .acquire()
            .map_err(PromptError::RawModeUnavailable)?;
        debug!("Raw mode acquired ({:?})", saved);
        Ok(Self {
            controller,
            saved: Some(saved),
        })
    }

    /// Restore the saved settings, reporting failure.
    pub fn release(mut self) -> Result<()> {
        self.restore_once()
    }

    fn restore_once(&mut self) -> Result<()> {
        match self.saved.take() {
            Some(state) => {
                self.controller
                    .restore(state)
                    .map_err(PromptError::RawModeUnavailable)?;
                debug!("Raw mode released");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for RawModeSession<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.restore_once() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Controller that changes nothing. For scripted input and pipes.
#[derive(Debug, Default)]
pub struct Detached;

impl ModeController for Detached {
    fn acquire(&mut self) -> io::Result<TermModeState> {
        Ok(TermModeState::detached())
    }

    fn restore(&mut self, _state: TermModeState) -> io::Result<()> {
        Ok(())
    }
}

/// termios based controller for a file descriptor.
#[cfg(unix)]
pub struct PosixController {
    fd: std::os::unix::io::RawFd,
    clear: Discipline,
}

#[cfg(unix)]
impl PosixController {
    pub fn new(fd: std::os::unix::io::RawFd) -> Self {
        Self {
            fd,
            clear: Discipline::default(),
        }
    }

    /// Controller for standard input.
    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }

    pub fn with_disciplines(mut self, clear: Discipline) -> Self {
        self.clear = clear;
        self
    }

    fn lflags(&self) -> libc::tcflag_t {
        let mut flags = 0;
        if self.clear.contains(Discipline::ECHO) {
            flags |= libc::ECHO;
        }
        if self.clear.contains(Discipline::ECHO_NEWLINE) {
            flags |= libc::ECHONL;
        }
        if self.clear.contains(Discipline::CANONICAL) {
            flags |= libc::ICANON;
        }
        if self.clear.contains(Discipline::SIGNALS) {
            flags |= libc::ISIG;
        }
        flags
    }
}

#[cfg(unix)]
impl ModeController for PosixController {
    fn acquire(&mut self) -> io::Result<TermModeState> {
        // SAFETY: termios is plain data; tcgetattr fills it or fails.
        let original = unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(self.fd, &mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            termios
        };

        let mut raw = original;
        raw.c_lflag &= !self.lflags();
        // Block until one byte is available, no inter-byte timer.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        // SAFETY: `raw` is a valid termios derived from the current one.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(TermModeState(Saved::Termios(original)))
    }

    fn restore(&mut self, state: TermModeState) -> io::Result<()> {
        match state.0 {
            Saved::Termios(original) => {
                // SAFETY: `original` came from tcgetattr on the same fd.
                if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &original) } != 0 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            }
            Saved::Detached => Ok(()),
        }
    }
}

/// Console mode controller for the standard input handle.
#[cfg(windows)]
pub struct ConsoleController {
    clear: Discipline,
}

#[cfg(windows)]
impl ConsoleController {
    pub fn stdin() -> Self {
        Self {
            clear: Discipline::default(),
        }
    }

    pub fn with_disciplines(mut self, clear: Discipline) -> Self {
        self.clear = clear;
        self
    }

    fn input_bits(&self) -> u32 {
        use windows::Win32::System::Console::{
            ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT, ENABLE_PROCESSED_INPUT,
        };

        let mut bits = 0;
        if self.clear.contains(Discipline::ECHO) {
            bits |= ENABLE_ECHO_INPUT.0;
        }
        if self.clear.contains(Discipline::CANONICAL) {
            bits |= ENABLE_LINE_INPUT.0;
        }
        if self.clear.contains(Discipline::SIGNALS) {
            bits |= ENABLE_PROCESSED_INPUT.0;
        }
        bits
    }
}

#[cfg(windows)]
fn to_io(e: windows::core::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

#[cfg(windows)]
impl ModeController for ConsoleController {
    fn acquire(&mut self) -> io::Result<TermModeState> {
        use windows::Win32::System::Console::{
            GetConsoleMode, GetStdHandle, SetConsoleMode, CONSOLE_MODE,
            ENABLE_PROCESSED_OUTPUT, ENABLE_VIRTUAL_TERMINAL_INPUT,
            ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
        };

        unsafe {
            let input = GetStdHandle(STD_INPUT_HANDLE).map_err(to_io)?;
            let mut mode = CONSOLE_MODE(0);
            GetConsoleMode(input, &mut mode).map_err(to_io)?;
            let original_input = mode.0;

            // Key presses arrive as VT sequences so the decoder is shared.
            let raw = CONSOLE_MODE(
                (original_input & !self.input_bits()) | ENABLE_VIRTUAL_TERMINAL_INPUT.0,
            );
            SetConsoleMode(input, raw).map_err(to_io)?;

            // Output VT processing is best effort; old consoles lack it.
            let mut original_output = None;
            if let Ok(output) = GetStdHandle(STD_OUTPUT_HANDLE) {
                let mut out_mode = CONSOLE_MODE(0);
                if GetConsoleMode(output, &mut out_mode).is_ok() {
                    let vt = CONSOLE_MODE(
                        out_mode.0
                            | ENABLE_PROCESSED_OUTPUT.0
                            | ENABLE_VIRTUAL_TERMINAL_PROCESSING.0,
                    );
                    if SetConsoleMode(output, vt).is_ok() {
                        original_output = Some(out_mode.0);
                    }
                }
            }

            Ok(TermModeState(Saved::Console {
                input: original_input,
                output: original_output,
            }))
        }
    }

    fn restore(&mut self, state: TermModeState) -> io::Result<()> {
        use windows::Win32::System::Console::{
            GetStdHandle, SetConsoleMode, CONSOLE_MODE, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
        };

        match state.0 {
            Saved::Console { input, output } => unsafe {
                let handle = GetStdHandle(STD_INPUT_HANDLE).map_err(to_io)?;
                SetConsoleMode(handle, CONSOLE_MODE(input)).map_err(to_io)?;
                if let Some(output) = output {
                    let handle = GetStdHandle(STD_OUTPUT_HANDLE).map_err(to_io)?;
                    SetConsoleMode(handle, CONSOLE_MODE(output)).map_err(to_io)?;
                }
                Ok(())
            },
            Saved::Detached => Ok(()),
        }
    }
}

/// The controller for this platform's standard input.
pub fn stdin_controller() -> Box<dyn ModeController> {
    #[cfg(unix)]
    {
        Box::new(PosixController::stdin())
    }
    #[cfg(windows)]
    {
        Box::new(ConsoleController::stdin())
    }
    #[cfg(not(any(unix, windows)))]
    {
        Box::new(Detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts acquire/restore calls.
    struct Counting {
        acquired: Rc<Cell<u32>>,
        restored: Rc<Cell<u32>>,
    }

    impl ModeController for Counting {
        fn acquire(&mut self) -> io::Result<TermModeState> {
            self.acquired.set(self.acquired.get() + 1);
            Ok(TermModeState::detached())
        }

        fn restore(&mut self, _state: TermModeState) -> io::Result<()> {
            self.restored.set(self.restored.get() + 1);
            Ok(())
        }
    }

    fn counting() -> (Counting, Rc<Cell<u32>>, Rc<Cell<u32>>) {
        let acquired = Rc::new(Cell::new(0));
        let restored = Rc::new(Cell::new(0));
        (
            Counting {
                acquired: acquired.clone(),
                restored: restored.clone(),
            },
            acquired,
            restored,
        )
    }

    #[test]
    fn test_release_restores_once() {
        let (mut ctl, acquired, restored) = counting();
        let session = RawModeSession::acquire(&mut ctl).unwrap();
        session.release().unwrap();
        assert_eq!(acquired.get(), 1);
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn test_drop_restores() {
        let (mut ctl, _, restored) = counting();
        {
            let _session = RawModeSession::acquire(&mut ctl).unwrap();
        }
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn test_panic_restores() {
        let (mut ctl, _, restored) = counting();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _session = RawModeSession::acquire(&mut ctl).unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn test_acquire_failure_is_raw_mode_unavailable() {
        struct Broken;
        impl ModeController for Broken {
            fn acquire(&mut self) -> io::Result<TermModeState> {
                Err(io::Error::new(io::ErrorKind::Other, "not a tty"))
            }
            fn restore(&mut self, _state: TermModeState) -> io::Result<()> {
                Ok(())
            }
        }

        match RawModeSession::acquire(&mut Broken) {
            Err(PromptError::RawModeUnavailable(e)) => assert_eq!(e.to_string(), "not a tty"),
            Err(e) => panic!("unexpected {:?}", e),
            Ok(_) => panic!("acquire should fail"),
        }
    }

    #[test]
    fn test_default_clears_everything() {
        assert_eq!(Discipline::default(), Discipline::all());
    }
}
