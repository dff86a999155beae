//! Supervisor reload handle.
//!
//! The supervisor runs as the container's init process and re-reads its
//! config on `SIGHUP`. Callers hold a [`Supervisor`] so tests can count
//! reloads instead of signalling a real process.

use crate::error::ReloadError;

/// Pid of the container init process.
pub const INIT_PID: i32 = 1;

/// Something that can be told to reload its configuration.
pub trait Supervisor {
    fn reload(&self) -> Result<(), ReloadError>;
}

/// Reloads a supervisor by sending it `SIGHUP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSupervisor {
    pub pid: i32,
}

impl SignalSupervisor {
    pub fn new(pid: i32) -> Self {
        Self { pid }
    }

    /// Handle for the init process.
    pub fn init() -> Self {
        Self::new(INIT_PID)
    }
}

impl Default for SignalSupervisor {
    fn default() -> Self {
        Self::init()
    }
}

impl Supervisor for SignalSupervisor {
    fn reload(&self) -> Result<(), ReloadError> {
        tracing::info!("reloading supervisor configuration (pid {})", self.pid);
        send_hangup(self.pid).map_err(|source| ReloadError {
            pid: self.pid,
            source,
        })
    }
}

impl<S: Supervisor + ?Sized> Supervisor for &S {
    fn reload(&self) -> Result<(), ReloadError> {
        (**self).reload()
    }
}

#[cfg(unix)]
fn send_hangup(pid: i32) -> std::io::Result<()> {
    if pid <= 0 {
        // kill(2) treats these as process groups.
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "supervisor pid must be positive",
        ));
    }
    let res = unsafe { libc::kill(pid as libc::pid_t, libc::SIGHUP) };
    if res != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn send_hangup(_pid: i32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "SIGHUP delivery requires a unix host",
    ))
}
