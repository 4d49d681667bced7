//! Terminal ownership for foreground jobs.
//!
//! Every job leads its own process group, and only the terminal's
//! foreground group may read from it. An interactive shell therefore hands
//! the terminal to a job before waiting on it and takes it back once the
//! wait ends; otherwise the first read gets SIGTTIN and stops the job.
//!
//! The shell ignores SIGTTOU so it may call `tcsetpgrp` while a job owns
//! the terminal. Children get the default disposition back before exec.

use std::io::{self, IsTerminal};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::os::unix::process::CommandExt;

use nix::sys::signal::{SigHandler, Signal, signal};
use nix::unistd::{Pid, getpgrp, tcgetpgrp, tcsetpgrp};

/// The controlling terminal, held by a shell that does job control.
#[derive(Debug)]
pub struct TerminalState {
    tty: OwnedFd,
    shell_pgid: Pid,
}

impl TerminalState {
    /// Take charge of the terminal on stdin.
    ///
    /// `None` unless stdin is a terminal whose foreground group is the
    /// shell's own. A shell started in the background, or with stdin
    /// redirected, leaves the terminal alone.
    pub fn acquire() -> Option<Self> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return None;
        }

        let shell_pgid = getpgrp();
        match tcgetpgrp(stdin.as_fd()) {
            Ok(owner) if owner == shell_pgid => {}
            Ok(owner) => {
                tracing::debug!(owner = owner.as_raw(), shell = shell_pgid.as_raw(), "terminal belongs to another group");
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "cannot read terminal foreground group");
                return None;
            }
        }

        let tty = match stdin.as_fd().try_clone_to_owned() {
            Ok(fd) => fd,
            Err(e) => {
                tracing::warn!(error = %e, "failed to duplicate terminal descriptor");
                return None;
            }
        };

        // SAFETY: SIG_IGN installs no handler code.
        if let Err(e) = unsafe { signal(Signal::SIGTTOU, SigHandler::SigIgn) } {
            tracing::warn!(error = %e, "failed to ignore SIGTTOU, jobs will not get the terminal");
            return None;
        }

        tracing::debug!(pgid = shell_pgid.as_raw(), "job control enabled");
        Some(Self { tty, shell_pgid })
    }

    /// Make `pgid` the terminal's foreground group.
    pub fn give_to(&self, pgid: Pid) -> nix::Result<()> {
        tcsetpgrp(self.tty.as_fd(), pgid)
    }

    /// Give the terminal back to the shell's own group.
    pub fn reclaim(&self) -> nix::Result<()> {
        tcsetpgrp(self.tty.as_fd(), self.shell_pgid)
    }

    /// Prepare a child for a shell that ignores SIGTTOU.
    ///
    /// The child restores the default SIGTTOU disposition and, for a
    /// foreground job, takes the terminal for its own group before exec so
    /// that an immediate read cannot beat the shell's hand-off.
    pub fn prepare_child(&self, cmd: &mut std::process::Command, foreground: bool) {
        let tty = self.tty.as_raw_fd();
        // SAFETY: the hook runs between fork and exec and only makes
        // async-signal-safe calls (getpgrp, the TIOCSPGRP ioctl, sigaction).
        // std sets the process group before running pre_exec hooks, and the
        // descriptor stays open until exec since it is owned by the shell.
        unsafe {
            cmd.pre_exec(move || {
                if foreground {
                    let tty = BorrowedFd::borrow_raw(tty);
                    // No logging here; the shell repeats the hand-off after the spawn
                    let _ = tcsetpgrp(tty, getpgrp());
                }
                signal(Signal::SIGTTOU, SigHandler::SigDfl)?;
                Ok(())
            });
        }
    }
}
