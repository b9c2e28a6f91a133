//! SSH remote command client.
//!
//! Executes one of two fixed Windows shutdown commands on a remote
//! host, or just verifies that credentials work. Every call is fully
//! blocking and owns its resources for exactly that call: a TCP
//! socket, a libssh2 session, and (for execution) one channel, all
//! released on every exit path.
//!
//! Authentication walks a fixed fallback chain, stopping at the first
//! method the server accepts:
//!
//! 1. password: the supplied password, or empty when none was given
//! 2. password: a second empty-password attempt (only when none was
//!    supplied; some servers treat blank and absent differently)
//! 3. keyboard-interactive: with empty responses to every prompt
//! 4. public key: default local discovery via the SSH agent
//!
//! Cheap methods come first because target hosts vary in what they
//! have enabled and the operator rarely knows which applies.

use std::io::Read;
use std::net::TcpStream;

use ssh2::{DisconnectCode, KeyboardInteractivePrompt, Prompt, Session};
use thiserror::Error;
use tracing::{debug, info};

/// Remote SSH port.
pub const SSH_PORT: u16 = 22;

/// Windows shutdown command executed by [`shutdown_pc`].
pub const SHUTDOWN_COMMAND: &str = "shutdown /s /t 0";

/// Windows restart command executed by [`restart_pc`].
pub const RESTART_COMMAND: &str = "shutdown /r /t 0";

/// Errors from one client call, by the stage that failed.
#[derive(Debug, Error)]
pub enum SshError {
    #[error("TCP connect failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("session init failed: {0}")]
    SessionInit(#[source] ssh2::Error),
    #[error("SSH handshake failed: {0}")]
    Handshake(#[source] ssh2::Error),
    #[error("authentication failed (all methods exhausted)")]
    AuthFailed,
    #[error("command execution failed: {0}")]
    Exec(#[source] ssh2::Error),
    #[error("reading command output failed: {0}")]
    Read(#[source] std::io::Error),
}

/// Result of a completed remote execution.
///
/// The exit status is collected from the channel but callers treat any
/// completed execution as success.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_status: i32,
    pub output: String,
}

/// The authentication operations the fallback chain drives, as a seam
/// so the chain's ordering is testable without a live server.
trait AuthMethods {
    fn try_password(&mut self, username: &str, password: &str) -> bool;
    fn try_keyboard_interactive(&mut self, username: &str) -> bool;
    fn try_pubkey_default(&mut self, username: &str) -> bool;
}

/// Walk the fallback chain; true once any method succeeds.
fn authenticate<A: AuthMethods>(auth: &mut A, username: &str, password: &str) -> bool {
    // First attempt always carries the supplied password, or empty
    // when none was given.
    if auth.try_password(username, password) {
        debug!("authenticated with password");
        return true;
    }
    // Second empty-password attempt only when none was supplied.
    if password.is_empty() && auth.try_password(username, "") {
        debug!("authenticated with empty password");
        return true;
    }
    if auth.try_keyboard_interactive(username) {
        debug!("authenticated with keyboard-interactive");
        return true;
    }
    if auth.try_pubkey_default(username) {
        debug!("authenticated with public key");
        return true;
    }
    false
}

/// Responds to keyboard-interactive challenges with empty answers.
struct NoResponses;

impl KeyboardInteractivePrompt for NoResponses {
    fn prompt(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[Prompt<'_>],
    ) -> Vec<String> {
        prompts.iter().map(|_| String::new()).collect()
    }
}

struct SessionAuth<'a> {
    session: &'a Session,
}

impl AuthMethods for SessionAuth<'_> {
    fn try_password(&mut self, username: &str, password: &str) -> bool {
        self.session.userauth_password(username, password).is_ok()
    }

    fn try_keyboard_interactive(&mut self, username: &str) -> bool {
        self.session
            .userauth_keyboard_interactive(username, &mut NoResponses)
            .is_ok()
    }

    fn try_pubkey_default(&mut self, username: &str) -> bool {
        self.session.userauth_agent(username).is_ok()
    }
}

/// Connect, handshake, authenticate, run `f`, then tear the session
/// down. The teardown runs once on every path past session init:
/// any channel is released inside `f`, the session is disconnected
/// here, and dropping it closes the socket.
fn with_session<T>(
    host: &str,
    username: &str,
    password: &str,
    f: impl FnOnce(&Session) -> Result<T, SshError>,
) -> Result<T, SshError> {
    debug!("connecting to {host}:{SSH_PORT}");
    let tcp = TcpStream::connect((host, SSH_PORT)).map_err(SshError::Connect)?;
    let mut session = Session::new().map_err(SshError::SessionInit)?;
    session.set_tcp_stream(tcp);
    session.set_blocking(true);

    let result = (|| {
        session.handshake().map_err(SshError::Handshake)?;
        if !authenticate(&mut SessionAuth { session: &session }, username, password) {
            return Err(SshError::AuthFailed);
        }
        f(&session)
    })();

    let _ = session.disconnect(Some(DisconnectCode::ByApplication), "Normal shutdown", None);
    result
}

/// Execute one command on the remote host, draining its output and
/// collecting the exit status.
pub fn execute_command(
    host: &str,
    username: &str,
    password: &str,
    command: &str,
) -> Result<ExecOutput, SshError> {
    with_session(host, username, password, |session| {
        let mut channel = session.channel_session().map_err(SshError::Exec)?;
        channel.exec(command).map_err(SshError::Exec)?;

        let mut raw = Vec::new();
        channel.read_to_end(&mut raw).map_err(SshError::Read)?;
        let output = String::from_utf8_lossy(&raw).into_owned();

        let _ = channel.close();
        let _ = channel.wait_close();
        let exit_status = channel.exit_status().map_err(SshError::Exec)?;

        info!("executed {command:?} on {host} (exit {exit_status})");
        Ok(ExecOutput {
            exit_status,
            output,
        })
    })
}

/// Verify that the host is reachable and the credentials authenticate,
/// without executing anything.
pub fn test_connection(host: &str, username: &str, password: &str) -> Result<(), SshError> {
    with_session(host, username, password, |_| {
        info!("connection test to {host} succeeded");
        Ok(())
    })
}

/// Shut the remote host down.
pub fn shutdown_pc(host: &str, username: &str, password: &str) -> Result<ExecOutput, SshError> {
    execute_command(host, username, password, SHUTDOWN_COMMAND)
}

/// Restart the remote host.
pub fn restart_pc(host: &str, username: &str, password: &str) -> Result<ExecOutput, SshError> {
    execute_command(host, username, password, RESTART_COMMAND)
}
