//! Backend errors and the X protocol error log.

use std::fs::OpenOptions;
use std::io::Write;

use tracing::{error, warn};
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::x11_utils::X11Error;

/// File X protocol errors are appended to, in the working directory.
pub const ERROR_LOG: &str = "fawm-error.log";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Cannot open display: {0}")]
    Connect(#[from] ConnectError),

    #[error("X connection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("X request failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("Cannot allocate an X resource: {0}")]
    ResourceId(#[from] ReplyOrIdError),

    #[error("Another window manager is already running")]
    AnotherWindowManager,

    #[error("Cannot find font (tried {0:?} and \"fixed\")")]
    Font(String),

    #[error("X protocol error {:?} on request {}", .0.error_kind, .0.major_opcode)]
    Protocol(X11Error),

    #[error("Cannot poll the X connection: {0}")]
    Poll(#[from] std::io::Error),
}

/// Describe a protocol error the way it is written to [`ERROR_LOG`].
pub fn describe_x_error(e: &X11Error) -> Vec<String> {
    vec![
        "**********".to_string(),
        format!("X Error at pid {}", std::process::id()),
        format!("Serial Number of Request Code: {}", e.sequence),
        format!("Error Code: {} ({:?})", e.error_code, e.error_kind),
        format!("Major Opcode: {}", e.major_opcode),
        format!("Minor Opcode: {}", e.minor_opcode),
        format!("Resource ID: 0x{:08x}", e.bad_value),
        format!("XRequest: {}", e.request_name.unwrap_or("?")),
    ]
}

/// Append a protocol error to [`ERROR_LOG`] and standard error.
pub fn report_x_error(e: &X11Error) {
    error!("X protocol error: {:?}", e);
    let lines = describe_x_error(e);
    for line in &lines {
        eprintln!("fawm: {line}");
    }
    let file = OpenOptions::new().create(true).append(true).open(ERROR_LOG);
    match file {
        Ok(mut file) => {
            for line in &lines {
                if let Err(err) = writeln!(file, "{line}") {
                    warn!("Cannot write {}: {}", ERROR_LOG, err);
                    break;
                }
            }
        }
        Err(err) => warn!("Cannot open {}: {}", ERROR_LOG, err),
    }
}
