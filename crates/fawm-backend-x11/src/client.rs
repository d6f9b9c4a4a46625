//! Reading what the core needs to know about a client window.
//!
//! Every query here tolerates the window disappearing underneath it: a
//! failed reply means "skip", never an error.

use fawm_core::{ClientInfo, Geometry};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, MapState, Window};

use crate::error::BackendError;

x11rb::atom_manager! {
    /// Atoms interned once at startup.
    pub Atoms: AtomsCookie {
        WM_PROTOCOLS,
        WM_DELETE_WINDOW,
        UTF8_STRING,
        COMPOUND_TEXT,
    }
}

/// `PResizeInc` bit of `WM_NORMAL_HINTS.flags`.
const P_RESIZE_INC: u32 = 1 << 6;
/// Length of `WM_NORMAL_HINTS` in 32-bit words.
const SIZE_HINTS_LEN: u32 = 18;
const WIDTH_INC: usize = 9;
const HEIGHT_INC: usize = 10;

/// Whether a window found at startup should be framed: it is mapped and
/// not override-redirect. A vanished window is not.
pub fn is_manageable<C: Connection>(conn: &C, window: Window) -> Result<bool, BackendError> {
    Ok(conn
        .get_window_attributes(window)?
        .reply()
        .is_ok_and(|attrs| attrs.map_state != MapState::UNMAPPED && !attrs.override_redirect))
}

/// Query geometry, title, resize increments and `WM_DELETE_WINDOW` support.
///
/// Returns `None` when the window is already gone.
pub fn query_client<C: Connection>(
    conn: &C,
    atoms: &Atoms,
    window: Window,
) -> Result<Option<ClientInfo>, BackendError> {
    let Ok(geometry) = conn.get_geometry(window)?.reply() else {
        debug!("get_geometry failed for 0x{:08x}", window);
        return Ok(None);
    };
    Ok(Some(ClientInfo {
        geometry: Geometry::new(
            i32::from(geometry.x),
            i32::from(geometry.y),
            u32::from(geometry.width),
            u32::from(geometry.height),
        ),
        title: window_title(conn, atoms, window)?,
        resize_increments: resize_increments(conn, window)?,
        supports_delete: supports_delete(conn, atoms, window)?,
    }))
}

/// `WM_NAME` decoded as Latin-1 or UTF-8; empty when unset or unreadable.
pub fn window_title<C: Connection>(
    conn: &C,
    atoms: &Atoms,
    window: Window,
) -> Result<String, BackendError> {
    let Ok(reply) = conn
        .get_property(false, window, AtomEnum::WM_NAME, AtomEnum::ANY, 0, 64)?
        .reply()
    else {
        return Ok(String::new());
    };
    let title = if reply.type_ == atoms.UTF8_STRING {
        String::from_utf8_lossy(&reply.value).into_owned()
    } else if reply.type_ == u32::from(AtomEnum::STRING) || reply.type_ == atoms.COMPOUND_TEXT {
        reply.value.iter().map(|&b| char::from(b)).collect()
    } else {
        String::new()
    };
    Ok(title.trim_end_matches('\0').to_string())
}

fn resize_increments<C: Connection>(
    conn: &C,
    window: Window,
) -> Result<Option<(i32, i32)>, BackendError> {
    let Ok(reply) = conn
        .get_property(
            false,
            window,
            AtomEnum::WM_NORMAL_HINTS,
            AtomEnum::WM_SIZE_HINTS,
            0,
            SIZE_HINTS_LEN,
        )?
        .reply()
    else {
        return Ok(None);
    };
    let Some(values) = reply.value32() else {
        return Ok(None);
    };
    let values: Vec<u32> = values.collect();
    if values.len() <= HEIGHT_INC || values[0] & P_RESIZE_INC == 0 {
        return Ok(None);
    }
    let increments = (values[WIDTH_INC] as i32, values[HEIGHT_INC] as i32);
    debug!(
        "PResizeInc: window=0x{:08x}, width_inc={}, height_inc={}",
        window, increments.0, increments.1
    );
    Ok(Some(increments))
}

fn supports_delete<C: Connection>(
    conn: &C,
    atoms: &Atoms,
    window: Window,
) -> Result<bool, BackendError> {
    let Ok(reply) = conn
        .get_property(false, window, atoms.WM_PROTOCOLS, AtomEnum::ATOM, 0, 32)?
        .reply()
    else {
        return Ok(false);
    };
    Ok(reply
        .value32()
        .is_some_and(|mut protocols| protocols.any(|atom| atom == atoms.WM_DELETE_WINDOW)))
}
