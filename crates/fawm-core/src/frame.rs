//! Frame types.
//!
//! A frame is the decorated container the manager wraps around one client
//! top-level window. No display-server handles leak here: the client is an
//! opaque number chosen by the backend, the frame an id chosen by the core.

use crate::geometry::Geometry;

/// Longest title kept for a frame, in bytes.
pub const MAX_TITLE_LEN: usize = 63;

/// Unique, opaque identifier for a frame, assigned by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame:{}", self.0)
    }
}

/// A client top-level window, as the backend names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientWindow(pub u32);

impl std::fmt::Display for ClientWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Which title-bar control box the pointer hovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameStatus {
    #[default]
    None,
    Minimize,
    Maximize,
    Close,
}

/// What the backend learned about a client before it is framed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientInfo {
    /// Client position and size before reparenting.
    pub geometry: Geometry,
    pub title: String,
    /// Resize increments from the size hints, when the client set them.
    pub resize_increments: Option<(i32, i32)>,
    /// Whether `WM_DELETE_WINDOW` is among the client's protocols.
    pub supports_delete: bool,
}

/// One reparented client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: FrameId,
    pub client: ClientWindow,
    /// Outer geometry of the frame window.
    pub geometry: Geometry,
    pub title: String,
    pub width_inc: i32,
    pub height_inc: i32,
    pub status: FrameStatus,
    pub supports_delete: bool,
}

impl Frame {
    pub fn new(id: FrameId, client: ClientWindow, geometry: Geometry, info: &ClientInfo) -> Self {
        let (width_inc, height_inc) = info.resize_increments.unwrap_or((1, 1));
        Self {
            id,
            client,
            geometry,
            title: truncate_title(&info.title),
            width_inc: width_inc.max(1),
            height_inc: height_inc.max(1),
            status: FrameStatus::None,
            supports_delete: info.supports_delete,
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = truncate_title(title);
    }

    pub const fn increments(&self) -> (i32, i32) {
        (self.width_inc, self.height_inc)
    }
}

/// Cut a title to [`MAX_TITLE_LEN`] bytes without splitting a character.
pub fn truncate_title(title: &str) -> String {
    if title.len() <= MAX_TITLE_LEN {
        return title.to_owned();
    }
    let mut end = MAX_TITLE_LEN;
    while !title.is_char_boundary(end) {
        end -= 1;
    }
    title[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_defaults_to_unit_increments() {
        let info = ClientInfo::default();
        let frame = Frame::new(FrameId(1), ClientWindow(7), Geometry::default(), &info);
        assert_eq!(frame.increments(), (1, 1));
        assert_eq!(frame.status, FrameStatus::None);
        assert!(!frame.supports_delete);
    }

    #[test]
    fn test_zero_increment_is_treated_as_one() {
        let info = ClientInfo {
            resize_increments: Some((0, 6)),
            ..ClientInfo::default()
        };
        let frame = Frame::new(FrameId(1), ClientWindow(7), Geometry::default(), &info);
        assert_eq!(frame.increments(), (1, 6));
    }

    #[test]
    fn test_title_truncated_on_char_boundary() {
        let long = "é".repeat(40);
        let t = truncate_title(&long);
        assert!(t.len() <= MAX_TITLE_LEN);
        assert_eq!(t.len() % 2, 0);
        assert_eq!(truncate_title("xterm"), "xterm");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FrameId(3)), "frame:3");
        assert_eq!(format!("{}", ClientWindow(0x1a)), "0x0000001a");
    }
}
