//! Core window-manager state.

use indexmap::IndexMap;

use crate::blob::ConfigBlob;
use crate::frame::{ClientWindow, Frame, FrameId};
use crate::geometry::{Anchor, GraspedPosition, Metrics};
use crate::popup::PopupMenu;
use crate::registry::Registry;
use crate::taskbar::Taskbar;

/// An in-progress mouse drag on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grasp {
    pub frame: FrameId,
    /// Title bar for a move, a compass point for a resize.
    pub position: GraspedPosition,
    pub anchor: Anchor,
}

/// The central window-manager state.
///
/// Frames live in one arena keyed by id; the two registries only hold ids,
/// so a frame is never duplicated and ids stay valid across reordering.
pub struct State {
    pub frames: IndexMap<FrameId, Frame>,
    /// Every live frame, in creation order.
    pub all_frames: Registry<FrameId>,
    /// Mapped frames, front (focused) to back.
    pub frames_z_order: Registry<FrameId>,
    pub grasp: Option<Grasp>,
    pub popup: PopupMenu,
    pub taskbar: Taskbar,
    pub metrics: Metrics,
    pub menu: ConfigBlob,
    pub running: bool,
}

impl State {
    pub fn new(menu: ConfigBlob, metrics: Metrics) -> Self {
        Self {
            frames: IndexMap::new(),
            all_frames: Registry::new(),
            frames_z_order: Registry::new(),
            grasp: None,
            popup: PopupMenu::default(),
            taskbar: Taskbar::default(),
            metrics,
            menu,
            running: true,
        }
    }

    /// Register a new frame: last in creation order, first in stacking order.
    pub fn insert_frame(&mut self, frame: Frame) -> FrameId {
        let id = frame.id;
        self.frames.insert(id, frame);
        self.all_frames.append(id);
        self.frames_z_order.prepend(id);
        id
    }

    /// Drop a frame from both registries and the arena. A grasp on it ends.
    pub fn remove_frame(&mut self, id: FrameId) -> Option<Frame> {
        self.all_frames.remove(id);
        self.frames_z_order.remove(id);
        if self.grasp.is_some_and(|g| g.frame == id) {
            self.grasp = None;
        }
        self.frames.shift_remove(&id)
    }

    pub fn frame_of_client(&self, client: ClientWindow) -> Option<FrameId> {
        self.all_frames
            .search(|id| self.frames.get(id).is_some_and(|f| f.client == client))
    }

    pub fn is_alive(&self, id: FrameId) -> bool {
        self.frames.contains_key(&id)
    }

    pub fn is_mapped(&self, id: FrameId) -> bool {
        self.frames_z_order.contains(id)
    }

    /// Topmost mapped frame; it holds input focus.
    pub fn focused_frame(&self) -> Option<FrameId> {
        self.frames_z_order.first()
    }

    pub fn validate_invariants(&self) -> Result<(), crate::invariants::InvariantError> {
        crate::invariants::validate(self)
    }
}
