//! Protocol-agnostic events and actions.
//!
//! [`CoreEvent`] represents what the backend tells core.
//! [`CoreAction`] represents what core tells the backend to do.

use std::collections::VecDeque;

use crate::frame::{ClientInfo, ClientWindow, FrameId};
use crate::geometry::{CursorShape, Geometry, PointerPosition};

/// The window an input event was reported on, as resolved by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Root,
    Taskbar,
    PopupMenu,
    Frame(FrameId),
    /// Any other window; a client when the core has framed it.
    Other(ClientWindow),
}

/// Restacking requested in a configure request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

/// Fields a client asked to change; `None` means not requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigureRequest {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub border_width: Option<u32>,
    pub sibling: Option<u32>,
    pub stack_mode: Option<StackMode>,
}

/// Something the backend can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Frame(FrameId),
    Taskbar,
    PopupMenu,
}

/// Events that a backend sends to the core engine.
///
/// Backends translate protocol events (X11 `MapRequest`, `MotionNotify`,
/// etc.) into these variants. Events the core has no use for become
/// [`CoreEvent::Ignored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A top-level window wants to be shown. `info` is `None` when the
    /// backend could not query the window, typically because it is already
    /// gone; it is also left out for windows the core already frames.
    MapRequest {
        window: ClientWindow,
        info: Option<ClientInfo>,
    },

    /// A window was destroyed.
    DestroyNotify { window: ClientWindow },

    /// A window was unmapped by its owner.
    UnmapNotify { window: ClientWindow },

    /// A window asked to be moved, resized or restacked.
    ConfigureRequest {
        window: ClientWindow,
        request: ConfigureRequest,
    },

    /// A pointer button went down. `x`/`y` are relative to `target`.
    ButtonPress {
        target: Target,
        button: u8,
        pointer: PointerPosition,
    },

    /// A pointer button went up.
    ButtonRelease {
        target: Target,
        button: u8,
        pointer: PointerPosition,
    },

    /// The pointer moved.
    MotionNotify {
        target: Target,
        pointer: PointerPosition,
        button1_held: bool,
    },

    /// The pointer left a window.
    LeaveNotify { target: Target },

    /// Input focus entered `target` from an unrelated window.
    FocusIn { target: Target },

    /// Input focus left `target` for an unrelated window.
    FocusOut { target: Target },

    /// A client's `WM_NAME` got a new value.
    TitleChanged { window: ClientWindow, title: String },

    /// Part of a surface needs repainting; `x` is the left edge of the
    /// damaged region.
    Expose { target: Target, x: i32 },

    /// The one-second poll timed out. `now` is seconds since the epoch.
    Tick { now: i64 },

    /// A protocol event with no core meaning.
    Ignored,
}

/// Actions that core returns to the backend for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreAction {
    /// Create an unmapped frame window at the given outer geometry.
    CreateFrame { id: FrameId, geometry: Geometry },
    /// Destroy a frame window.
    DestroyFrame { id: FrameId },
    SetClientBorder { client: ClientWindow, width: u32 },
    /// Make `client` a child of the frame at `(x, y)`.
    ReparentClient {
        client: ClientWindow,
        frame: FrameId,
        x: i32,
        y: i32,
    },
    /// Arm a synchronous button-1 grab so a click on the client both focuses
    /// it and reaches it.
    GrabClickToFocus { client: ClientWindow },
    /// Keep the client alive if the manager exits.
    AddToSaveSet { client: ClientWindow },
    MapFrame { id: FrameId },
    MapClient { client: ClientWindow },
    UnmapFrame { id: FrameId },
    RaiseFrame { id: FrameId },
    MoveFrame { id: FrameId, x: i32, y: i32 },
    MoveResizeFrame { id: FrameId, geometry: Geometry },
    ResizeClient {
        client: ClientWindow,
        width: u32,
        height: u32,
    },
    /// Forward a configure request for an unmanaged window unchanged.
    ConfigureClient {
        client: ClientWindow,
        request: ConfigureRequest,
    },
    SetInputFocus { client: ClientWindow },
    /// Release the frozen pointer and deliver the click to the client.
    ReplayPointer,
    /// Switch the frame background between focused and unfocused colors.
    SetFrameFocused { id: FrameId, focused: bool },
    DefineCursor { id: FrameId, cursor: CursorShape },
    UndefineCursor { id: FrameId },
    /// Invalidate a surface so the display server sends an expose.
    Redraw(Surface),
    /// Paint a surface now, from current core state.
    Render(Surface),
    /// Move, resize, map and raise the popup menu window.
    ShowPopupMenu { geometry: Geometry },
    HidePopupMenu,
    /// Ask the client to close itself.
    RequestClose { client: ClientWindow },
    /// Disconnect the client forcibly.
    KillClient { client: ClientWindow },
    /// Start a detached shell command.
    Launch { command: String },
    /// Recompile the configuration and swap the menu.
    ReloadConfig,
    /// The main loop should end.
    Exit,
}

impl CoreEvent {
    const fn motion_target(&self) -> Option<Target> {
        match self {
            Self::MotionNotify { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// Replace a motion event with the newest queued motion for the same target.
///
/// Skipped motion events are removed from `queue`; every other queued event
/// keeps its place. Non-motion events are returned unchanged.
pub fn coalesce_motion(event: CoreEvent, queue: &mut VecDeque<CoreEvent>) -> CoreEvent {
    let Some(target) = event.motion_target() else {
        return event;
    };
    let mut latest = event;
    let mut kept = VecDeque::with_capacity(queue.len());
    for queued in queue.drain(..) {
        if queued.motion_target() == Some(target) {
            latest = queued;
        } else {
            kept.push_back(queued);
        }
    }
    *queue = kept;
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn motion(target: Target, x: i32) -> CoreEvent {
        CoreEvent::MotionNotify {
            target,
            pointer: PointerPosition {
                x,
                y: 0,
                root_x: x,
                root_y: 0,
            },
            button1_held: true,
        }
    }

    #[test]
    fn test_coalesce_keeps_latest_same_target() {
        let frame = Target::Frame(FrameId(1));
        let mut queue: VecDeque<_> = vec![
            motion(frame, 2),
            CoreEvent::Tick { now: 0 },
            motion(Target::Root, 9),
            motion(frame, 3),
        ]
        .into();
        let event = coalesce_motion(motion(frame, 1), &mut queue);
        assert_eq!(event, motion(frame, 3));
        assert_eq!(
            queue,
            VecDeque::from(vec![CoreEvent::Tick { now: 0 }, motion(Target::Root, 9)])
        );
    }

    #[test]
    fn test_coalesce_leaves_other_events() {
        let mut queue: VecDeque<_> = vec![motion(Target::Root, 4)].into();
        let event = coalesce_motion(CoreEvent::Tick { now: 5 }, &mut queue);
        assert_eq!(event, CoreEvent::Tick { now: 5 });
        assert_eq!(queue.len(), 1);
    }
}
