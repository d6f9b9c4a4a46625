//! Invariant validation for the core state.
//!
//! Called after every `handle_event` in debug builds.

use std::collections::HashSet;

use crate::frame::FrameId;
use crate::registry::Registry;
use crate::state::State;

/// Error indicating which invariant was violated.
#[derive(Debug, thiserror::Error)]
pub enum InvariantError {
    #[error("Frame {0} is registered but has no state")]
    RegisteredFrameMissing(String),

    #[error("Frame {0} has state but is not registered")]
    UnregisteredFrame(String),

    #[error("Frame {0} appears twice in a registry")]
    DuplicateEntry(String),

    #[error("Frame {0} is stacked but not alive")]
    StackedFrameNotAlive(String),

    #[error("Client {0} is framed more than once")]
    ClientFramedTwice(String),

    #[error("Grasp refers to dead frame {0}")]
    GraspOnDeadFrame(String),

    #[error("Popup selection {0} is past the last menu item")]
    SelectionOutOfRange(usize),
}

fn check_unique(registry: &Registry<FrameId>) -> Result<(), InvariantError> {
    let mut seen = HashSet::new();
    for id in registry.iter() {
        if !seen.insert(id) {
            return Err(InvariantError::DuplicateEntry(format!("{id}")));
        }
    }
    Ok(())
}

/// Validate all core invariants. Returns the first violation found.
pub fn validate(state: &State) -> Result<(), InvariantError> {
    // 1. Registries hold no duplicates
    check_unique(&state.all_frames)?;
    check_unique(&state.frames_z_order)?;

    // 2. all_frames and the arena describe the same set
    for id in state.all_frames.iter() {
        if !state.frames.contains_key(&id) {
            return Err(InvariantError::RegisteredFrameMissing(format!("{id}")));
        }
    }
    if let Some(id) = state.frames.keys().find(|id| !state.all_frames.contains(**id)) {
        return Err(InvariantError::UnregisteredFrame(format!("{id}")));
    }

    // 3. Stacked frames are alive, which also keeps focus on a live frame
    if let Some(id) = state.frames_z_order.search(|id| !state.all_frames.contains(*id)) {
        return Err(InvariantError::StackedFrameNotAlive(format!("{id}")));
    }

    // 4. One frame per client
    let mut clients = HashSet::new();
    for frame in state.frames.values() {
        if !clients.insert(frame.client) {
            return Err(InvariantError::ClientFramedTwice(format!("{}", frame.client)));
        }
    }

    // 5. A grasp targets a live frame
    if let Some(grasp) = state.grasp {
        if !state.frames.contains_key(&grasp.frame) {
            return Err(InvariantError::GraspOnDeadFrame(format!("{}", grasp.frame)));
        }
    }

    // 6. Popup selection indexes a real item
    if let Some(selected) = state.popup.selected {
        if selected >= state.menu.item_count() {
            return Err(InvariantError::SelectionOutOfRange(selected));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::ConfigBlob;
    use crate::frame::{ClientInfo, ClientWindow, Frame};
    use crate::geometry::{Geometry, Metrics};
    use crate::menu::Config;

    fn state() -> State {
        State::new(ConfigBlob::from_config(&Config::default()).unwrap(), Metrics::default())
    }

    fn frame(id: u64, client: u32) -> Frame {
        Frame::new(FrameId(id), ClientWindow(client), Geometry::default(), &ClientInfo::default())
    }

    #[test]
    fn test_fresh_state_is_valid() {
        let mut s = state();
        s.insert_frame(frame(1, 10));
        s.insert_frame(frame(2, 20));
        validate(&s).unwrap();
    }

    #[test]
    fn test_duplicate_z_order_entry() {
        let mut s = state();
        s.insert_frame(frame(1, 10));
        s.frames_z_order.append(FrameId(1));
        assert!(matches!(validate(&s), Err(InvariantError::DuplicateEntry(_))));
    }

    #[test]
    fn test_stacked_dead_frame() {
        let mut s = state();
        s.frames_z_order.append(FrameId(9));
        assert!(matches!(validate(&s), Err(InvariantError::StackedFrameNotAlive(_))));
    }

    #[test]
    fn test_client_framed_twice() {
        let mut s = state();
        s.insert_frame(frame(1, 10));
        s.insert_frame(frame(2, 10));
        assert!(matches!(validate(&s), Err(InvariantError::ClientFramedTwice(_))));
    }

    #[test]
    fn test_selection_without_menu() {
        let mut s = state();
        s.popup.selected = Some(0);
        assert!(matches!(validate(&s), Err(InvariantError::SelectionOutOfRange(0))));
    }
}
