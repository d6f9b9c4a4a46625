//! fawm core: protocol-agnostic frame and interaction engine
//!
//! This crate contains the window-manager logic (frame registry, hit-testing,
//! move/resize grasps, focus and stacking, taskbar and popup-menu state) and
//! the configuration language with its relocatable blob, with zero
//! dependencies on a display protocol.
//!
//! Backends translate protocol events into [`CoreEvent`]s, feed them to
//! [`Core`], and apply the returned [`CoreAction`]s back to the display
//! server.
//!
//! # Quick Start
//! ```
//! use fawm_core::{ClientInfo, ClientWindow, Core, CoreAction, CoreEvent, Geometry};
//! use fawm_core::blob::ConfigBlob;
//! use fawm_core::parser;
//!
//! let config = parser::parse("menu\n  exit\nend\n").unwrap();
//! let blob = ConfigBlob::from_config(&config).unwrap();
//! let mut core = Core::new(blob, Default::default());
//!
//! // Backend tells core a client wants to be shown
//! let actions = core.handle_event(CoreEvent::MapRequest {
//!     window: ClientWindow(0x40_0001),
//!     info: Some(ClientInfo {
//!         geometry: Geometry::new(10, 10, 640, 480),
//!         title: "xterm".into(),
//!         ..Default::default()
//!     }),
//! });
//! assert!(matches!(actions[0], CoreAction::CreateFrame { .. }));
//! ```

pub mod appearance;
pub mod blob;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod invariants;
pub mod menu;
pub mod parser;
pub mod popup;
pub mod registry;
pub mod state;
pub mod taskbar;

// Re-export primary API types at crate root
pub use event::{CoreAction, CoreEvent, Surface, Target};
pub use frame::{ClientInfo, ClientWindow, Frame, FrameId, FrameStatus};
pub use geometry::{Geometry, GraspedPosition, Metrics, PointerPosition};

use tracing::{debug, info, warn};

use blob::{ConfigBlob, MenuItemView};
use event::ConfigureRequest;
use geometry::{detect_frame_position, detect_frame_status, move_origin, resize_geometry, Anchor};
use state::{Grasp, State};
use taskbar::{TaskbarEntry, TaskbarHit};

/// Pointer button that drives every interaction.
pub const BUTTON_1: u8 = 1;

/// The protocol-agnostic window manager engine.
///
/// Owns all WM state. Backends drive it via
/// [`handle_event`](Core::handle_event), then apply the returned
/// [`CoreAction`]s.
pub struct Core {
    /// All window-manager state
    pub state: State,
    /// Monotonic frame ID counter
    next_fid: u64,
}

impl Core {
    /// Create a core engine around a loaded menu and screen metrics.
    pub fn new(menu: ConfigBlob, metrics: Metrics) -> Self {
        Self {
            state: State::new(menu, metrics),
            next_fid: 1,
        }
    }

    fn next_frame_id(&mut self) -> FrameId {
        let id = FrameId(self.next_fid);
        self.next_fid += 1;
        id
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub const fn is_running(&self) -> bool {
        self.state.running
    }

    pub const fn metrics(&self) -> &Metrics {
        &self.state.metrics
    }

    pub const fn menu(&self) -> &ConfigBlob {
        &self.state.menu
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.state.frames.get(&id)
    }

    pub fn frame_of_client(&self, client: ClientWindow) -> Option<FrameId> {
        self.state.frame_of_client(client)
    }

    pub fn is_managed(&self, client: ClientWindow) -> bool {
        self.frame_of_client(client).is_some()
    }

    /// Topmost mapped frame, if any.
    pub fn focused_frame(&self) -> Option<FrameId> {
        self.state.focused_frame()
    }

    /// Every live frame in creation order.
    pub fn all_frames(&self) -> Vec<FrameId> {
        self.state.all_frames.iter().collect()
    }

    /// Mapped frames, front to back.
    pub fn z_order(&self) -> Vec<FrameId> {
        self.state.frames_z_order.iter().collect()
    }

    pub const fn grasp(&self) -> Option<Grasp> {
        self.state.grasp
    }

    pub const fn popup(&self) -> &popup::PopupMenu {
        &self.state.popup
    }

    /// Window-list slots for drawing the taskbar.
    pub fn taskbar_entries(&self) -> Vec<TaskbarEntry> {
        taskbar::layout(
            self.state.all_frames.iter(),
            self.focused_frame(),
            &self.state.metrics,
        )
    }

    // ── Event handling (backend → core) ──────────────────────────────

    /// Process a backend event. Returns actions the backend must apply.
    pub fn handle_event(&mut self, event: CoreEvent) -> Vec<CoreAction> {
        debug!("handle_event: {:?}", event);
        let actions = match event {
            CoreEvent::MapRequest { window, info } => self.on_map_request(window, info),
            CoreEvent::DestroyNotify { window } => self.on_destroy_notify(window),
            CoreEvent::UnmapNotify { window } => self.on_unmap_notify(window),
            CoreEvent::ConfigureRequest { window, request } => {
                self.on_configure_request(window, request)
            }
            CoreEvent::ButtonPress {
                target,
                button,
                pointer,
            } => self.on_button_press(target, button, pointer),
            CoreEvent::ButtonRelease { target, pointer, .. } => {
                self.on_button_release(target, pointer)
            }
            CoreEvent::MotionNotify {
                target,
                pointer,
                button1_held,
            } => self.on_motion(target, pointer, button1_held),
            CoreEvent::LeaveNotify { target } => self.on_leave(target),
            CoreEvent::FocusIn { target } => self.on_focus_change(target, true),
            CoreEvent::FocusOut { target } => self.on_focus_change(target, false),
            CoreEvent::TitleChanged { window, title } => self.on_title_changed(window, &title),
            CoreEvent::Expose { target, x } => self.on_expose(target, x),
            CoreEvent::Tick { now } => self.on_tick(now),
            CoreEvent::Ignored => Vec::new(),
        };

        #[cfg(debug_assertions)]
        if let Err(e) = self.state.validate_invariants() {
            warn!("Invariant violation after handle_event: {}", e);
        }

        actions
    }

    /// Frame a client found mapped at startup.
    pub fn manage_existing(&mut self, client: ClientWindow, info: &ClientInfo) -> Vec<CoreAction> {
        if self.is_managed(client) {
            return Vec::new();
        }
        self.manage(client, info)
    }

    /// Swap in a freshly compiled menu. `popup_width` is the measured width
    /// of the new captions plus margins.
    pub fn reload_menu(&mut self, menu: ConfigBlob, popup_width: i32) -> Vec<CoreAction> {
        info!("menu reloaded with {} items", menu.item_count());
        self.state.menu = menu;
        self.state.metrics.popup_width = popup_width;
        self.state.popup.selected = None;
        if self.state.popup.visible {
            self.state.popup.hide();
            return vec![CoreAction::HidePopupMenu];
        }
        Vec::new()
    }

    // ── Frame lifecycle ──────────────────────────────────────────────

    /// Create a frame around `client`, reparent it, and register it.
    fn reparent(&mut self, client: ClientWindow, info: &ClientInfo) -> (FrameId, Vec<CoreAction>) {
        let metrics = self.state.metrics;
        let (width, height) =
            metrics.frame_size_for_client(info.geometry.width, info.geometry.height);
        let geometry = Geometry::new(info.geometry.x, info.geometry.y, width, height);
        let id = self.next_frame_id();
        self.state
            .insert_frame(Frame::new(id, client, geometry, info));
        info!("framing {} as {} ({:?})", client, id, info.title);

        let (x, y) = metrics.client_offset();
        let actions = vec![
            CoreAction::CreateFrame { id, geometry },
            CoreAction::SetClientBorder {
                client,
                width: metrics.client_border_size.max(0) as u32,
            },
            CoreAction::ReparentClient {
                client,
                frame: id,
                x,
                y,
            },
            CoreAction::GrabClickToFocus { client },
            CoreAction::AddToSaveSet { client },
        ];
        (id, actions)
    }

    fn manage(&mut self, client: ClientWindow, info: &ClientInfo) -> Vec<CoreAction> {
        let (id, mut actions) = self.reparent(client, info);
        actions.extend(self.map_frame(id));
        actions
    }

    /// Show a frame and its client on top with focus.
    fn map_frame(&mut self, id: FrameId) -> Vec<CoreAction> {
        let Some(client) = self.frame(id).map(|f| f.client) else {
            return Vec::new();
        };
        let mut actions = vec![
            CoreAction::MapFrame { id },
            CoreAction::MapClient { client },
            CoreAction::RaiseFrame { id },
        ];
        actions.extend(self.focus(id));
        actions
    }

    /// Remove a frame from the stacking order and hide it.
    fn unmap_frame(&mut self, id: FrameId) -> Vec<CoreAction> {
        self.state.frames_z_order.remove(id);
        let mut actions = vec![CoreAction::UnmapFrame { id }];
        actions.extend(self.focus_top_frame());
        actions
    }

    fn destroy_frame(&mut self, id: FrameId) -> Vec<CoreAction> {
        match self.state.remove_frame(id) {
            Some(frame) => {
                info!("destroyed {} of {}", id, frame.client);
                vec![CoreAction::DestroyFrame { id }]
            }
            None => Vec::new(),
        }
    }

    fn close_frame(&mut self, id: FrameId) -> Vec<CoreAction> {
        let Some(frame) = self.frame(id) else {
            return Vec::new();
        };
        let client = frame.client;
        if frame.supports_delete {
            debug!("asking {} to close", client);
            return vec![CoreAction::RequestClose { client }];
        }
        debug!("killing {}", client);
        let mut actions = vec![CoreAction::KillClient { client }];
        actions.extend(self.destroy_frame(id));
        actions.extend(self.focus_top_frame());
        actions
    }

    // ── Focus ────────────────────────────────────────────────────────

    fn focus(&mut self, id: FrameId) -> Vec<CoreAction> {
        let Some(client) = self.frame(id).map(|f| f.client) else {
            return Vec::new();
        };
        self.state.frames_z_order.move_to_front(id);
        vec![
            CoreAction::SetInputFocus { client },
            CoreAction::Redraw(Surface::Taskbar),
        ]
    }

    /// Focus whatever is now on top, or leave only the taskbar repaint.
    fn focus_top_frame(&mut self) -> Vec<CoreAction> {
        match self.state.focused_frame() {
            Some(id) => self.focus(id),
            None => vec![CoreAction::Redraw(Surface::Taskbar)],
        }
    }

    // ── Event handlers ───────────────────────────────────────────────

    fn on_map_request(&mut self, window: ClientWindow, info: Option<ClientInfo>) -> Vec<CoreAction> {
        if let Some(id) = self.frame_of_client(window) {
            return self.map_frame(id);
        }
        match info {
            Some(info) => self.manage(window, &info),
            None => {
                debug!("map request for vanished window {}", window);
                Vec::new()
            }
        }
    }

    fn on_destroy_notify(&mut self, window: ClientWindow) -> Vec<CoreAction> {
        let Some(id) = self.frame_of_client(window) else {
            return Vec::new();
        };
        let mut actions = self.destroy_frame(id);
        actions.extend(self.focus_top_frame());
        actions
    }

    fn on_unmap_notify(&mut self, window: ClientWindow) -> Vec<CoreAction> {
        match self.frame_of_client(window) {
            Some(id) => self.unmap_frame(id),
            None => Vec::new(),
        }
    }

    fn on_configure_request(
        &mut self,
        window: ClientWindow,
        request: ConfigureRequest,
    ) -> Vec<CoreAction> {
        let Some(id) = self.frame_of_client(window) else {
            if let Some(sibling) = request.sibling {
                debug!("ignoring sibling 0x{:08x} for {}", sibling, window);
            }
            return vec![CoreAction::ConfigureClient {
                client: window,
                request,
            }];
        };
        let metrics = self.state.metrics;
        let Some(frame) = self.state.frames.get_mut(&id) else {
            return Vec::new();
        };

        let mut geometry = frame.geometry;
        if let Some(x) = request.x {
            geometry.x = x - metrics.frame_size;
        }
        if let Some(y) = request.y {
            geometry.y = y - (metrics.frame_size + metrics.title_height);
        }
        let (mut client_width, mut client_height) =
            metrics.client_size_for_frame(geometry.width, geometry.height);
        if let Some(width) = request.width {
            client_width = width.max(1);
            geometry.width = metrics.frame_size_for_client(client_width, client_height).0;
        }
        if let Some(height) = request.height {
            client_height = height.max(1);
            geometry.height = metrics.frame_size_for_client(client_width, client_height).1;
        }
        frame.geometry = geometry;

        let mut actions = vec![CoreAction::MoveResizeFrame { id, geometry }];
        if request.width.is_some() || request.height.is_some() {
            actions.push(CoreAction::ResizeClient {
                client: window,
                width: client_width,
                height: client_height,
            });
        }
        actions
    }

    fn on_button_press(
        &mut self,
        target: Target,
        button: u8,
        pointer: PointerPosition,
    ) -> Vec<CoreAction> {
        if button != BUTTON_1 {
            return Vec::new();
        }
        match target {
            Target::Root => self.open_popup(pointer.root_x, pointer.root_y),
            Target::Taskbar => self.on_taskbar_press(pointer.x),
            Target::PopupMenu => Vec::new(),
            Target::Other(window) => {
                let mut actions = Vec::new();
                if let Some(id) = self.frame_of_client(window) {
                    actions.push(CoreAction::RaiseFrame { id });
                    actions.extend(self.focus(id));
                }
                actions.push(CoreAction::ReplayPointer);
                actions
            }
            Target::Frame(id) => self.on_frame_press(id, pointer),
        }
    }

    fn on_frame_press(&mut self, id: FrameId, pointer: PointerPosition) -> Vec<CoreAction> {
        let metrics = self.state.metrics;
        let Some(frame) = self.state.frames.get_mut(&id) else {
            return Vec::new();
        };
        let width = frame.geometry.width as i32;
        let height = frame.geometry.height as i32;
        frame.status = detect_frame_status(&metrics, width, pointer.x, pointer.y);

        match frame.status {
            FrameStatus::Close => return self.close_frame(id),
            FrameStatus::Minimize => return self.unmap_frame(id),
            // The maximize box has no action; a press there grasps the title bar.
            FrameStatus::Maximize | FrameStatus::None => {}
        }

        let anchor = Anchor {
            x: pointer.x,
            y: pointer.y,
            width: frame.geometry.width,
            height: frame.geometry.height,
        };
        let position = detect_frame_position(&metrics, width, height, pointer.x, pointer.y);

        let mut actions = vec![CoreAction::RaiseFrame { id }];
        actions.extend(self.focus(id));
        if position != GraspedPosition::None {
            debug!("grasp {} at {:?}", id, position);
            self.state.grasp = Some(Grasp {
                frame: id,
                position,
                anchor,
            });
        }
        actions
    }

    fn on_taskbar_press(&mut self, x: i32) -> Vec<CoreAction> {
        let metrics = self.state.metrics;
        match taskbar::hit(x, self.state.all_frames.len(), &metrics) {
            TaskbarHit::MenuButton => {
                self.open_popup(0, metrics.screen_height - metrics.taskbar_height())
            }
            TaskbarHit::Entry(index) => {
                let Some(id) = self.state.all_frames.get(index) else {
                    return Vec::new();
                };
                let mut actions = vec![CoreAction::MapFrame { id }, CoreAction::RaiseFrame { id }];
                actions.extend(self.focus(id));
                actions
            }
            TaskbarHit::Nothing => Vec::new(),
        }
    }

    fn open_popup(&mut self, x: i32, y: i32) -> Vec<CoreAction> {
        let count = self.state.menu.item_count();
        if count == 0 {
            debug!("popup menu has no items");
            return Vec::new();
        }
        let geometry = self.state.popup.place(x, y, count, &self.state.metrics);
        vec![CoreAction::ShowPopupMenu { geometry }]
    }

    fn on_button_release(&mut self, target: Target, pointer: PointerPosition) -> Vec<CoreAction> {
        if let Some(grasp) = self.state.grasp.take() {
            debug!("release {}", grasp.frame);
        }
        if matches!(target, Target::Frame(_)) || !self.state.popup.visible {
            return Vec::new();
        }

        let count = self.state.menu.item_count();
        let index = self
            .state
            .popup
            .item_at(pointer.root_x, pointer.root_y, count, &self.state.metrics);
        self.state.popup.hide();
        self.state.popup.selected = None;
        let mut actions = vec![CoreAction::HidePopupMenu];

        match index.and_then(|i| self.state.menu.item(i)) {
            Some(MenuItemView::Exit) => {
                info!("exit selected");
                self.state.running = false;
                actions.push(CoreAction::Exit);
            }
            Some(MenuItemView::Exec { command, .. }) => {
                actions.push(CoreAction::Launch {
                    command: command.to_owned(),
                });
            }
            Some(MenuItemView::Reload) => actions.push(CoreAction::ReloadConfig),
            None => {}
        }
        actions
    }

    fn on_motion(
        &mut self,
        target: Target,
        pointer: PointerPosition,
        button1_held: bool,
    ) -> Vec<CoreAction> {
        match target {
            Target::Root | Target::Taskbar | Target::PopupMenu => {
                let count = self.state.menu.item_count();
                let metrics = self.state.metrics;
                if self
                    .state
                    .popup
                    .highlight(pointer.root_x, pointer.root_y, count, &metrics)
                {
                    vec![CoreAction::Redraw(Surface::PopupMenu)]
                } else {
                    Vec::new()
                }
            }
            Target::Frame(id) if button1_held => self.drag(id, pointer),
            Target::Frame(id) => self.hover(id, pointer),
            Target::Other(_) => Vec::new(),
        }
    }

    /// Cursor shape and control-box highlight for a pointer over a frame.
    fn hover(&mut self, id: FrameId, pointer: PointerPosition) -> Vec<CoreAction> {
        let metrics = self.state.metrics;
        let Some(frame) = self.state.frames.get_mut(&id) else {
            return Vec::new();
        };
        let width = frame.geometry.width as i32;
        let height = frame.geometry.height as i32;
        let mut actions = Vec::new();

        let cursor = detect_frame_position(&metrics, width, height, pointer.x, pointer.y).cursor();
        actions.push(CoreAction::DefineCursor { id, cursor });

        let status = detect_frame_status(&metrics, width, pointer.x, pointer.y);
        if frame.status != status {
            frame.status = status;
            actions.push(CoreAction::Redraw(Surface::Frame(id)));
        }
        actions
    }

    /// Continue a grasp: move for the title bar, resize for a handle.
    fn drag(&mut self, id: FrameId, pointer: PointerPosition) -> Vec<CoreAction> {
        let Some(grasp) = self.state.grasp.filter(|g| g.frame == id) else {
            return Vec::new();
        };
        let metrics = self.state.metrics;
        let Some(frame) = self.state.frames.get_mut(&id) else {
            return Vec::new();
        };

        if grasp.position == GraspedPosition::TitleBar {
            let (x, y) = move_origin(grasp.anchor, pointer, metrics.border_size);
            frame.geometry.x = x;
            frame.geometry.y = y;
            return vec![CoreAction::MoveFrame { id, x, y }];
        }

        let geometry = resize_geometry(
            grasp.position.edges(),
            frame.geometry,
            grasp.anchor,
            pointer,
            frame.increments(),
            &metrics,
        );
        frame.geometry = geometry;
        let (width, height) = metrics.client_size_for_frame(geometry.width, geometry.height);
        vec![
            CoreAction::MoveResizeFrame { id, geometry },
            CoreAction::ResizeClient {
                client: frame.client,
                width,
                height,
            },
        ]
    }

    fn on_leave(&mut self, target: Target) -> Vec<CoreAction> {
        match target {
            Target::Frame(id) if self.state.is_alive(id) => vec![CoreAction::UndefineCursor { id }],
            _ => Vec::new(),
        }
    }

    fn on_focus_change(&mut self, target: Target, focused: bool) -> Vec<CoreAction> {
        let Target::Frame(id) = target else {
            return Vec::new();
        };
        if !self.state.is_alive(id) {
            // Focus events can trail a destroyed frame.
            return Vec::new();
        }
        let mut actions = Vec::new();
        if focused {
            actions.push(CoreAction::RaiseFrame { id });
        }
        actions.push(CoreAction::SetFrameFocused { id, focused });
        actions
    }

    fn on_title_changed(&mut self, window: ClientWindow, title: &str) -> Vec<CoreAction> {
        let Some(id) = self.frame_of_client(window) else {
            return Vec::new();
        };
        if let Some(frame) = self.state.frames.get_mut(&id) {
            frame.set_title(title);
        }
        vec![
            CoreAction::Redraw(Surface::Frame(id)),
            CoreAction::Redraw(Surface::Taskbar),
        ]
    }

    fn on_expose(&mut self, target: Target, x: i32) -> Vec<CoreAction> {
        match target {
            Target::PopupMenu => vec![CoreAction::Render(Surface::PopupMenu)],
            Target::Taskbar => vec![CoreAction::Render(Surface::Taskbar)],
            // An expose starting at the client offset follows a killed client;
            // the frame is about to go away.
            Target::Frame(_) if x == self.state.metrics.frame_size => Vec::new(),
            Target::Frame(id) if self.state.is_alive(id) => {
                vec![CoreAction::Render(Surface::Frame(id))]
            }
            _ => Vec::new(),
        }
    }

    fn on_tick(&mut self, now: i64) -> Vec<CoreAction> {
        if self.state.taskbar.should_redraw_clock(now) {
            vec![CoreAction::Redraw(Surface::Taskbar)]
        } else {
            Vec::new()
        }
    }
}
