//! fawm X11 backend: adapter between the X server and fawm-core.
//!
//! This crate:
//! - Owns the `x11rb` connection and every X resource id.
//! - Maintains a mapping from frame windows to core `FrameId`s.
//! - Translates X events into `CoreEvent`s and feeds them to `Core`.
//! - Applies returned `CoreAction`s back to the server and paints.
//!
//! **No X11 types leak into `fawm-core`.**

pub mod client;
pub mod error;
pub mod launcher;
pub mod render;

use std::collections::{HashMap, VecDeque};
use std::io;
use std::os::unix::io::AsRawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    self, Allow, AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent,
    ConfigWindow, ConfigureRequestEvent, ConfigureWindowAux, ConnectionExt, CreateWindowAux,
    EventMask, GrabMode, InputFocus, KeyButMask, ModMask, NotifyDetail, NotifyMode, Property,
    Screen, SetMode, Window, WindowClass,
};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;
use x11rb::{COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, CURRENT_TIME, NONE};

use fawm_core::appearance::Appearance;
use fawm_core::blob::ConfigBlob;
use fawm_core::event::{coalesce_motion, ConfigureRequest, StackMode};
use fawm_core::geometry::CursorShape;
use fawm_core::taskbar::CLOCK_SAMPLE;
use fawm_core::{
    ClientWindow, Core, CoreAction, CoreEvent, FrameId, Geometry, PointerPosition, Surface, Target,
};

pub use error::BackendError;

use client::Atoms;
use render::{Cursors, Painter, Palette};

/// How long the loop sleeps without events before checking the clock.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

const X11_TOKEN: Token = Token(0);

/// Recompiles the configuration when the reload menu item is chosen.
pub type MenuLoader = Box<dyn FnMut() -> anyhow::Result<ConfigBlob>>;

fn root_event_mask() -> EventMask {
    EventMask::BUTTON1_MOTION
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::SUBSTRUCTURE_REDIRECT
}

fn frame_event_mask() -> EventMask {
    EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::EXPOSURE
        | EventMask::FOCUS_CHANGE
        | EventMask::LEAVE_WINDOW
        | EventMask::POINTER_MOTION
        | EventMask::PROPERTY_CHANGE
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::SUBSTRUCTURE_REDIRECT
}

fn taskbar_event_mask() -> EventMask {
    EventMask::BUTTON1_MOTION
        | EventMask::BUTTON_PRESS
        | EventMask::BUTTON_RELEASE
        | EventMask::EXPOSURE
}

/// The backend adapter.
///
/// Owns the X connection, the manager's own windows, and the core engine.
pub struct X11Backend {
    /// The protocol-agnostic core.
    pub core: Core,
    conn: RustConnection,
    root: Window,
    taskbar: Window,
    popup: Window,
    atoms: Atoms,
    palette: Palette,
    painter: Painter,
    cursors: Cursors,
    /// Frame → X window mapping.
    frame_windows: HashMap<FrameId, Window>,
    /// Reverse mapping for resolving event windows.
    window_frames: HashMap<Window, FrameId>,
    reload: MenuLoader,
}

impl X11Backend {
    /// Connect to `$DISPLAY`, take over window management on the default
    /// screen, and create the taskbar and popup menu windows.
    pub fn connect(
        appearance: &Appearance,
        menu: ConfigBlob,
        reload: MenuLoader,
    ) -> Result<Self, BackendError> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let screen = conn.setup().roots[screen_num].clone();
        let root = screen.root;
        info!("connected to screen {} (root 0x{:08x})", screen_num, root);

        become_window_manager(&conn, root)?;
        let atoms = Atoms::new(&conn)?.reply()?;
        let palette = Palette::allocate(&conn, &screen, appearance)?;
        let painter = Painter::new(&conn, &screen, &appearance.font, palette)?;
        let cursors = Cursors::create(&conn)?;
        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().cursor(cursors.get(CursorShape::Normal)),
        )?;

        let mut metrics = appearance.metrics(
            painter.font_height(),
            i32::from(screen.width_in_pixels),
            i32::from(screen.height_in_pixels),
        );
        metrics.popup_width = painter.popup_width(&conn, &menu, metrics.popup_margin)?;
        metrics.clock_width = painter.text_width(&conn, CLOCK_SAMPLE)?;
        debug!("metrics: {:?}", metrics);

        let taskbar = create_taskbar(
            &conn,
            &screen,
            palette,
            metrics.border_size,
            metrics.taskbar_height(),
        )?;
        let popup = create_popup(&conn, &screen, palette, metrics.border_size)?;
        info!("taskbar: 0x{:08x}, popup menu: 0x{:08x}", taskbar, popup);

        Ok(Self {
            core: Core::new(menu, metrics),
            conn,
            root,
            taskbar,
            popup,
            atoms,
            palette,
            painter,
            cursors,
            frame_windows: HashMap::new(),
            window_frames: HashMap::new(),
            reload,
        })
    }

    /// Frame the clients already on screen, show the taskbar, start the
    /// startup commands, then process events until the core stops.
    pub fn run(&mut self, startup: &[String]) -> Result<(), BackendError> {
        self.manage_existing()?;
        self.conn.map_window(self.taskbar)?;
        self.conn.flush()?;
        for command in startup {
            launcher::launch(command);
        }

        let mut poll = Poll::new()?;
        let fd = self.conn.stream().as_raw_fd();
        poll.registry()
            .register(&mut SourceFd(&fd), X11_TOKEN, Interest::READABLE)?;
        let mut events = Events::with_capacity(8);

        info!("entering event loop");
        while self.core.is_running() {
            self.conn.flush()?;
            let mut queue = self.pending_events()?;
            if queue.is_empty() {
                match poll.poll(&mut events, Some(CLOCK_INTERVAL)) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
                if events.is_empty() {
                    let now = chrono::Utc::now().timestamp();
                    self.dispatch(CoreEvent::Tick { now })?;
                }
                continue;
            }
            while let Some(event) = queue.pop_front() {
                let event = coalesce_motion(event, &mut queue);
                self.dispatch(event)?;
                if !self.core.is_running() {
                    break;
                }
            }
        }
        self.conn.flush()?;
        info!("event loop finished");
        Ok(())
    }

    fn manage_existing(&mut self) -> Result<(), BackendError> {
        let tree = self.conn.query_tree(self.root)?.reply()?;
        for window in tree.children {
            if window == self.taskbar || window == self.popup {
                continue;
            }
            if !client::is_manageable(&self.conn, window)? {
                continue;
            }
            let Some(info) = client::query_client(&self.conn, &self.atoms, window)? else {
                continue;
            };
            let actions = self.core.manage_existing(ClientWindow(window), &info);
            self.apply(actions)?;
        }
        Ok(())
    }

    /// Read every queued X event, translated. Events the core has no use
    /// for are dropped here.
    fn pending_events(&mut self) -> Result<VecDeque<CoreEvent>, BackendError> {
        let mut queue = VecDeque::new();
        while let Some(event) = self.conn.poll_for_event()? {
            match self.translate(event)? {
                CoreEvent::Ignored => {}
                event => queue.push_back(event),
            }
        }
        Ok(queue)
    }

    fn dispatch(&mut self, event: CoreEvent) -> Result<(), BackendError> {
        let actions = self.core.handle_event(event);
        self.apply(actions)
    }

    fn target(&self, window: Window) -> Target {
        if window == self.root {
            Target::Root
        } else if window == self.taskbar {
            Target::Taskbar
        } else if window == self.popup {
            Target::PopupMenu
        } else if let Some(&id) = self.window_frames.get(&window) {
            Target::Frame(id)
        } else {
            Target::Other(ClientWindow(window))
        }
    }

    fn frame_window(&self, id: FrameId) -> Option<Window> {
        let window = self.frame_windows.get(&id).copied();
        if window.is_none() {
            debug!("no window for {}", id);
        }
        window
    }

    fn surface_window(&self, surface: Surface) -> Option<Window> {
        match surface {
            Surface::Frame(id) => self.frame_window(id),
            Surface::Taskbar => Some(self.taskbar),
            Surface::PopupMenu => Some(self.popup),
        }
    }

    // ── Protocol → core ──────────────────────────────────────────────

    fn translate(&self, event: Event) -> Result<CoreEvent, BackendError> {
        let event = match event {
            Event::Error(e) => {
                error::report_x_error(&e);
                return Err(BackendError::Protocol(e));
            }
            Event::MapRequest(e) => {
                let window = ClientWindow(e.window);
                let info = if self.core.is_managed(window) {
                    None
                } else {
                    client::query_client(&self.conn, &self.atoms, e.window)?
                };
                CoreEvent::MapRequest { window, info }
            }
            Event::DestroyNotify(e) => CoreEvent::DestroyNotify {
                window: ClientWindow(e.window),
            },
            Event::UnmapNotify(e) => CoreEvent::UnmapNotify {
                window: ClientWindow(e.window),
            },
            Event::ConfigureRequest(e) => CoreEvent::ConfigureRequest {
                window: ClientWindow(e.window),
                request: configure_request(&e),
            },
            Event::ButtonPress(e) => CoreEvent::ButtonPress {
                target: self.target(e.event),
                button: e.detail,
                pointer: pointer(e.event_x, e.event_y, e.root_x, e.root_y),
            },
            Event::ButtonRelease(e) => CoreEvent::ButtonRelease {
                target: self.target(e.event),
                button: e.detail,
                pointer: pointer(e.event_x, e.event_y, e.root_x, e.root_y),
            },
            Event::MotionNotify(e) => CoreEvent::MotionNotify {
                target: self.target(e.event),
                pointer: pointer(e.event_x, e.event_y, e.root_x, e.root_y),
                button1_held: e.state.contains(KeyButMask::BUTTON1),
            },
            Event::LeaveNotify(e) => CoreEvent::LeaveNotify {
                target: self.target(e.event),
            },
            Event::FocusIn(e) if is_unrelated_focus_change(e.mode, e.detail) => {
                CoreEvent::FocusIn {
                    target: self.target(e.event),
                }
            }
            Event::FocusOut(e) if is_unrelated_focus_change(e.mode, e.detail) => {
                CoreEvent::FocusOut {
                    target: self.target(e.event),
                }
            }
            Event::PropertyNotify(e)
                if e.atom == u32::from(AtomEnum::WM_NAME) && e.state == Property::NEW_VALUE =>
            {
                CoreEvent::TitleChanged {
                    window: ClientWindow(e.window),
                    title: client::window_title(&self.conn, &self.atoms, e.window)?,
                }
            }
            Event::Expose(e) => CoreEvent::Expose {
                target: self.target(e.window),
                x: i32::from(e.x),
            },
            _ => CoreEvent::Ignored,
        };
        Ok(event)
    }

    // ── Core → protocol ──────────────────────────────────────────────

    fn apply(&mut self, actions: Vec<CoreAction>) -> Result<(), BackendError> {
        for action in actions {
            debug!("apply: {:?}", action);
            self.apply_one(action)?;
        }
        Ok(())
    }

    fn configure(&self, window: Window, aux: &ConfigureWindowAux) -> Result<(), BackendError> {
        self.conn.configure_window(window, aux)?;
        Ok(())
    }

    fn apply_one(&mut self, action: CoreAction) -> Result<(), BackendError> {
        let conn = &self.conn;
        match action {
            CoreAction::CreateFrame { id, geometry } => {
                let window = conn.generate_id()?;
                let border = self.core.metrics().border_size.max(0) as u16;
                conn.create_window(
                    COPY_DEPTH_FROM_PARENT,
                    window,
                    self.root,
                    geometry.x as i16,
                    geometry.y as i16,
                    geometry.width as u16,
                    geometry.height as u16,
                    border,
                    WindowClass::INPUT_OUTPUT,
                    COPY_FROM_PARENT,
                    &CreateWindowAux::new()
                        .background_pixel(self.palette.focused)
                        .border_pixel(self.palette.black)
                        .event_mask(frame_event_mask()),
                )?;
                self.frame_windows.insert(id, window);
                self.window_frames.insert(window, id);
            }
            CoreAction::DestroyFrame { id } => {
                if let Some(window) = self.frame_windows.remove(&id) {
                    self.window_frames.remove(&window);
                    conn.destroy_window(window)?;
                }
            }
            CoreAction::SetClientBorder { client, width } => {
                self.configure(client.0, &ConfigureWindowAux::new().border_width(width))?;
            }
            CoreAction::ReparentClient {
                client,
                frame,
                x,
                y,
            } => {
                if let Some(parent) = self.frame_window(frame) {
                    debug!("reparenting {} into 0x{:08x}", client, parent);
                    conn.reparent_window(client.0, parent, x as i16, y as i16)?;
                    conn.change_window_attributes(
                        client.0,
                        &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE),
                    )?;
                }
            }
            CoreAction::GrabClickToFocus { client } => {
                conn.grab_button(
                    true,
                    client.0,
                    EventMask::BUTTON_PRESS,
                    GrabMode::SYNC,
                    GrabMode::ASYNC,
                    NONE,
                    NONE,
                    ButtonIndex::M1,
                    ModMask::ANY,
                )?;
            }
            CoreAction::AddToSaveSet { client } => {
                conn.change_save_set(SetMode::INSERT, client.0)?;
            }
            CoreAction::MapFrame { id } => {
                if let Some(window) = self.frame_window(id) {
                    conn.map_window(window)?;
                }
            }
            CoreAction::MapClient { client } => {
                conn.map_window(client.0)?;
            }
            CoreAction::UnmapFrame { id } => {
                if let Some(window) = self.frame_window(id) {
                    conn.unmap_window(window)?;
                }
            }
            CoreAction::RaiseFrame { id } => {
                if let Some(window) = self.frame_window(id) {
                    self.configure(window, &ConfigureWindowAux::new().stack_mode(xproto::StackMode::ABOVE))?;
                }
            }
            CoreAction::MoveFrame { id, x, y } => {
                if let Some(window) = self.frame_window(id) {
                    self.configure(window, &ConfigureWindowAux::new().x(x).y(y))?;
                }
            }
            CoreAction::MoveResizeFrame { id, geometry } => {
                if let Some(window) = self.frame_window(id) {
                    self.configure(window, &move_resize(geometry))?;
                }
            }
            CoreAction::ResizeClient {
                client,
                width,
                height,
            } => {
                self.configure(client.0, &ConfigureWindowAux::new().width(width).height(height))?;
            }
            CoreAction::ConfigureClient { client, request } => {
                self.configure(client.0, &forwarded_configure(&request))?;
            }
            CoreAction::SetInputFocus { client } => {
                conn.set_input_focus(InputFocus::POINTER_ROOT, client.0, CURRENT_TIME)?;
            }
            CoreAction::ReplayPointer => {
                conn.allow_events(Allow::REPLAY_POINTER, CURRENT_TIME)?;
            }
            CoreAction::SetFrameFocused { id, focused } => {
                if let Some(window) = self.frame_window(id) {
                    let pixel = if focused {
                        self.palette.focused
                    } else {
                        self.palette.unfocused
                    };
                    conn.change_window_attributes(
                        window,
                        &ChangeWindowAttributesAux::new().background_pixel(pixel),
                    )?;
                    conn.clear_area(true, window, 0, 0, 0, 0)?;
                }
            }
            CoreAction::DefineCursor { id, cursor } => {
                if let Some(window) = self.frame_window(id) {
                    let cursor = self.cursors.get(cursor);
                    conn.change_window_attributes(
                        window,
                        &ChangeWindowAttributesAux::new().cursor(cursor),
                    )?;
                }
            }
            CoreAction::UndefineCursor { id } => {
                if let Some(window) = self.frame_window(id) {
                    conn.change_window_attributes(
                        window,
                        &ChangeWindowAttributesAux::new().cursor(NONE),
                    )?;
                }
            }
            CoreAction::Redraw(surface) => {
                if let Some(window) = self.surface_window(surface) {
                    conn.clear_area(true, window, 0, 0, 0, 0)?;
                }
            }
            CoreAction::Render(surface) => self.render(surface)?,
            CoreAction::ShowPopupMenu { geometry } => {
                self.configure(
                    self.popup,
                    &move_resize(geometry).stack_mode(xproto::StackMode::ABOVE),
                )?;
                conn.map_window(self.popup)?;
                conn.clear_area(true, self.popup, 0, 0, 0, 0)?;
            }
            CoreAction::HidePopupMenu => {
                conn.unmap_window(self.popup)?;
            }
            CoreAction::RequestClose { client } => {
                let event = ClientMessageEvent::new(
                    32,
                    client.0,
                    self.atoms.WM_PROTOCOLS,
                    [self.atoms.WM_DELETE_WINDOW, CURRENT_TIME, 0, 0, 0],
                );
                conn.send_event(false, client.0, EventMask::NO_EVENT, event)?;
            }
            CoreAction::KillClient { client } => {
                conn.kill_client(client.0)?;
            }
            CoreAction::Launch { command } => launcher::launch(&command),
            CoreAction::ReloadConfig => self.reload_config()?,
            CoreAction::Exit => info!("exit requested"),
        }
        Ok(())
    }

    fn render(&self, surface: Surface) -> Result<(), BackendError> {
        let metrics = self.core.metrics();
        match surface {
            Surface::Frame(id) => {
                let (Some(frame), Some(window)) = (self.core.frame(id), self.frame_window(id))
                else {
                    return Ok(());
                };
                self.painter.draw_frame(&self.conn, window, frame, metrics)
            }
            Surface::Taskbar => {
                let entries = self.core.taskbar_entries();
                let titles: Vec<&str> = entries
                    .iter()
                    .map(|e| self.core.frame(e.frame).map_or("", |f| f.title.as_str()))
                    .collect();
                self.painter.draw_taskbar(
                    &self.conn,
                    self.taskbar,
                    &entries,
                    &titles,
                    &Painter::clock_text(),
                    metrics,
                )
            }
            Surface::PopupMenu => self.painter.draw_popup_menu(
                &self.conn,
                self.popup,
                self.core.menu(),
                self.core.popup().selected,
                metrics,
            ),
        }
    }

    fn reload_config(&mut self) -> Result<(), BackendError> {
        let menu = match (self.reload)() {
            Ok(menu) => menu,
            Err(e) => {
                warn!("Cannot reload configuration: {:#}", e);
                return Ok(());
            }
        };
        let margin = self.core.metrics().popup_margin;
        let width = self.painter.popup_width(&self.conn, &menu, margin)?;
        let actions = self.core.reload_menu(menu, width);
        self.apply(actions)
    }
}

/// Select substructure redirection on the root; only one client may.
fn become_window_manager(conn: &RustConnection, root: Window) -> Result<(), BackendError> {
    let aux = ChangeWindowAttributesAux::new().event_mask(root_event_mask());
    match conn.change_window_attributes(root, &aux)?.check() {
        Ok(()) => Ok(()),
        Err(x11rb::errors::ReplyError::X11Error(e)) if e.error_kind == ErrorKind::Access => {
            Err(BackendError::AnotherWindowManager)
        }
        Err(e) => Err(e.into()),
    }
}

fn create_taskbar(
    conn: &RustConnection,
    screen: &Screen,
    palette: Palette,
    border_size: i32,
    height: i32,
) -> Result<Window, BackendError> {
    let window = conn.generate_id()?;
    conn.create_window(
        COPY_DEPTH_FROM_PARENT,
        window,
        screen.root,
        -border_size as i16,
        (i32::from(screen.height_in_pixels) - height) as i16,
        screen.width_in_pixels,
        height.max(1) as u16,
        border_size.max(0) as u16,
        WindowClass::INPUT_OUTPUT,
        COPY_FROM_PARENT,
        &CreateWindowAux::new()
            .background_pixel(palette.unfocused)
            .border_pixel(palette.black)
            .event_mask(taskbar_event_mask()),
    )?;
    Ok(window)
}

fn create_popup(
    conn: &RustConnection,
    screen: &Screen,
    palette: Palette,
    border_size: i32,
) -> Result<Window, BackendError> {
    let window = conn.generate_id()?;
    // Placeholder size; every show sets the real one.
    conn.create_window(
        COPY_DEPTH_FROM_PARENT,
        window,
        screen.root,
        0,
        0,
        42,
        42,
        border_size.max(0) as u16,
        WindowClass::INPUT_OUTPUT,
        COPY_FROM_PARENT,
        &CreateWindowAux::new()
            .background_pixel(palette.unfocused)
            .border_pixel(palette.black)
            .event_mask(EventMask::EXPOSURE),
    )?;
    Ok(window)
}

fn pointer(x: i16, y: i16, root_x: i16, root_y: i16) -> PointerPosition {
    PointerPosition {
        x: i32::from(x),
        y: i32::from(y),
        root_x: i32::from(root_x),
        root_y: i32::from(root_y),
    }
}

/// Focus moved between unrelated windows by a normal (non-grab) change.
fn is_unrelated_focus_change(mode: NotifyMode, detail: NotifyDetail) -> bool {
    mode == NotifyMode::NORMAL
        && (detail == NotifyDetail::NONLINEAR || detail == NotifyDetail::NONLINEAR_VIRTUAL)
}

fn move_resize(geometry: Geometry) -> ConfigureWindowAux {
    ConfigureWindowAux::new()
        .x(geometry.x)
        .y(geometry.y)
        .width(geometry.width.max(1))
        .height(geometry.height.max(1))
}

fn configure_request(e: &ConfigureRequestEvent) -> ConfigureRequest {
    let has = |flag: ConfigWindow| e.value_mask.contains(flag);
    ConfigureRequest {
        x: has(ConfigWindow::X).then_some(i32::from(e.x)),
        y: has(ConfigWindow::Y).then_some(i32::from(e.y)),
        width: has(ConfigWindow::WIDTH).then_some(u32::from(e.width)),
        height: has(ConfigWindow::HEIGHT).then_some(u32::from(e.height)),
        border_width: has(ConfigWindow::BORDER_WIDTH).then_some(u32::from(e.border_width)),
        sibling: has(ConfigWindow::SIBLING).then_some(e.sibling),
        stack_mode: has(ConfigWindow::STACK_MODE).then(|| stack_mode_from_x(e.stack_mode)),
    }
}

fn stack_mode_from_x(mode: xproto::StackMode) -> StackMode {
    if mode == xproto::StackMode::BELOW {
        StackMode::Below
    } else if mode == xproto::StackMode::TOP_IF {
        StackMode::TopIf
    } else if mode == xproto::StackMode::BOTTOM_IF {
        StackMode::BottomIf
    } else if mode == xproto::StackMode::OPPOSITE {
        StackMode::Opposite
    } else {
        StackMode::Above
    }
}

const fn stack_mode_to_x(mode: StackMode) -> xproto::StackMode {
    match mode {
        StackMode::Above => xproto::StackMode::ABOVE,
        StackMode::Below => xproto::StackMode::BELOW,
        StackMode::TopIf => xproto::StackMode::TOP_IF,
        StackMode::BottomIf => xproto::StackMode::BOTTOM_IF,
        StackMode::Opposite => xproto::StackMode::OPPOSITE,
    }
}

/// Every requested field except the sibling, which is not forwarded.
fn forwarded_configure(request: &ConfigureRequest) -> ConfigureWindowAux {
    let mut aux = ConfigureWindowAux::new();
    aux.x = request.x;
    aux.y = request.y;
    aux.width = request.width;
    aux.height = request.height;
    aux.border_width = request.border_width;
    aux.stack_mode = request.stack_mode.map(stack_mode_to_x);
    aux
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_forwarded_configure_drops_sibling() {
        let request = ConfigureRequest {
            x: Some(3),
            height: Some(40),
            sibling: Some(0x20),
            stack_mode: Some(StackMode::Below),
            ..ConfigureRequest::default()
        };
        let aux = forwarded_configure(&request);
        assert_eq!(aux.x, Some(3));
        assert_eq!(aux.y, None);
        assert_eq!(aux.height, Some(40));
        assert_eq!(aux.sibling, None);
        assert_eq!(aux.stack_mode, Some(xproto::StackMode::BELOW));
    }

    #[test]
    fn test_stack_mode_conversion_round_trips() {
        for mode in [
            StackMode::Above,
            StackMode::Below,
            StackMode::TopIf,
            StackMode::BottomIf,
            StackMode::Opposite,
        ] {
            assert_eq!(stack_mode_from_x(stack_mode_to_x(mode)), mode);
        }
    }

    #[test]
    fn test_focus_filter() {
        assert!(is_unrelated_focus_change(NotifyMode::NORMAL, NotifyDetail::NONLINEAR));
        assert!(is_unrelated_focus_change(
            NotifyMode::NORMAL,
            NotifyDetail::NONLINEAR_VIRTUAL
        ));
        assert!(!is_unrelated_focus_change(NotifyMode::GRAB, NotifyDetail::NONLINEAR));
        assert!(!is_unrelated_focus_change(NotifyMode::NORMAL, NotifyDetail::INFERIOR));
    }

    #[test]
    fn test_move_resize_never_zero_sized() {
        let aux = move_resize(Geometry::new(-5, 7, 0, 12));
        assert_eq!((aux.x, aux.y, aux.width, aux.height), (Some(-5), Some(7), Some(1), Some(12)));
    }
}
