//! Frame geometry and hit-testing.
//!
//! Everything here is pure: a frame's size plus a pointer position in, a
//! symbolic zone or a new rectangle out. The zone boundaries decide how the
//! drag handles feel, so they are kept exactly as the decoration is drawn.

use bitflags::bitflags;

use crate::frame::FrameStatus;

/// Geometry of a rectangular region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn contains(self, x: i32, y: i32) -> bool {
        inside(self.x, self.y, self.width as i32, self.height as i32, x, y)
    }

    pub const fn right(self) -> i32 {
        self.x + self.width as i32
    }

    pub const fn bottom(self) -> i32 {
        self.y + self.height as i32
    }
}

/// Half-open region test; empty when either extent is not positive.
const fn inside(rx: i32, ry: i32, rw: i32, rh: i32, x: i32, y: i32) -> bool {
    rx <= x && x < rx + rw && ry <= y && y < ry + rh
}

/// Pixel sizes shared by the hit-tester, the grasp logic and the renderer.
///
/// The backend fills the font-dependent fields after loading its font and
/// measuring the clock and menu captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Border of the frame window itself.
    pub border_size: i32,
    /// Border given to the reparented client.
    pub client_border_size: i32,
    /// Width of the resize band along every frame edge.
    pub frame_size: i32,
    /// Length of the diagonal handles measured along each edge.
    pub resizable_corner_size: i32,
    pub title_height: i32,
    pub padding: i32,
    pub font_height: i32,
    pub popup_margin: i32,
    pub popup_width: i32,
    pub clock_width: i32,
    pub screen_width: i32,
    pub screen_height: i32,
}

impl Default for Metrics {
    fn default() -> Self {
        let font_height = 13;
        let frame_size = 4;
        Self {
            border_size: 1,
            client_border_size: 1,
            frame_size,
            resizable_corner_size: 32,
            title_height: font_height,
            padding: frame_size,
            font_height,
            popup_margin: 8,
            popup_width: 0,
            clock_width: 0,
            screen_width: 1024,
            screen_height: 768,
        }
    }
}

impl Metrics {
    /// Horizontal decoration added around a client, client borders included.
    pub const fn frame_extra_width(&self) -> i32 {
        2 * (self.frame_size + self.client_border_size)
    }

    /// Vertical decoration added around a client, client borders included.
    pub const fn frame_extra_height(&self) -> i32 {
        self.title_height + 3 * self.frame_size + 2 * self.client_border_size
    }

    /// Where the client sits inside its frame.
    pub const fn client_offset(&self) -> (i32, i32) {
        (self.frame_size, 2 * self.frame_size + self.title_height)
    }

    pub const fn taskbar_height(&self) -> i32 {
        self.font_height + 2 * self.padding
    }

    /// Left edge of the clock text in the taskbar.
    pub const fn clock_x(&self) -> i32 {
        self.screen_width - self.clock_width - self.padding
    }

    pub fn frame_size_for_client(&self, width: u32, height: u32) -> (u32, u32) {
        (
            clamp_dimension(width as i32 + self.frame_extra_width()),
            clamp_dimension(height as i32 + self.frame_extra_height()),
        )
    }

    pub fn client_size_for_frame(&self, width: u32, height: u32) -> (u32, u32) {
        (
            clamp_dimension(width as i32 - self.frame_extra_width()),
            clamp_dimension(height as i32 - self.frame_extra_height()),
        )
    }

    /// Smallest frame that still leaves the client one pixel each way.
    pub fn min_frame_size(&self) -> (i32, i32) {
        (self.frame_extra_width() + 1, self.frame_extra_height() + 1)
    }
}

fn clamp_dimension(value: i32) -> u32 {
    value.max(1) as u32
}

/// Which part of a frame the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraspedPosition {
    #[default]
    None,
    TitleBar,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

bitflags! {
    /// Frame edges that follow the pointer during a resize.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ResizeEdges: u8 {
        const TOP    = 0b0001;
        const BOTTOM = 0b0010;
        const LEFT   = 0b0100;
        const RIGHT  = 0b1000;
    }
}

impl GraspedPosition {
    pub const fn edges(self) -> ResizeEdges {
        match self {
            Self::None | Self::TitleBar => ResizeEdges::empty(),
            Self::North => ResizeEdges::TOP,
            Self::NorthEast => ResizeEdges::TOP.union(ResizeEdges::RIGHT),
            Self::East => ResizeEdges::RIGHT,
            Self::SouthEast => ResizeEdges::BOTTOM.union(ResizeEdges::RIGHT),
            Self::South => ResizeEdges::BOTTOM,
            Self::SouthWest => ResizeEdges::BOTTOM.union(ResizeEdges::LEFT),
            Self::West => ResizeEdges::LEFT,
            Self::NorthWest => ResizeEdges::TOP.union(ResizeEdges::LEFT),
        }
    }

    pub const fn is_resize(self) -> bool {
        !self.edges().is_empty()
    }

    pub const fn cursor(self) -> CursorShape {
        match self {
            Self::None | Self::TitleBar => CursorShape::Normal,
            Self::North => CursorShape::Top,
            Self::NorthEast => CursorShape::TopRight,
            Self::East => CursorShape::Right,
            Self::SouthEast => CursorShape::BottomRight,
            Self::South => CursorShape::Bottom,
            Self::SouthWest => CursorShape::BottomLeft,
            Self::West => CursorShape::Left,
            Self::NorthWest => CursorShape::TopLeft,
        }
    }
}

/// Pointer shapes, one per hit zone (title bar and outside share `Normal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    Normal,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl CursorShape {
    pub const ALL: [Self; 9] = [
        Self::Normal,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
        Self::TopLeft,
    ];
}

/// Classify a frame-local point.
///
/// Corners are tested before edges and edges before the interior, so a point
/// where a corner handle and an edge band overlap resolves to the corner.
pub const fn detect_frame_position(
    metrics: &Metrics,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
) -> GraspedPosition {
    let f = metrics.frame_size;
    let c = metrics.resizable_corner_size;
    let virt = c - f;
    let middle_width = width - 2 * c;
    let middle_height = height - 2 * c;
    let east_corner_x = width - c;
    let virt_east_x = width - f;
    let bottom_y = height - f;

    if inside(0, f, f, virt, x, y) || inside(0, 0, c, f, x, y) {
        return GraspedPosition::NorthWest;
    }
    if inside(c, 0, middle_width, f, x, y) {
        return GraspedPosition::North;
    }
    if inside(east_corner_x, 0, c, f, x, y) || inside(virt_east_x, f, f, virt, x, y) {
        return GraspedPosition::NorthEast;
    }
    if inside(virt_east_x, c, f, middle_height, x, y) {
        return GraspedPosition::East;
    }
    if inside(virt_east_x, height - c, f, virt, x, y)
        || inside(east_corner_x, bottom_y, c, f, x, y)
    {
        return GraspedPosition::SouthEast;
    }
    if inside(c, bottom_y, middle_width, f, x, y) {
        return GraspedPosition::South;
    }
    if inside(0, bottom_y, c, f, x, y) || inside(0, height - c, f, virt, x, y) {
        return GraspedPosition::SouthWest;
    }
    if inside(0, c, f, middle_height, x, y) {
        return GraspedPosition::West;
    }
    if inside(0, 0, width, height, x, y) {
        return GraspedPosition::TitleBar;
    }
    GraspedPosition::None
}

/// Classify a frame-local point against the three title-bar control boxes.
///
/// The boxes are `title_height` square, right-aligned inside the frame band:
/// close rightmost, then maximize, then minimize.
pub const fn detect_frame_status(metrics: &Metrics, width: i32, x: i32, y: i32) -> FrameStatus {
    let f = metrics.frame_size;
    let size = metrics.title_height;
    if y < f || f + size < y {
        return FrameStatus::None;
    }
    if x < width - (3 * size + f) {
        FrameStatus::None
    } else if x < width - (2 * size + f) {
        FrameStatus::Minimize
    } else if x < width - (size + f) {
        FrameStatus::Maximize
    } else {
        FrameStatus::Close
    }
}

/// Round `n` down to a multiple of `inc`.
///
/// An increment below one is treated as one.
pub const fn floor_to_increment(n: i32, inc: i32) -> i32 {
    let inc = if inc < 1 { 1 } else { inc };
    n.div_euclid(inc) * inc
}

/// Round `n` toward zero to a multiple of `inc`.
///
/// Top and left edges size with this: growth rounds down as with
/// [`floor_to_increment`], and a shrink only takes whole increments the
/// pointer has already passed, so the dragged edge never overtakes it.
pub const fn truncate_to_increment(n: i32, inc: i32) -> i32 {
    let inc = if inc < 1 { 1 } else { inc };
    n / inc * inc
}

/// Pointer and frame size captured when a grasp begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Frame-local pointer position at grasp time.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Pointer position reported with a motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPosition {
    /// Relative to the window that received the event.
    pub x: i32,
    pub y: i32,
    pub root_x: i32,
    pub root_y: i32,
}

/// Top-left corner that keeps the grasped point under the pointer.
pub const fn move_origin(anchor: Anchor, pointer: PointerPosition, border_size: i32) -> (i32, i32) {
    (
        pointer.root_x - anchor.x - border_size,
        pointer.root_y - anchor.y - border_size,
    )
}

/// New frame rectangle for a resize drag.
///
/// Bottom and right edges extend the anchor size by the pointer delta since
/// the grasp, rounded down to the client's resize increments. Top and left
/// edges extend the current size by how far the dragged edge moved past the
/// current origin, rounded toward zero, keeping the opposite edge fixed.
pub fn resize_geometry(
    edges: ResizeEdges,
    current: Geometry,
    anchor: Anchor,
    pointer: PointerPosition,
    increments: (i32, i32),
    metrics: &Metrics,
) -> Geometry {
    let (new_x, new_y) = move_origin(anchor, pointer, metrics.border_size);
    let (width_inc, height_inc) = increments;
    let (min_width, min_height) = metrics.min_frame_size();
    let mut next = current;

    if edges.contains(ResizeEdges::RIGHT) {
        let inc = floor_to_increment(pointer.x - anchor.x, width_inc);
        next.width = (anchor.width as i32 + inc).max(min_width) as u32;
    } else if edges.contains(ResizeEdges::LEFT) {
        let inc = truncate_to_increment(current.x - new_x, width_inc);
        let width = (current.width as i32 + inc).max(min_width);
        next.width = width as u32;
        next.x = current.right() - width;
    }

    if edges.contains(ResizeEdges::BOTTOM) {
        let inc = floor_to_increment(pointer.y - anchor.y, height_inc);
        next.height = (anchor.height as i32 + inc).max(min_height) as u32;
    } else if edges.contains(ResizeEdges::TOP) {
        let inc = truncate_to_increment(current.y - new_y, height_inc);
        let height = (current.height as i32 + inc).max(min_height);
        next.height = height as u32;
        next.y = current.bottom() - height;
    }

    next
}
