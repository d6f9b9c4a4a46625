//! Painting frames, the taskbar and the popup menu with core X fonts.

use fawm_core::appearance::{parse_hex_color, Appearance};
use fawm_core::blob::ConfigBlob;
use fawm_core::geometry::{CursorShape, Metrics};
use fawm_core::taskbar::{self, TaskbarEntry};
use fawm_core::{Frame, FrameStatus};
use tracing::warn;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Char2b, ConnectionExt, CreateGCAux, Cursor, Font, Gcontext, Rectangle, Screen, Segment, Window,
};

use crate::error::BackendError;

/// Font every X server provides.
const FALLBACK_FONT: &str = "fixed";
/// Longest string one `PolyText8` item carries.
const TEXT_ITEM_MAX: usize = 254;

/// Glyphs of the standard cursor font, in [`CursorShape::ALL`] order.
const CURSOR_GLYPHS: [u16; 9] = [
    132, // top_left_arrow
    138, // top_side
    136, // top_right_corner
    96,  // right_side
    14,  // bottom_right_corner
    16,  // bottom_side
    12,  // bottom_left_corner
    70,  // left_side
    134, // top_left_corner
];

/// Pixel values allocated from the appearance colors.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub black: u32,
    pub focused: u32,
    pub unfocused: u32,
}

impl Palette {
    pub fn allocate<C: Connection>(
        conn: &C,
        screen: &Screen,
        appearance: &Appearance,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            black: screen.black_pixel,
            focused: alloc_color(conn, screen, &appearance.focused_color)?,
            unfocused: alloc_color(conn, screen, &appearance.unfocused_color)?,
        })
    }
}

fn alloc_color<C: Connection>(conn: &C, screen: &Screen, hex: &str) -> Result<u32, BackendError> {
    let Some((r, g, b)) = parse_hex_color(hex) else {
        warn!("Invalid color {:?}, using white", hex);
        return Ok(screen.white_pixel);
    };
    let scale = |c: u8| u16::from(c) * 257;
    match conn
        .alloc_color(screen.default_colormap, scale(r), scale(g), scale(b))?
        .reply()
    {
        Ok(reply) => Ok(reply.pixel),
        Err(e) => {
            warn!("Cannot allocate color {}: {}", hex, e);
            Ok(screen.white_pixel)
        }
    }
}

/// One pointer shape per hit zone.
pub struct Cursors {
    shapes: [Cursor; 9],
}

impl Cursors {
    pub fn create<C: Connection>(conn: &C) -> Result<Self, BackendError> {
        let font = conn.generate_id()?;
        conn.open_font(font, b"cursor")?;
        let mut shapes = [0; 9];
        for (slot, glyph) in shapes.iter_mut().zip(CURSOR_GLYPHS) {
            let cursor = conn.generate_id()?;
            conn.create_glyph_cursor(
                cursor, font, font, glyph, glyph + 1, 0, 0, 0, 0xffff, 0xffff, 0xffff,
            )?;
            *slot = cursor;
        }
        conn.close_font(font)?;
        Ok(Self { shapes })
    }

    pub fn get(&self, shape: CursorShape) -> Cursor {
        let index = CursorShape::ALL
            .iter()
            .position(|s| *s == shape)
            .unwrap_or_default();
        self.shapes[index]
    }
}

/// Encode text for a core font: Latin-1, anything wider becomes `?`.
pub fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// `PolyText8` items for `bytes`, split at the per-item limit.
pub fn text_items(bytes: &[u8]) -> Vec<u8> {
    let mut items = Vec::with_capacity(bytes.len() + 2 * (bytes.len() / TEXT_ITEM_MAX + 1));
    for chunk in bytes.chunks(TEXT_ITEM_MAX) {
        items.push(u8::try_from(chunk.len()).unwrap_or(u8::MAX));
        items.push(0);
        items.extend_from_slice(chunk);
    }
    items
}

/// An opened font and the graphics contexts drawn with it.
pub struct Painter {
    font: Font,
    pub ascent: i32,
    pub descent: i32,
    line_gc: Gcontext,
    focused_gc: Gcontext,
    unfocused_gc: Gcontext,
    text_gc: Gcontext,
}

impl Painter {
    pub fn new<C: Connection>(
        conn: &C,
        screen: &Screen,
        font_name: &str,
        palette: Palette,
    ) -> Result<Self, BackendError> {
        let font = open_font(conn, font_name)?;
        let info = conn.query_font(font)?.reply()?;
        let root = screen.root;

        let gc = |foreground: u32| -> Result<Gcontext, BackendError> {
            let id = conn.generate_id()?;
            let aux = CreateGCAux::new()
                .foreground(foreground)
                .background(palette.unfocused)
                .font(font);
            conn.create_gc(id, root, &aux)?;
            Ok(id)
        };

        Ok(Self {
            font,
            ascent: i32::from(info.font_ascent),
            descent: i32::from(info.font_descent),
            line_gc: gc(palette.black)?,
            focused_gc: gc(palette.focused)?,
            unfocused_gc: gc(palette.unfocused)?,
            text_gc: gc(palette.black)?,
        })
    }

    pub const fn font_height(&self) -> i32 {
        self.ascent + self.descent
    }

    pub fn text_width<C: Connection>(&self, conn: &C, text: &str) -> Result<i32, BackendError> {
        let chars: Vec<Char2b> = latin1(text)
            .into_iter()
            .map(|b| Char2b { byte1: 0, byte2: b })
            .collect();
        if chars.is_empty() {
            return Ok(0);
        }
        Ok(conn.query_text_extents(self.font, &chars)?.reply()?.overall_width)
    }

    /// Width of the popup menu: the widest caption plus both margins.
    pub fn popup_width<C: Connection>(
        &self,
        conn: &C,
        menu: &ConfigBlob,
        margin: i32,
    ) -> Result<i32, BackendError> {
        let mut widest = 0;
        if let Some(menu) = menu.menu() {
            for item in menu.items() {
                widest = widest.max(self.text_width(conn, item.caption())?);
            }
        }
        Ok(2 * margin + widest)
    }

    fn text<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        x: i32,
        y: i32,
        text: &str,
    ) -> Result<(), BackendError> {
        let bytes = latin1(text);
        if bytes.is_empty() {
            return Ok(());
        }
        conn.poly_text8(window, self.text_gc, x as i16, y as i16, &text_items(&bytes))?;
        Ok(())
    }

    fn fill<C: Connection>(
        conn: &C,
        window: Window,
        gc: Gcontext,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<(), BackendError> {
        conn.poly_fill_rectangle(window, gc, &[rect(x, y, width, height)])?;
        Ok(())
    }

    /// Title, the three control boxes and the corner marks.
    pub fn draw_frame<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        frame: &Frame,
        metrics: &Metrics,
    ) -> Result<(), BackendError> {
        let f = metrics.frame_size;
        self.text(conn, window, f, f + self.ascent, &frame.title)?;

        let width = frame.geometry.width as i32;
        let height = frame.geometry.height as i32;
        let size = metrics.title_height;
        let boxes = [
            (1, FrameStatus::Close),
            (2, FrameStatus::Maximize),
            (3, FrameStatus::Minimize),
        ];
        for (n, status) in boxes {
            let x = width - f - n * size;
            let gc = if frame.status == status {
                self.focused_gc
            } else {
                self.unfocused_gc
            };
            Self::fill(conn, window, gc, x, f, size, size)?;
            conn.poly_rectangle(window, self.line_gc, &[rect(x, f, size, size)])?;
        }

        conn.poly_segment(window, self.line_gc, &corner_marks(metrics, width, height))?;
        Ok(())
    }

    /// Clock at the right, window list in between, menu button zone at left.
    pub fn draw_taskbar<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        entries: &[TaskbarEntry],
        titles: &[&str],
        clock: &str,
        metrics: &Metrics,
    ) -> Result<(), BackendError> {
        let padding = metrics.padding;
        let height = metrics.taskbar_height();
        let y = padding + self.ascent;

        let clock_x = metrics.screen_width - self.text_width(conn, clock)? - padding;
        self.text(conn, window, clock_x, y, clock)?;

        for (entry, title) in entries.iter().zip(titles) {
            if entry.focused {
                Self::fill(conn, window, self.focused_gc, entry.x, 0, entry.width, height)?;
            }
            let right = entry.x + entry.width;
            conn.poly_segment(
                window,
                self.line_gc,
                &[seg(entry.x, 0, entry.x, height), seg(right, 0, right, height)],
            )?;
            self.text(conn, window, entry.x + padding, y, title)?;
        }
        Ok(())
    }

    /// One caption per row, the selected row filled.
    pub fn draw_popup_menu<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        menu: &ConfigBlob,
        selected: Option<usize>,
        metrics: &Metrics,
    ) -> Result<(), BackendError> {
        let row = self.font_height();
        if let Some(index) = selected {
            let y = row * index as i32;
            Self::fill(conn, window, self.focused_gc, 0, y, metrics.popup_width, row)?;
        }
        let Some(menu) = menu.menu() else {
            return Ok(());
        };
        for (i, item) in menu.items().enumerate() {
            let baseline = row * (i as i32 + 1) - self.descent;
            self.text(conn, window, metrics.popup_margin, baseline, item.caption())?;
        }
        Ok(())
    }

    /// Clock text for the taskbar, in local time.
    pub fn clock_text() -> String {
        taskbar::format_clock(&chrono::Local::now())
    }
}

fn open_font<C: Connection>(conn: &C, name: &str) -> Result<Font, BackendError> {
    for candidate in [name, FALLBACK_FONT] {
        let font = conn.generate_id()?;
        match conn.open_font(font, candidate.as_bytes())?.check() {
            Ok(()) => return Ok(font),
            Err(e) => warn!("Cannot open font {:?}: {}", candidate, e),
        }
    }
    Err(BackendError::Font(name.to_string()))
}

fn rect(x: i32, y: i32, width: i32, height: i32) -> Rectangle {
    Rectangle {
        x: x as i16,
        y: y as i16,
        width: width.max(0) as u16,
        height: height.max(0) as u16,
    }
}

const fn seg(x1: i32, y1: i32, x2: i32, y2: i32) -> Segment {
    Segment {
        x1: x1 as i16,
        y1: y1 as i16,
        x2: x2 as i16,
        y2: y2 as i16,
    }
}

/// Short lines marking where each corner handle ends.
pub fn corner_marks(metrics: &Metrics, width: i32, height: i32) -> [Segment; 8] {
    let f = metrics.frame_size;
    let c = metrics.resizable_corner_size;
    let east_x1 = width - c;
    let east_x2 = width - f;
    let south_y1 = height - c;
    let south_y2 = height - f;
    [
        seg(0, c, f, c),
        seg(c, 0, c, f),
        seg(east_x1, 0, east_x1, f),
        seg(east_x2, c, width, c),
        seg(east_x2, south_y1, width, south_y1),
        seg(east_x1, south_y2, east_x1, height),
        seg(c, south_y2, c, height),
        seg(0, south_y1, f, south_y1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_latin1_replaces_wide_chars() {
        assert_eq!(latin1("caf\u{e9} \u{65e5}"), b"caf\xe9 ?".to_vec());
    }

    #[test]
    fn test_text_items_split_long_strings() {
        assert_eq!(text_items(b"ab"), vec![2, 0, b'a', b'b']);
        let long = vec![b'x'; 300];
        let items = text_items(&long);
        assert_eq!(items.len(), 300 + 4);
        assert_eq!(items[0], 254);
        assert_eq!(items[256], 46);
    }

    #[test]
    fn test_text_items_length_byte_matches_chunk() {
        assert!(text_items(b"").is_empty());
        let exact = vec![b'y'; TEXT_ITEM_MAX];
        assert_eq!(text_items(&exact)[0] as usize, TEXT_ITEM_MAX);
        let items = text_items(&vec![b'z'; 2 * TEXT_ITEM_MAX + 1]);
        let lengths: Vec<u8> = [0, 256, 512].iter().map(|&i| items[i]).collect();
        assert_eq!(lengths, vec![254, 254, 1]);
        assert_eq!(items.len(), 2 * TEXT_ITEM_MAX + 1 + 6);
    }

    #[test]
    fn test_corner_marks_stay_inside_frame() {
        let m = Metrics::default();
        for s in corner_marks(&m, 200, 150) {
            for (x, y) in [(s.x1, s.y1), (s.x2, s.y2)] {
                assert!((0..=200).contains(&x) && (0..=150).contains(&y), "{s:?}");
            }
        }
    }

    #[test]
    fn test_cursor_glyph_per_shape() {
        assert_eq!(CURSOR_GLYPHS.len(), CursorShape::ALL.len());
    }
}
