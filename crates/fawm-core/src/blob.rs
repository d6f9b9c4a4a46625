//! Relocatable configuration blob.
//!
//! The compiler flattens a [`Config`] into one contiguous buffer in which every
//! reference is a byte offset from the start of the buffer, so the bytes stay
//! meaningful after crossing a pipe into another process.
//!
//! Layout, all words little-endian `u64`:
//!
//! ```text
//! config header   [menu_offset]                          0 = no menu
//! menu            [items_offset][items_num]
//! items_num x     [kind][caption_offset][command_offset] 0 offsets unless exec
//! strings         caption\0 command\0 ...                each padded to a word
//! ```
//!
//! On the wire the blob is preceded by its length as one more `u64`.

use std::io::{self, Read, Write};

use crate::menu::{Config, Menu, MenuItem, MenuItemKind, EXIT_CAPTION, RELOAD_CAPTION};

/// Alignment unit and size of every header field.
pub const WORD: usize = 8;
const CONFIG_SIZE: usize = WORD;
const MENU_SIZE: usize = 2 * WORD;
const ITEM_SIZE: usize = 3 * WORD;

/// Largest blob accepted from the wire.
pub const MAX_BLOB_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("string contains a NUL byte: {0:?}")]
    InteriorNul(String),

    #[error("declared blob size {0} is too large")]
    TooLarge(u64),

    #[error("malformed blob at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },
}

/// Round `size` up to a multiple of [`WORD`].
pub const fn align(size: usize) -> usize {
    size.div_ceil(WORD) * WORD
}

const fn string_size(s: &str) -> usize {
    align(s.len() + 1)
}

fn item_size(item: &MenuItem) -> usize {
    match item {
        MenuItem::Exec { caption, command } => {
            ITEM_SIZE + string_size(caption) + string_size(command)
        }
        MenuItem::Exit | MenuItem::Reload => ITEM_SIZE,
    }
}

fn menu_size(menu: &Menu) -> usize {
    MENU_SIZE + menu.items.iter().map(item_size).sum::<usize>()
}

/// Exact number of bytes [`serialize`] will produce for `config`.
pub fn compute_size(config: &Config) -> usize {
    CONFIG_SIZE + config.menu.as_ref().map_or(0, menu_size)
}

fn check_strings(config: &Config) -> Result<(), BlobError> {
    let strings = config
        .menu
        .iter()
        .flat_map(|m| m.items.iter())
        .filter_map(|item| match item {
            MenuItem::Exec { caption, command } => Some([caption, command]),
            _ => None,
        })
        .flatten();
    for s in strings {
        if s.contains('\0') {
            return Err(BlobError::InteriorNul(s.clone()));
        }
    }
    Ok(())
}

fn put_word(buf: &mut [u8], at: usize, value: usize) {
    buf[at..at + WORD].copy_from_slice(&(value as u64).to_le_bytes());
}

/// Copy `s` and its terminator at `*pos`, advance past the padding, and
/// return where it was written.
fn put_str(buf: &mut [u8], pos: &mut usize, s: &str) -> usize {
    let at = *pos;
    buf[at..at + s.len()].copy_from_slice(s.as_bytes());
    buf[at + s.len()] = 0;
    *pos += string_size(s);
    at
}

/// Flatten `config` into a relocatable blob.
pub fn serialize(config: &Config) -> Result<Vec<u8>, BlobError> {
    check_strings(config)?;
    let size = compute_size(config);
    let mut buf = vec![0u8; size];
    let mut pos = CONFIG_SIZE;

    if let Some(menu) = &config.menu {
        let menu_at = pos;
        put_word(&mut buf, 0, menu_at);
        pos += MENU_SIZE;

        let items_at = pos;
        put_word(&mut buf, menu_at, items_at);
        put_word(&mut buf, menu_at + WORD, menu.items.len());
        pos += ITEM_SIZE * menu.items.len();

        for (i, item) in menu.items.iter().enumerate() {
            let at = items_at + i * ITEM_SIZE;
            put_word(&mut buf, at, item.kind() as usize);
            if let MenuItem::Exec { caption, command } = item {
                let caption_at = put_str(&mut buf, &mut pos, caption);
                put_word(&mut buf, at + WORD, caption_at);
                let command_at = put_str(&mut buf, &mut pos, command);
                put_word(&mut buf, at + 2 * WORD, command_at);
            }
        }
    }

    debug_assert_eq!(pos, size, "computed size disagrees with bytes written");
    Ok(buf)
}

/// A validated blob, read through accessors that resolve offsets on demand.
///
/// Construction walks the whole tree once and rejects anything that does not
/// match the layout exactly, so accessors never see a dangling offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlob {
    bytes: Vec<u8>,
}

/// Borrowed view of the menu inside a [`ConfigBlob`].
#[derive(Debug, Clone, Copy)]
pub struct MenuView<'a> {
    blob: &'a ConfigBlob,
    items_offset: usize,
    len: usize,
}

/// Borrowed view of one menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemView<'a> {
    Exec { caption: &'a str, command: &'a str },
    Exit,
    Reload,
}

impl MenuItemView<'_> {
    pub fn caption(&self) -> &str {
        match self {
            Self::Exec { caption, .. } => caption,
            Self::Exit => EXIT_CAPTION,
            Self::Reload => RELOAD_CAPTION,
        }
    }

    pub fn to_owned_item(&self) -> MenuItem {
        match *self {
            Self::Exec { caption, command } => MenuItem::exec(caption, command),
            Self::Exit => MenuItem::Exit,
            Self::Reload => MenuItem::Reload,
        }
    }
}

struct Validator<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl Validator<'_> {
    const fn malformed(&self, offset: usize, reason: &'static str) -> BlobError {
        BlobError::Malformed { offset, reason }
    }

    fn word(&self, at: usize) -> Result<usize, BlobError> {
        read_word(self.bytes, at)
            .ok_or_else(|| self.malformed(at, "word past end of blob"))
    }

    /// The string at `offset` must start at the cursor; it is skipped.
    fn string(&mut self, offset: usize) -> Result<(), BlobError> {
        if offset != self.cursor {
            return Err(self.malformed(offset, "string offset out of sequence"));
        }
        let bytes = self.bytes;
        let tail = bytes.get(offset..).unwrap_or_default();
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| self.malformed(offset, "unterminated string"))?;
        std::str::from_utf8(&tail[..len])
            .map_err(|_| self.malformed(offset, "string is not UTF-8"))?;
        let next = offset + align(len + 1);
        if next > bytes.len() {
            return Err(self.malformed(offset, "string padding past end of blob"));
        }
        self.cursor = next;
        Ok(())
    }

    fn validate(mut self) -> Result<(), BlobError> {
        let menu_offset = self.word(0)?;
        self.cursor = CONFIG_SIZE;
        if menu_offset != 0 {
            if menu_offset != CONFIG_SIZE {
                return Err(self.malformed(0, "menu offset out of sequence"));
            }
            let items_offset = self.word(menu_offset)?;
            let items_num = self.word(menu_offset + WORD)?;
            self.cursor += MENU_SIZE;
            if items_offset != self.cursor {
                return Err(self.malformed(menu_offset, "items offset out of sequence"));
            }
            let items_end = items_num
                .checked_mul(ITEM_SIZE)
                .and_then(|n| n.checked_add(items_offset))
                .filter(|&end| end <= self.bytes.len())
                .ok_or_else(|| self.malformed(menu_offset + WORD, "item count past end of blob"))?;
            self.cursor = items_end;

            for i in 0..items_num {
                let at = items_offset + i * ITEM_SIZE;
                let kind = MenuItemKind::try_from(self.word(at)? as u64)
                    .map_err(|_| self.malformed(at, "unknown item kind"))?;
                let caption = self.word(at + WORD)?;
                let command = self.word(at + 2 * WORD)?;
                match kind {
                    MenuItemKind::Exec => {
                        self.string(caption)?;
                        self.string(command)?;
                    }
                    MenuItemKind::Exit | MenuItemKind::Reload => {
                        if caption != 0 || command != 0 {
                            return Err(self.malformed(at, "string offset on non-exec item"));
                        }
                    }
                }
            }
        }
        if self.cursor != self.bytes.len() {
            return Err(self.malformed(self.cursor, "blob length disagrees with contents"));
        }
        Ok(())
    }
}

fn read_word(bytes: &[u8], at: usize) -> Option<usize> {
    let raw: [u8; WORD] = bytes.get(at..at.checked_add(WORD)?)?.try_into().ok()?;
    usize::try_from(u64::from_le_bytes(raw)).ok()
}

impl ConfigBlob {
    /// Validate raw bytes. This is the fix-up pass: after it succeeds every
    /// offset is known to resolve inside the buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, BlobError> {
        Validator {
            bytes: &bytes,
            cursor: 0,
        }
        .validate()?;
        Ok(Self { bytes })
    }

    /// Serialize and validate in one step.
    pub fn from_config(config: &Config) -> Result<Self, BlobError> {
        Self::from_bytes(serialize(config)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn word(&self, at: usize) -> Option<usize> {
        read_word(&self.bytes, at)
    }

    fn str_at(&self, offset: usize) -> Option<&str> {
        let tail = self.bytes.get(offset..)?;
        let len = tail.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&tail[..len]).ok()
    }

    pub fn menu(&self) -> Option<MenuView<'_>> {
        let offset = self.word(0).filter(|&o| o != 0)?;
        Some(MenuView {
            blob: self,
            items_offset: self.word(offset)?,
            len: self.word(offset + WORD)?,
        })
    }

    /// Number of menu items; zero without a menu.
    pub fn item_count(&self) -> usize {
        self.menu().map_or(0, |m| m.len())
    }

    pub fn item(&self, index: usize) -> Option<MenuItemView<'_>> {
        self.menu()?.item(index)
    }

    /// Rebuild the owned tree.
    pub fn to_config(&self) -> Config {
        Config {
            menu: self.menu().map(|m| Menu {
                items: m.items().map(|item| item.to_owned_item()).collect(),
            }),
        }
    }
}

impl<'a> MenuView<'a> {
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn item(&self, index: usize) -> Option<MenuItemView<'a>> {
        if index >= self.len {
            return None;
        }
        let blob = self.blob;
        let at = self.items_offset + index * ITEM_SIZE;
        let kind = MenuItemKind::try_from(blob.word(at)? as u64).ok()?;
        Some(match kind {
            MenuItemKind::Exec => MenuItemView::Exec {
                caption: blob.str_at(blob.word(at + WORD)?)?,
                command: blob.str_at(blob.word(at + 2 * WORD)?)?,
            },
            MenuItemKind::Exit => MenuItemView::Exit,
            MenuItemKind::Reload => MenuItemView::Reload,
        })
    }

    pub fn items(&self) -> impl Iterator<Item = MenuItemView<'a>> + 'a {
        let view = *self;
        (0..view.len).filter_map(move |i| view.item(i))
    }
}

// ── Wire format ──────────────────────────────────────────────────────

/// Write `bytes` preceded by its length.
pub fn write_blob<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(&(bytes.len() as u64).to_le_bytes())?;
    writer.write_all(bytes)?;
    writer.flush()
}

/// Fill `buf`, retrying partial and interrupted reads. Returns how many bytes
/// arrived before end of stream.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read a length-prefixed blob and validate it.
///
/// Fewer bytes than declared is a [`BlobError::ShortRead`]; nothing partial
/// is ever returned.
pub fn read_blob<R: Read>(reader: &mut R) -> Result<ConfigBlob, BlobError> {
    let mut prefix = [0u8; WORD];
    let got = read_full(reader, &mut prefix)?;
    if got < WORD {
        return Err(BlobError::ShortRead {
            expected: WORD,
            actual: got,
        });
    }
    let declared = u64::from_le_bytes(prefix);
    if declared > MAX_BLOB_SIZE {
        return Err(BlobError::TooLarge(declared));
    }
    let size = usize::try_from(declared).map_err(|_| BlobError::TooLarge(declared))?;
    let mut bytes = vec![0u8; size];
    let got = read_full(reader, &mut bytes)?;
    if got < size {
        return Err(BlobError::ShortRead {
            expected: size,
            actual: got,
        });
    }
    ConfigBlob::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Config {
        Config {
            menu: Some(Menu {
                items: vec![
                    MenuItem::exec("Firefox", "firefox"),
                    MenuItem::exec("mlterm", "mlterm"),
                    MenuItem::Exit,
                ],
            }),
        }
    }

    #[test]
    fn test_align() {
        assert_eq!(align(1), 8);
        assert_eq!(align(8), 8);
        assert_eq!(align(9), 16);
    }

    #[test]
    fn test_sample_layout() {
        let bytes = serialize(&sample()).unwrap();
        // header + menu + 3 items + "Firefox\0" + "firefox\0" + 2 x "mlterm\0"
        assert_eq!(bytes.len(), 8 + 16 + 72 + 8 + 8 + 8 + 8);
        assert_eq!(read_word(&bytes, 0), Some(8));
        assert_eq!(read_word(&bytes, 8), Some(24));
        assert_eq!(read_word(&bytes, 16), Some(3));
        assert_eq!(read_word(&bytes, 24 + 8), Some(96));
        assert_eq!(&bytes[96..104], b"Firefox\0");
    }

    #[test]
    fn test_round_trip_through_accessors() {
        let blob = ConfigBlob::from_config(&sample()).unwrap();
        assert_eq!(blob.item_count(), 3);
        assert_eq!(
            blob.item(0),
            Some(MenuItemView::Exec {
                caption: "Firefox",
                command: "firefox"
            })
        );
        assert_eq!(blob.item(2), Some(MenuItemView::Exit));
        assert_eq!(blob.item(3), None);
        assert_eq!(blob.to_config(), sample());
    }

    #[test]
    fn test_no_menu_is_one_word() {
        let bytes = serialize(&Config::default()).unwrap();
        assert_eq!(bytes, vec![0u8; 8]);
        let blob = ConfigBlob::from_bytes(bytes).unwrap();
        assert!(blob.menu().is_none());
        assert_eq!(blob.item_count(), 0);
    }

    #[test]
    fn test_empty_menu() {
        let config = Config {
            menu: Some(Menu::default()),
        };
        let blob = ConfigBlob::from_config(&config).unwrap();
        assert_eq!(blob.len(), 24);
        assert!(blob.menu().unwrap().is_empty());
        assert_eq!(blob.to_config(), config);
    }

    #[test]
    fn test_interior_nul_rejected() {
        let config = Config {
            menu: Some(Menu {
                items: vec![MenuItem::exec("a\0b", "c")],
            }),
        };
        assert!(matches!(serialize(&config), Err(BlobError::InteriorNul(_))));
    }

    #[test]
    fn test_wire_round_trip() {
        let bytes = serialize(&sample()).unwrap();
        let mut wire = Vec::new();
        write_blob(&mut wire, &bytes).unwrap();
        assert_eq!(wire.len(), bytes.len() + 8);
        let blob = read_blob(&mut wire.as_slice()).unwrap();
        assert_eq!(blob.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_short_read_on_wire() {
        let bytes = serialize(&sample()).unwrap();
        let mut wire = Vec::new();
        write_blob(&mut wire, &bytes).unwrap();
        wire.truncate(wire.len() - 1);
        let err = read_blob(&mut wire.as_slice()).unwrap_err();
        assert!(matches!(err, BlobError::ShortRead { .. }), "{err}");

        let err = read_blob(&mut &wire[..3]).unwrap_err();
        assert!(matches!(
            err,
            BlobError::ShortRead {
                expected: 8,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let wire = u64::MAX.to_le_bytes();
        assert!(matches!(
            read_blob(&mut wire.as_slice()),
            Err(BlobError::TooLarge(_))
        ));
    }

    #[test]
    fn test_corrupt_offset_rejected() {
        let mut bytes = serialize(&sample()).unwrap();
        bytes[24 + 8] = 200;
        assert!(matches!(
            ConfigBlob::from_bytes(bytes),
            Err(BlobError::Malformed { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut bytes = serialize(&sample()).unwrap();
        bytes[24] = 9;
        assert!(ConfigBlob::from_bytes(bytes).is_err());
    }
}
