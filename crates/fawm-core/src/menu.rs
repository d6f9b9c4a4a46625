//! Owned configuration tree built by the compiler.

/// Caption shown for an `exit` item.
pub const EXIT_CAPTION: &str = "exit";
/// Caption shown for a `reload` item.
pub const RELOAD_CAPTION: &str = "reload";

/// A parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub menu: Option<Menu>,
}

/// The popup launcher, items in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    /// Run `command` through `/bin/sh -c`.
    Exec { caption: String, command: String },
    /// Leave the main loop.
    Exit,
    /// Recompile the configuration and swap the menu.
    Reload,
}

/// Type tag stored in a serialized item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum MenuItemKind {
    Exec = 0,
    Exit = 1,
    Reload = 2,
}

impl TryFrom<u64> for MenuItemKind {
    type Error = u64;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Exec),
            1 => Ok(Self::Exit),
            2 => Ok(Self::Reload),
            other => Err(other),
        }
    }
}

impl MenuItem {
    pub fn exec(caption: impl Into<String>, command: impl Into<String>) -> Self {
        Self::Exec {
            caption: caption.into(),
            command: command.into(),
        }
    }

    pub const fn kind(&self) -> MenuItemKind {
        match self {
            Self::Exec { .. } => MenuItemKind::Exec,
            Self::Exit => MenuItemKind::Exit,
            Self::Reload => MenuItemKind::Reload,
        }
    }

    pub fn caption(&self) -> &str {
        match self {
            Self::Exec { caption, .. } => caption,
            Self::Exit => EXIT_CAPTION,
            Self::Reload => RELOAD_CAPTION,
        }
    }
}

impl Config {
    /// Number of menu items; zero without a menu.
    pub fn item_count(&self) -> usize {
        self.menu.as_ref().map_or(0, |m| m.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captions() {
        assert_eq!(MenuItem::exec("Firefox", "firefox").caption(), "Firefox");
        assert_eq!(MenuItem::Exit.caption(), "exit");
        assert_eq!(MenuItem::Reload.caption(), "reload");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(MenuItemKind::try_from(1), Ok(MenuItemKind::Exit));
        assert_eq!(MenuItemKind::try_from(9), Err(9));
        assert_eq!(MenuItem::Reload.kind() as u64, 2);
    }

    #[test]
    fn test_item_count() {
        assert_eq!(Config::default().item_count(), 0);
        let config = Config {
            menu: Some(Menu {
                items: vec![MenuItem::Exit],
            }),
        };
        assert_eq!(config.item_count(), 1);
    }
}
