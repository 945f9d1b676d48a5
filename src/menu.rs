//! Main and pause menus
//!
//! Both list the registered feeders followed by a sound row. Up and Down
//! wrap around; Enter either switches feeder, toggles sound (the menu stays
//! open) or just closes the menu.

use crate::app::Key;
use crate::consts::VERSION;

pub const TITLE: &str = "Welcome to Feeder.";
pub const SUBTITLE: &str = "Select a feeder scene with the arrow keys, then press enter.";
pub const HELP: [&str; 2] = [
    "Press enter repeatedly to refill the feeder.",
    "Press escape to access/exit this menu.",
];
pub const UPDATE_NOTICE: &str = "New version with more birds/feeders available at feeder.com!";
pub const CREDIT: &str = "Developed by David Bennett. Art by Camila Canuto.";
const RULE: &str = "------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// Shown at startup; the feeder does not run behind it
    Main,
    /// Opened with Escape over the running feeder
    Pause,
}

/// What the app should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    None,
    Close,
    /// Switch to this feeder and close
    SwitchFeeder(String),
    /// Flip mute; the menu stays open
    ToggleSound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Heading,
    Rule,
    Note,
    Option,
    Selected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLine {
    pub text: String,
    pub style: LineStyle,
}

impl MenuLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Menu {
    kind: MenuKind,
    feeders: Vec<String>,
    selected: usize,
    open: bool,
    just_opened: bool,
}

impl Menu {
    /// A closed menu with the current feeder highlighted
    pub fn new(kind: MenuKind, feeders: Vec<String>, current: &str) -> Self {
        let selected = feeders.iter().position(|f| f == current).unwrap_or(0);
        Self {
            kind,
            feeders,
            selected,
            open: false,
            just_opened: false,
        }
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Index of the sound row
    pub fn sound_row(&self) -> usize {
        self.feeders.len()
    }

    pub fn open(&mut self) {
        self.open = true;
        self.just_opened = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Call once per frame before handling keys
    pub fn begin_frame(&mut self) {
        self.just_opened = false;
    }

    pub fn handle_key(&mut self, key: Key, current: &str) -> MenuAction {
        if !self.open {
            return MenuAction::None;
        }
        let last = self.sound_row();
        match key {
            Key::Down => {
                self.selected = if self.selected >= last { 0 } else { self.selected + 1 };
                MenuAction::None
            }
            Key::Up => {
                self.selected = if self.selected == 0 { last } else { self.selected - 1 };
                MenuAction::None
            }
            Key::Enter => {
                if self.selected == last {
                    return MenuAction::ToggleSound;
                }
                self.open = false;
                match self.feeders.get(self.selected) {
                    Some(name) if name != current => MenuAction::SwitchFeeder(name.clone()),
                    _ => MenuAction::Close,
                }
            }
            Key::Escape => {
                // The press that opened the pause menu must not close it again
                if self.kind == MenuKind::Pause && self.just_opened {
                    return MenuAction::None;
                }
                self.open = false;
                MenuAction::Close
            }
        }
    }

    /// Text to draw, top to bottom
    pub fn lines(&self, current: &str, sound_disabled: bool, update_available: bool) -> Vec<MenuLine> {
        let row_style = |i: usize| {
            if i == self.selected {
                LineStyle::Selected
            } else {
                LineStyle::Option
            }
        };

        let mut lines = vec![
            MenuLine::new(TITLE, LineStyle::Heading),
            MenuLine::new(RULE, LineStyle::Rule),
            MenuLine::new(SUBTITLE, LineStyle::Note),
        ];
        for (i, name) in self.feeders.iter().enumerate() {
            let text = if name == current {
                format!("{name} (current)")
            } else {
                name.clone()
            };
            lines.push(MenuLine::new(text, row_style(i)));
        }
        lines.push(MenuLine::new(RULE, LineStyle::Rule));
        let sound = if sound_disabled { "Unmute" } else { "Mute" };
        lines.push(MenuLine::new(sound, row_style(self.sound_row())));
        lines.push(MenuLine::new(RULE, LineStyle::Rule));
        lines.extend(HELP.iter().map(|text| MenuLine::new(*text, LineStyle::Note)));

        if self.kind == MenuKind::Main {
            if update_available {
                lines.push(MenuLine::new(UPDATE_NOTICE, LineStyle::Note));
            }
            lines.push(MenuLine::new(RULE, LineStyle::Rule));
            lines.push(MenuLine::new(format!("Version: {VERSION}"), LineStyle::Note));
            lines.push(MenuLine::new(CREDIT, LineStyle::Note));
        } else {
            lines.push(MenuLine::new(RULE, LineStyle::Rule));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(kind: MenuKind) -> Menu {
        let mut menu = Menu::new(
            kind,
            vec!["Backyard".into(), "Porch".into()],
            "Backyard",
        );
        menu.open();
        menu
    }

    #[test]
    fn test_navigation_wraps() {
        let mut m = menu(MenuKind::Main);
        assert_eq!(m.selected(), 0);
        m.handle_key(Key::Up, "Backyard");
        assert_eq!(m.selected(), m.sound_row());
        m.handle_key(Key::Down, "Backyard");
        assert_eq!(m.selected(), 0);
        m.handle_key(Key::Down, "Backyard");
        m.handle_key(Key::Down, "Backyard");
        assert_eq!(m.selected(), 2);
    }

    #[test]
    fn test_enter_on_sound_row_keeps_menu_open() {
        let mut m = menu(MenuKind::Pause);
        m.handle_key(Key::Up, "Backyard");
        assert_eq!(m.handle_key(Key::Enter, "Backyard"), MenuAction::ToggleSound);
        assert!(m.is_open());
    }

    #[test]
    fn test_enter_on_other_feeder_switches() {
        let mut m = menu(MenuKind::Main);
        m.handle_key(Key::Down, "Backyard");
        assert_eq!(
            m.handle_key(Key::Enter, "Backyard"),
            MenuAction::SwitchFeeder("Porch".into())
        );
        assert!(!m.is_open());
    }

    #[test]
    fn test_enter_on_current_feeder_just_closes() {
        let mut m = menu(MenuKind::Main);
        assert_eq!(m.handle_key(Key::Enter, "Backyard"), MenuAction::Close);
        assert!(!m.is_open());
    }

    #[test]
    fn test_pause_menu_ignores_opening_escape() {
        let mut m = menu(MenuKind::Pause);
        assert_eq!(m.handle_key(Key::Escape, "Backyard"), MenuAction::None);
        assert!(m.is_open());
        m.begin_frame();
        assert_eq!(m.handle_key(Key::Escape, "Backyard"), MenuAction::Close);
        assert!(!m.is_open());
    }

    #[test]
    fn test_lines_mark_current_and_selection() {
        let mut m = menu(MenuKind::Main);
        m.handle_key(Key::Down, "Backyard");
        let lines = m.lines("Backyard", true, true);
        assert_eq!(lines[0].text, TITLE);
        assert!(lines.contains(&MenuLine::new("Backyard (current)", LineStyle::Option)));
        assert!(lines.contains(&MenuLine::new("Porch", LineStyle::Selected)));
        assert!(lines.contains(&MenuLine::new("Unmute", LineStyle::Option)));
        assert!(lines.iter().any(|l| l.text == UPDATE_NOTICE));
        assert!(lines.iter().any(|l| l.text == CREDIT));
    }

    #[test]
    fn test_pause_menu_has_no_credits_or_notice() {
        let m = menu(MenuKind::Pause);
        let lines = m.lines("Backyard", false, true);
        assert!(lines.contains(&MenuLine::new("Mute", LineStyle::Option)));
        assert!(!lines.iter().any(|l| l.text == UPDATE_NOTICE || l.text == CREDIT));
    }

    #[test]
    fn test_closed_menu_ignores_keys() {
        let mut m = Menu::new(MenuKind::Pause, vec!["Backyard".into()], "Backyard");
        assert_eq!(m.handle_key(Key::Enter, "Backyard"), MenuAction::None);
        assert_eq!(m.selected(), 0);
    }
}
