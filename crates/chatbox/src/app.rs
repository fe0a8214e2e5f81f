use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chatbox::core::Chat;
use chatbox::core::identity::UserIdentity;
use chatbox::core::keymap::{EnterAction, enter_action};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::AppEvent;

/// Lines moved by PageUp / PageDown.
const PAGE_LINES: u16 = 10;

pub struct App {
    chat: Chat,
    identity: UserIdentity,
    /// Cursor position in the draft, in chars.
    cursor: usize,
    /// First visible line of the message list.
    scroll: u16,
    stick_to_bottom: Arc<AtomicBool>,
    should_quit: bool,
}

impl App {
    pub fn new(mut chat: Chat, identity: UserIdentity) -> Self {
        let stick_to_bottom = Arc::new(AtomicBool::new(true));
        chat.subscribe({
            let stick_to_bottom = Arc::clone(&stick_to_bottom);
            move |_| stick_to_bottom.store(true, Ordering::Relaxed)
        });
        let cursor = chat.draft().chars().count();
        Self {
            chat,
            identity,
            cursor,
            scroll: 0,
            stick_to_bottom,
            should_quit: false,
        }
    }

    #[inline]
    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    #[inline]
    pub fn chat_mut(&mut self) -> &mut Chat {
        &mut self.chat
    }

    #[inline]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[inline]
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    #[inline]
    pub fn set_scroll(&mut self, scroll: u16) {
        self.scroll = scroll;
    }

    /// Returns `true` once after each conversation mutation, when the view
    /// should jump to the last message.
    #[inline]
    pub fn take_scroll_to_bottom(&self) -> bool {
        self.stick_to_bottom.swap(false, Ordering::Relaxed)
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Paste(text) => self.insert_str(&text.replace("\r\n", "\n")),
            AppEvent::Resize => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('l') if ctrl => self.clear(),
            KeyCode::Enter => {
                let modifier_held = key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
                match enter_action(modifier_held) {
                    EnterAction::Submit => {
                        let ticket = self.chat.submit();
                        debug!("submitted, placeholder: {}", ticket.placeholder());
                        self.cursor = 0;
                    }
                    EnterAction::InsertNewline => self.insert_str("\n"),
                }
            }
            KeyCode::Char(c) if !ctrl => {
                let mut buf = [0; 4];
                self.insert_str(c.encode_utf8(&mut buf));
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at_cursor();
                }
            }
            KeyCode::Delete => self.remove_at_cursor(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.draft_len());
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.draft_len(),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE_LINES),
            // Clamped to the content height while rendering.
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(PAGE_LINES),
            _ => {}
        }
    }

    /// Clears the conversation. Does nothing when it is already empty.
    fn clear(&mut self) {
        if self.chat.messages().is_empty() {
            return;
        }
        self.chat.clear();
        self.scroll = 0;
    }

    fn draft_len(&self) -> usize {
        self.chat.draft().chars().count()
    }

    fn insert_str(&mut self, text: &str) {
        let mut draft = self.chat.draft().to_owned();
        let at = byte_index(&draft, self.cursor);
        draft.insert_str(at, text);
        self.cursor += text.chars().count();
        self.chat.on_input_change(draft);
    }

    fn remove_at_cursor(&mut self) {
        if self.cursor >= self.draft_len() {
            return;
        }
        let mut draft = self.chat.draft().to_owned();
        draft.remove(byte_index(&draft, self.cursor));
        self.chat.on_input_change(draft);
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(index, _)| index)
}
