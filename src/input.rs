//! Input events and the engine's input queue.
//!
//! Window callbacks never touch engine state. They translate raw winit
//! events into [`InputEvent`]s with an [`InputTranslator`] and push them onto
//! an [`InputQueue`]; the simulation drains the queue at the start of each
//! tick.
//!
//! ```ignore
//! if let Some(event) = translator.translate(&window_event) {
//!     sim.push_input(event);
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Keyboard keys the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    // Arrows
    Up,
    Down,
    Left,
    Right,

    // Common keys
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Letter or digit, lowercase.
    Character(char),

    // Other
    Other(u32),
}

impl KeyCode {
    /// Arrow keys steer the attractor scene.
    pub fn is_arrow(&self) -> bool {
        matches!(self, KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right)
    }
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::ArrowUp => KeyCode::Up,
            WinitKeyCode::ArrowDown => KeyCode::Down,
            WinitKeyCode::ArrowLeft => KeyCode::Left,
            WinitKeyCode::ArrowRight => KeyCode::Right,

            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::Enter => KeyCode::Enter,
            WinitKeyCode::Escape => KeyCode::Escape,
            WinitKeyCode::Tab => KeyCode::Tab,
            WinitKeyCode::Backspace => KeyCode::Backspace,
            WinitKeyCode::Delete => KeyCode::Delete,

            WinitKeyCode::KeyA => KeyCode::Character('a'),
            WinitKeyCode::KeyB => KeyCode::Character('b'),
            WinitKeyCode::KeyC => KeyCode::Character('c'),
            WinitKeyCode::KeyD => KeyCode::Character('d'),
            WinitKeyCode::KeyE => KeyCode::Character('e'),
            WinitKeyCode::KeyF => KeyCode::Character('f'),
            WinitKeyCode::KeyG => KeyCode::Character('g'),
            WinitKeyCode::KeyH => KeyCode::Character('h'),
            WinitKeyCode::KeyI => KeyCode::Character('i'),
            WinitKeyCode::KeyJ => KeyCode::Character('j'),
            WinitKeyCode::KeyK => KeyCode::Character('k'),
            WinitKeyCode::KeyL => KeyCode::Character('l'),
            WinitKeyCode::KeyM => KeyCode::Character('m'),
            WinitKeyCode::KeyN => KeyCode::Character('n'),
            WinitKeyCode::KeyO => KeyCode::Character('o'),
            WinitKeyCode::KeyP => KeyCode::Character('p'),
            WinitKeyCode::KeyQ => KeyCode::Character('q'),
            WinitKeyCode::KeyR => KeyCode::Character('r'),
            WinitKeyCode::KeyS => KeyCode::Character('s'),
            WinitKeyCode::KeyT => KeyCode::Character('t'),
            WinitKeyCode::KeyU => KeyCode::Character('u'),
            WinitKeyCode::KeyV => KeyCode::Character('v'),
            WinitKeyCode::KeyW => KeyCode::Character('w'),
            WinitKeyCode::KeyX => KeyCode::Character('x'),
            WinitKeyCode::KeyY => KeyCode::Character('y'),
            WinitKeyCode::KeyZ => KeyCode::Character('z'),

            WinitKeyCode::Digit0 => KeyCode::Character('0'),
            WinitKeyCode::Digit1 => KeyCode::Character('1'),
            WinitKeyCode::Digit2 => KeyCode::Character('2'),
            WinitKeyCode::Digit3 => KeyCode::Character('3'),
            WinitKeyCode::Digit4 => KeyCode::Character('4'),
            WinitKeyCode::Digit5 => KeyCode::Character('5'),
            WinitKeyCode::Digit6 => KeyCode::Character('6'),
            WinitKeyCode::Digit7 => KeyCode::Character('7'),
            WinitKeyCode::Digit8 => KeyCode::Character('8'),
            WinitKeyCode::Digit9 => KeyCode::Character('9'),

            _ => KeyCode::Other(key as u32),
        }
    }
}

/// One input event, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove(Vec2),
    Click(Vec2),
    KeyPress(KeyCode),
    /// New viewport size.
    Resize(Vec2),
}

/// FIFO of pending input events.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Remove and return every pending event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Converts winit window events into [`InputEvent`]s.
///
/// Tracks the cursor so clicks, which winit reports without a position,
/// land where the pointer last was.
#[derive(Debug, Clone, Default)]
pub struct InputTranslator {
    cursor: Vec2,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Translate a window event. Returns `None` for events the engine ignores.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(Vec2::new(position.x as f32, position.y as f32)))
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => self.mouse_pressed(*button),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return None;
                }
                match event.physical_key {
                    PhysicalKey::Code(code) => self.key_pressed(code.into(), event.repeat),
                    PhysicalKey::Unidentified(_) => self.key_pressed(KeyCode::Other(0), event.repeat),
                }
            }
            WindowEvent::Resized(size) => Some(self.resized(size.width, size.height)),
            _ => None,
        }
    }

    pub fn cursor_moved(&mut self, position: Vec2) -> InputEvent {
        self.cursor = position;
        InputEvent::PointerMove(position)
    }

    /// Left button clicks at the cursor; other buttons are ignored.
    pub fn mouse_pressed(&self, button: MouseButton) -> Option<InputEvent> {
        (button == MouseButton::Left).then_some(InputEvent::Click(self.cursor))
    }

    /// Key presses; auto-repeat only counts for arrow keys.
    pub fn key_pressed(&self, key: KeyCode, repeat: bool) -> Option<InputEvent> {
        (!repeat || key.is_arrow()).then_some(InputEvent::KeyPress(key))
    }

    pub fn resized(&self, width: u32, height: u32) -> InputEvent {
        InputEvent::Resize(Vec2::new(width as f32, height as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyCode::from(WinitKeyCode::ArrowUp), KeyCode::Up);
        assert_eq!(KeyCode::from(WinitKeyCode::KeyQ), KeyCode::Character('q'));
        assert_eq!(KeyCode::from(WinitKeyCode::Digit7), KeyCode::Character('7'));
        assert!(matches!(KeyCode::from(WinitKeyCode::F5), KeyCode::Other(_)));
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::PointerMove(Vec2::ONE));
        queue.push(InputEvent::KeyPress(KeyCode::Space));
        let drained: Vec<_> = queue.drain().collect();

        assert_eq!(
            drained,
            vec![
                InputEvent::PointerMove(Vec2::ONE),
                InputEvent::KeyPress(KeyCode::Space)
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_click_uses_last_cursor() {
        let mut translator = InputTranslator::new();
        translator.cursor_moved(Vec2::new(12.0, 34.0));
        assert_eq!(
            translator.mouse_pressed(MouseButton::Left),
            Some(InputEvent::Click(Vec2::new(12.0, 34.0)))
        );
        assert_eq!(translator.mouse_pressed(MouseButton::Right), None);
    }

    #[test]
    fn test_key_repeat_filter() {
        let translator = InputTranslator::new();
        assert!(translator.key_pressed(KeyCode::Character('a'), true).is_none());
        assert!(translator.key_pressed(KeyCode::Character('a'), false).is_some());
        assert!(translator.key_pressed(KeyCode::Up, true).is_some());
    }

    #[test]
    fn test_resize_event() {
        let translator = InputTranslator::new();
        assert_eq!(translator.resized(640, 480), InputEvent::Resize(Vec2::new(640.0, 480.0)));
    }
}
