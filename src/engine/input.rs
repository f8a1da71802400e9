//! Host input to engine input.
//!
//! The [`InputTranslator`] turns host pointer and keyboard events into the events the
//! engine understands. It decides what is forwarded from the host control's state
//! ([`ControlState`]) and reports back whether the host event was consumed and whether
//! the control should take or give up focus ([`InputOutcome`]).
//!
//! Pointer positions come in the control's normalized local space (`[0,1]x[0,1]` is the
//! control) and are forwarded in view pixels.

use crate::engine::events::{KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, PointerEvent, WheelEvent};
use crate::render::{NormalizedRect, Point, ViewSize};

/// Mouse buttons as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMouseButton {
    Left,
    Middle,
    Right,
    /// First extra button (usually "back")
    X1,
    /// Second extra button (usually "forward")
    X2,
}

impl HostMouseButton {
    /// The engine button, or `None` for buttons the engine does not take.
    pub fn to_engine(self) -> Option<MouseButton> {
        match self {
            HostMouseButton::Left => Some(MouseButton::Left),
            HostMouseButton::Middle => Some(MouseButton::Middle),
            HostMouseButton::Right => Some(MouseButton::Right),
            HostMouseButton::X1 | HostMouseButton::X2 => None,
        }
    }
}

/// State of the host control at the time of an input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    /// Enabled in the control hierarchy
    pub enabled: bool,
    /// Visible in the control hierarchy
    pub visible: bool,
    /// Has keyboard focus
    pub focused: bool,
    /// Pointer in normalized control space
    pub pointer: Point,
    /// Modifier keys held right now
    pub modifiers: Modifiers,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            enabled: true,
            visible: true,
            focused: false,
            pointer: Point::default(),
            modifiers: Modifiers::empty(),
        }
    }
}

impl ControlState {
    /// Enabled and visible.
    pub fn is_active(&self) -> bool {
        self.enabled && self.visible
    }

    /// Pointer inside the control rectangle.
    pub fn pointer_inside(&self) -> bool {
        NormalizedRect::UNIT.contains(self.pointer)
    }
}

/// Focus request for the host control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    Focus,
    Unfocus,
}

/// What the host should do with an input event after translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputOutcome {
    /// The event was consumed and must not bubble further
    pub handled: bool,
    /// Focus request for the control
    pub focus: Option<FocusChange>,
}

impl InputOutcome {
    pub const IGNORED: InputOutcome = InputOutcome {
        handled: false,
        focus: None,
    };

    pub const HANDLED: InputOutcome = InputOutcome {
        handled: true,
        focus: None,
    };

    pub fn with_focus(self, focus: FocusChange) -> Self {
        Self {
            focus: Some(focus),
            ..self
        }
    }
}

/// An event for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineInput {
    Pointer(PointerEvent),
    Wheel(WheelEvent),
    Key(KeyEvent),
    Focus(bool),
}

/// Result of translating one host event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Translation {
    pub outcome: InputOutcome,
    /// Events to send to the engine, in order
    pub inputs: Vec<EngineInput>,
}

impl Translation {
    fn ignored() -> Self {
        Self::default()
    }

    fn new(outcome: InputOutcome, inputs: Vec<EngineInput>) -> Self {
        Self { outcome, inputs }
    }
}

/// Translates host input for a session rendering at `view_size`.
///
/// Nothing is forwarded while the session is not ready.
#[derive(Debug, Clone, Copy)]
pub struct InputTranslator {
    view_size: ViewSize,
    session_ready: bool,
}

impl InputTranslator {
    pub fn new(view_size: ViewSize, session_ready: bool) -> Self {
        Self {
            view_size,
            session_ready,
        }
    }

    /// Pointer position in view pixels, truncated.
    pub fn mouse_event(&self, state: &ControlState) -> MouseEvent {
        MouseEvent {
            x: (state.pointer.x * self.view_size.width as f64) as i32,
            y: (state.pointer.y * self.view_size.height as f64) as i32,
            modifiers: state.modifiers,
        }
    }

    fn accepts_click(&self, state: &ControlState) -> bool {
        self.session_ready && state.is_active() && state.pointer_inside()
    }

    fn click(&self, state: &ControlState, button: MouseButton, mouse_up: bool, click_count: u32) -> EngineInput {
        EngineInput::Pointer(PointerEvent::Click {
            event: self.mouse_event(state),
            button,
            mouse_up,
            click_count,
        })
    }

    /// Button press. Inside the control this focuses the control; anywhere else it
    /// unfocuses it and nothing is forwarded.
    pub fn pointer_down(&self, state: &ControlState, button: HostMouseButton) -> Translation {
        if !self.accepts_click(state) {
            return Translation::new(InputOutcome::IGNORED.with_focus(FocusChange::Unfocus), vec![]);
        }

        let inputs = button
            .to_engine()
            .map(|b| vec![self.click(state, b, false, 1)])
            .unwrap_or_default();
        Translation::new(InputOutcome::HANDLED.with_focus(FocusChange::Focus), inputs)
    }

    /// Button release.
    pub fn pointer_up(&self, state: &ControlState, button: HostMouseButton) -> Translation {
        if !self.accepts_click(state) {
            return Translation::ignored();
        }

        match button.to_engine() {
            Some(b) => Translation::new(InputOutcome::HANDLED, vec![self.click(state, b, true, 1)]),
            None => Translation::ignored(),
        }
    }

    /// Double click, sent as a press with a click count of two.
    pub fn double_click(&self, state: &ControlState, button: HostMouseButton) -> Translation {
        if !self.accepts_click(state) {
            return Translation::ignored();
        }

        let inputs = button
            .to_engine()
            .map(|b| vec![self.click(state, b, false, 2)])
            .unwrap_or_default();
        Translation::new(InputOutcome::HANDLED.with_focus(FocusChange::Focus), inputs)
    }

    /// Pointer move. Forwarded even outside the control so the page sees the pointer leave.
    pub fn pointer_move(&self, state: &ControlState) -> Translation {
        if !self.session_ready || !state.is_active() {
            return Translation::ignored();
        }

        let event = PointerEvent::Move {
            event: self.mouse_event(state),
            leave: false,
        };
        Translation::new(InputOutcome::IGNORED, vec![EngineInput::Pointer(event)])
    }

    /// Vertical wheel. The host keeps handling the wheel itself.
    pub fn wheel(&self, state: &ControlState, delta: i32) -> Translation {
        if !self.accepts_click(state) {
            return Translation::ignored();
        }

        let event = WheelEvent {
            event: self.mouse_event(state),
            delta_x: 0,
            delta_y: delta,
        };
        Translation::new(InputOutcome::IGNORED, vec![EngineInput::Wheel(event)])
    }

    fn key(&self, state: &ControlState, kind: KeyEventKind, key_code: i32, native_key_code: i32) -> Vec<EngineInput> {
        // The engine tracks focus on its own; assert it before every key
        vec![
            EngineInput::Focus(true),
            EngineInput::Key(KeyEvent {
                kind,
                key_code,
                native_key_code,
                modifiers: state.modifiers,
            }),
        ]
    }

    pub fn key_down(&self, state: &ControlState, key_code: i32) -> Translation {
        if !self.session_ready || !state.focused || !state.is_active() {
            return Translation::ignored();
        }
        Translation::new(
            InputOutcome::HANDLED,
            self.key(state, KeyEventKind::RawKeyDown, key_code, key_code),
        )
    }

    /// Key release. Does not need focus, so a key released after focus moved away still
    /// reaches the engine. Never consumes the host event.
    pub fn key_up(&self, state: &ControlState, key_code: i32) -> Translation {
        if !self.session_ready || !state.is_active() {
            return Translation::ignored();
        }
        Translation::new(
            InputOutcome::IGNORED,
            self.key(state, KeyEventKind::KeyUp, key_code, key_code),
        )
    }

    /// Character input.
    pub fn char(&self, state: &ControlState, ch: char) -> Translation {
        if !self.session_ready || !state.focused || !state.is_active() {
            return Translation::ignored();
        }
        Translation::new(InputOutcome::HANDLED, self.key(state, KeyEventKind::Char, ch as i32, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> InputTranslator {
        InputTranslator::new(ViewSize::new(800, 600), true)
    }

    fn at(x: f64, y: f64) -> ControlState {
        ControlState {
            pointer: Point::new(x, y),
            ..ControlState::default()
        }
    }

    #[test]
    fn down_outside_unfocuses_and_forwards_nothing() {
        let t = translator().pointer_down(&at(1.5, 0.5), HostMouseButton::Left);
        assert!(t.inputs.is_empty());
        assert!(!t.outcome.handled);
        assert_eq!(t.outcome.focus, Some(FocusChange::Unfocus));
    }

    #[test]
    fn down_inside_focuses_and_clicks() {
        let state = ControlState {
            modifiers: Modifiers::SHIFT,
            ..at(0.5, 0.25)
        };
        let t = translator().pointer_down(&state, HostMouseButton::Left);

        assert_eq!(t.outcome, InputOutcome::HANDLED.with_focus(FocusChange::Focus));
        assert_eq!(
            t.inputs,
            vec![EngineInput::Pointer(PointerEvent::Click {
                event: MouseEvent {
                    x: 400,
                    y: 150,
                    modifiers: Modifiers::SHIFT
                },
                button: MouseButton::Left,
                mouse_up: false,
                click_count: 1,
            })]
        );
    }

    #[test]
    fn unsupported_button_still_focuses() {
        let t = translator().pointer_down(&at(0.5, 0.5), HostMouseButton::X1);
        assert!(t.inputs.is_empty());
        assert!(t.outcome.handled);
        assert_eq!(t.outcome.focus, Some(FocusChange::Focus));

        let t = translator().pointer_up(&at(0.5, 0.5), HostMouseButton::X2);
        assert_eq!(t, Translation::default());
    }

    #[test]
    fn up_and_double_click() {
        let up = translator().pointer_up(&at(0.1, 0.1), HostMouseButton::Right);
        assert!(up.outcome.handled);
        assert!(matches!(
            up.inputs[0],
            EngineInput::Pointer(PointerEvent::Click {
                button: MouseButton::Right,
                mouse_up: true,
                click_count: 1,
                ..
            })
        ));

        let dbl = translator().double_click(&at(0.1, 0.1), HostMouseButton::Middle);
        assert_eq!(dbl.outcome.focus, Some(FocusChange::Focus));
        assert!(matches!(
            dbl.inputs[0],
            EngineInput::Pointer(PointerEvent::Click {
                button: MouseButton::Middle,
                mouse_up: false,
                click_count: 2,
                ..
            })
        ));

        assert!(translator().pointer_up(&at(-0.1, 0.5), HostMouseButton::Left).inputs.is_empty());
    }

    #[test]
    fn coordinates_are_truncated() {
        let m = InputTranslator::new(ViewSize::new(3, 3), true).mouse_event(&at(0.999, 0.5));
        assert_eq!((m.x, m.y), (2, 1));
    }

    #[test]
    fn move_ignores_hit_test_but_not_visibility() {
        let t = translator().pointer_move(&at(2.0, -1.0));
        assert_eq!(t.inputs.len(), 1);
        assert!(!t.outcome.handled);

        let hidden = ControlState {
            visible: false,
            ..at(0.5, 0.5)
        };
        assert!(translator().pointer_move(&hidden).inputs.is_empty());
    }

    #[test]
    fn wheel_forwards_vertical_delta() {
        let t = translator().wheel(&at(0.5, 0.5), -120);
        match t.inputs.as_slice() {
            [EngineInput::Wheel(w)] => {
                assert_eq!(w.delta_x, 0);
                assert_eq!(w.delta_y, -120);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!t.outcome.handled);
        assert!(translator().wheel(&at(1.2, 0.5), 120).inputs.is_empty());
    }

    #[test]
    fn keys_assert_focus_first() {
        let state = ControlState {
            focused: true,
            modifiers: Modifiers::CONTROL,
            ..at(0.5, 0.5)
        };

        let down = translator().key_down(&state, 65);
        assert!(down.outcome.handled);
        assert_eq!(
            down.inputs,
            vec![
                EngineInput::Focus(true),
                EngineInput::Key(KeyEvent {
                    kind: KeyEventKind::RawKeyDown,
                    key_code: 65,
                    native_key_code: 65,
                    modifiers: Modifiers::CONTROL
                })
            ]
        );

        let ch = translator().char(&state, 'a');
        assert!(ch.outcome.handled);
        assert_eq!(
            ch.inputs[1],
            EngineInput::Key(KeyEvent {
                kind: KeyEventKind::Char,
                key_code: 97,
                native_key_code: 0,
                modifiers: Modifiers::CONTROL
            })
        );
    }

    #[test]
    fn key_down_needs_focus_key_up_does_not() {
        let state = at(0.5, 0.5);
        assert!(translator().key_down(&state, 65).inputs.is_empty());
        assert!(translator().char(&state, 'a').inputs.is_empty());

        let up = translator().key_up(&state, 65);
        assert!(!up.outcome.handled);
        assert_eq!(up.inputs[0], EngineInput::Focus(true));
        assert!(matches!(
            up.inputs[1],
            EngineInput::Key(KeyEvent {
                kind: KeyEventKind::KeyUp,
                ..
            })
        ));
    }

    #[test]
    fn nothing_is_forwarded_without_a_ready_session() {
        let t = InputTranslator::new(ViewSize::new(10, 10), false);
        let state = ControlState {
            focused: true,
            ..at(0.5, 0.5)
        };

        assert!(t.pointer_down(&state, HostMouseButton::Left).inputs.is_empty());
        assert!(t.pointer_move(&state).inputs.is_empty());
        assert!(t.key_down(&state, 13).inputs.is_empty());
        assert!(t.key_up(&state, 13).inputs.is_empty());
    }

    #[test]
    fn disabled_control_forwards_nothing() {
        let state = ControlState {
            enabled: false,
            focused: true,
            ..at(0.5, 0.5)
        };
        assert!(translator().pointer_down(&state, HostMouseButton::Left).inputs.is_empty());
        assert!(translator().key_down(&state, 13).inputs.is_empty());
    }
}
