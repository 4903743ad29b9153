//! Input system with action-based mapping
//!
//! Raw winit events are mapped to [`InputAction`]s and sampled once per
//! tick. Edge flags (`just_pressed`, `just_released`) and mouse/scroll
//! deltas reset after each tick. An [`InputRoute`] decides which actions a
//! consumer sees, so a modal session can own input exclusively.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move forward (W by default)
    MoveForward,
    /// Move backward (S by default)
    MoveBackward,
    /// Move left (A by default)
    MoveLeft,
    /// Move right (D by default)
    MoveRight,
    /// Interact with the targeted object (E by default)
    Interact,
    /// Inspect the selected inventory item (Tab by default)
    Inspect,
    /// Take the inspected item, or close an inventory inspection (F by default)
    Grab,
    /// Put the inspected item back (right mouse button by default)
    Return,
    /// Rotate the inspected item while held (left mouse button by default)
    Rotate,
    /// Zoom in (scroll up)
    ZoomIn,
    /// Zoom out (scroll down)
    ZoomOut,
    /// Select the previous inventory item (Q by default)
    SelectPrevious,
    /// Select the next inventory item (R by default)
    SelectNext,
}

impl InputAction {
    /// Whether the action is visible under the given route
    pub fn routed_to(self, route: InputRoute) -> bool {
        use InputAction::*;
        match route {
            InputRoute::Gameplay => matches!(
                self,
                MoveForward
                    | MoveBackward
                    | MoveLeft
                    | MoveRight
                    | Interact
                    | Inspect
                    | SelectPrevious
                    | SelectNext
            ),
            InputRoute::Inspection => {
                matches!(self, Grab | Return | Rotate | ZoomIn | ZoomOut)
            }
        }
    }
}

/// Who currently owns input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputRoute {
    /// Movement, look, interaction and inventory selection
    #[default]
    Gameplay,
    /// Zoom, rotate, grab and return only
    Inspection,
}

/// Current state of all inputs for a tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this tick
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this tick
    pub just_released: HashSet<InputAction>,
    /// Mouse movement delta for this tick
    pub mouse_delta: Vec2,
    /// Scroll wheel delta for this tick
    pub scroll_delta: f32,
    /// Whether the cursor is captured (invisible, locked)
    pub cursor_captured: bool,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this tick
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this tick
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Record a press. Repeats while held do not raise a new edge.
    pub fn press(&mut self, action: InputAction) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Record a release
    pub fn release(&mut self, action: InputAction) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Press and release within the same tick
    pub fn tap(&mut self, action: InputAction) {
        self.just_pressed.insert(action);
        self.just_released.insert(action);
    }

    /// Clear tick-specific data (call at end of tick)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.clear_frame();
    }

    /// View of this state filtered by a route
    pub fn routed(&self, route: InputRoute) -> RoutedInput<'_> {
        RoutedInput { state: self, route }
    }
}

/// Input as seen by the current owner of the route
#[derive(Debug, Clone, Copy)]
pub struct RoutedInput<'a> {
    state: &'a InputState,
    route: InputRoute,
}

impl RoutedInput<'_> {
    pub fn route(&self) -> InputRoute {
        self.route
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        action.routed_to(self.route) && self.state.is_held(action)
    }

    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        action.routed_to(self.route) && self.state.is_just_pressed(action)
    }

    /// Mouse delta; looks in gameplay, rotates the item while inspecting
    pub fn mouse_delta(&self) -> Vec2 {
        self.state.mouse_delta
    }

    /// Scroll delta, only visible while inspecting
    pub fn scroll_delta(&self) -> f32 {
        match self.route {
            InputRoute::Inspection => self.state.scroll_delta,
            InputRoute::Gameplay => 0.0,
        }
    }
}

/// Binding of a physical key to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(u32), // 0 = left, 1 = right, 2 = middle
}

impl From<KeyCode> for InputBinding {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

/// Maps physical inputs to game actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: HashMap<InputBinding, InputAction>,
    reverse: HashMap<InputAction, Vec<InputBinding>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
            reverse: HashMap::new(),
        };

        bindings.bind(KeyCode::KeyW, InputAction::MoveForward);
        bindings.bind(KeyCode::KeyS, InputAction::MoveBackward);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);
        bindings.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveBackward);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        bindings.bind(KeyCode::KeyE, InputAction::Interact);
        bindings.bind(KeyCode::Tab, InputAction::Inspect);
        bindings.bind(KeyCode::KeyF, InputAction::Grab);
        bindings.bind(KeyCode::Backspace, InputAction::Return);
        bindings.bind(KeyCode::Escape, InputAction::Return);
        bindings.bind(KeyCode::KeyQ, InputAction::SelectPrevious);
        bindings.bind(KeyCode::KeyR, InputAction::SelectNext);

        bindings.bind_mouse(0, InputAction::Rotate);
        bindings.bind_mouse(1, InputAction::Return);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.insert(InputBinding::Key(key), action);
    }

    /// Bind a mouse button to an action
    pub fn bind_mouse(&mut self, button: u32, action: InputAction) {
        self.insert(InputBinding::Mouse(button), action);
    }

    /// Unbind a key
    pub fn unbind(&mut self, key: KeyCode) {
        let binding = InputBinding::Key(key);
        if let Some(action) = self.bindings.remove(&binding) {
            if let Some(bindings) = self.reverse.get_mut(&action) {
                bindings.retain(|b| *b != binding);
            }
        }
    }

    /// Get the action for a binding, if any
    pub fn get_action(&self, binding: &InputBinding) -> Option<InputAction> {
        self.bindings.get(binding).copied()
    }

    /// Get the action for a key, if any
    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.get_action(&InputBinding::Key(key))
    }

    /// All bindings of an action
    pub fn bindings_for(&self, action: InputAction) -> &[InputBinding] {
        self.reverse.get(&action).map_or(&[], Vec::as_slice)
    }

    fn insert(&mut self, binding: InputBinding, action: InputAction) {
        if let Some(previous) = self.bindings.insert(binding, action) {
            if let Some(bindings) = self.reverse.get_mut(&previous) {
                bindings.retain(|b| *b != binding);
            }
        }
        self.reverse.entry(action).or_default().push(binding);
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug)]
pub struct InputHandler {
    /// Current input state
    pub state: InputState,
    /// Input bindings
    pub bindings: InputBindings,
    /// Mouse sensitivity multiplier
    pub mouse_sensitivity: f32,
    /// Invert Y axis
    pub invert_y: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self {
            state: InputState::new(),
            bindings: InputBindings::default(),
            mouse_sensitivity: 1.0,
            invert_y: false,
        }
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        if let PhysicalKey::Code(key_code) = physical_key {
            if let Some(action) = self.bindings.get_key_action(key_code) {
                self.apply(action, element_state);
            }
        }
    }

    /// Handle a mouse button event
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let button_id = match button {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(id) => id as u32,
        };

        if let Some(action) = self.bindings.get_action(&InputBinding::Mouse(button_id)) {
            self.apply(action, state);
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_motion(&mut self, delta: (f64, f64)) {
        if self.state.cursor_captured {
            let y_mult = if self.invert_y { -1.0 } else { 1.0 };
            self.state.mouse_delta += Vec2::new(
                delta.0 as f32 * self.mouse_sensitivity,
                delta.1 as f32 * self.mouse_sensitivity * y_mult,
            );
        }
    }

    /// Handle scroll wheel
    pub fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        let scroll = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
        };

        self.state.scroll_delta += scroll;

        if scroll > 0.0 {
            self.state.just_pressed.insert(InputAction::ZoomIn);
        } else if scroll < 0.0 {
            self.state.just_pressed.insert(InputAction::ZoomOut);
        }
    }

    /// Clear tick-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }

    /// Set cursor capture state
    pub fn set_cursor_captured(&mut self, captured: bool) {
        self.state.cursor_captured = captured;
    }

    fn apply(&mut self, action: InputAction, element_state: ElementState) {
        match element_state {
            ElementState::Pressed => self.state.press(action),
            ElementState::Released => self.state.release(action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(
            bindings.get_key_action(KeyCode::KeyW),
            Some(InputAction::MoveForward)
        );
        assert_eq!(
            bindings.get_key_action(KeyCode::KeyE),
            Some(InputAction::Interact)
        );
        assert_eq!(bindings.bindings_for(InputAction::Return).len(), 3);
        assert_eq!(
            bindings.get_key_action(KeyCode::Escape),
            Some(InputAction::Return)
        );
    }

    #[test]
    fn test_rebinding_moves_reverse_entry() {
        let mut bindings = InputBindings::default();
        bindings.bind(KeyCode::KeyE, InputAction::Grab);
        assert_eq!(bindings.get_key_action(KeyCode::KeyE), Some(InputAction::Grab));
        assert!(bindings.bindings_for(InputAction::Interact).is_empty());
    }

    #[test]
    fn test_input_state() {
        let mut state = InputState::new();
        state.press(InputAction::MoveForward);
        state.press(InputAction::Interact);

        assert!(state.is_held(InputAction::MoveForward));
        assert!(state.is_just_pressed(InputAction::Interact));
        assert!(!state.is_held(InputAction::Rotate));

        state.clear_frame();
        assert!(state.is_held(InputAction::MoveForward));
        assert!(!state.is_just_pressed(InputAction::Interact));

        state.press(InputAction::MoveForward);
        assert!(!state.is_just_pressed(InputAction::MoveForward));
    }

    #[test]
    fn test_routing_filters_actions() {
        let mut state = InputState::new();
        state.tap(InputAction::Interact);
        state.tap(InputAction::Grab);
        state.scroll_delta = 1.0;

        let gameplay = state.routed(InputRoute::Gameplay);
        assert!(gameplay.is_just_pressed(InputAction::Interact));
        assert!(!gameplay.is_just_pressed(InputAction::Grab));
        assert_eq!(gameplay.scroll_delta(), 0.0);

        let inspection = state.routed(InputRoute::Inspection);
        assert!(!inspection.is_just_pressed(InputAction::Interact));
        assert!(inspection.is_just_pressed(InputAction::Grab));
        assert_eq!(inspection.scroll_delta(), 1.0);
    }

    #[test]
    fn test_handler_edges() {
        let mut handler = InputHandler::new();
        let key = PhysicalKey::Code(KeyCode::KeyE);
        handler.handle_keyboard(key, ElementState::Pressed);
        handler.handle_keyboard(key, ElementState::Pressed);
        assert!(handler.state.is_just_pressed(InputAction::Interact));

        handler.end_frame();
        handler.handle_keyboard(key, ElementState::Released);
        assert!(handler.state.is_just_released(InputAction::Interact));
        assert!(!handler.state.is_held(InputAction::Interact));
    }
}
