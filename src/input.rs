//! Per-frame input state.
//!
//! Window and device events are folded into an [`InputState`] value that is
//! handed to the per-frame update, instead of living in globals.

use std::collections::HashSet;

use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Clone, Debug, Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
    mouse_delta: (f64, f64),
    pointer_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer_locked = locked;
        if !locked {
            self.mouse_delta = (0.0, 0.0);
        }
    }

    /// Pointer movement only counts while the pointer is locked to the window.
    pub fn add_mouse_delta(&mut self, dx: f64, dy: f64) {
        if self.pointer_locked {
            self.mouse_delta.0 += dx;
            self.mouse_delta.1 += dy;
        }
    }

    /// Returns the pointer movement since the last call and resets it.
    pub fn take_mouse_delta(&mut self) -> (f64, f64) {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Returns `true` when the event asks for the pointer to be locked; the
    /// caller is responsible for actually grabbing the cursor.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                match state {
                    ElementState::Pressed => self.press(*code),
                    ElementState::Released => self.release(*code),
                }
                false
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } if !self.pointer_locked => {
                self.set_pointer_locked(true);
                true
            }
            WindowEvent::Focused(false) => {
                self.pressed.clear();
                self.set_pointer_locked(false);
                false
            }
            _ => false,
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.add_mouse_delta(delta.0, delta.1);
        }
    }
}
