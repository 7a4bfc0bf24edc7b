//! Small windowing toolkit: a winit + pixels event loop, a CPU 2D renderer with a block font,
//! a retained UI element tree, and a deadline scheduler for timer-driven widgets.

pub mod app;
pub mod graphics;
pub mod pixels_renderer;
pub mod scheduler;
pub mod surface;
pub mod ui;
pub mod ui_tree;
