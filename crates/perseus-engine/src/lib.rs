//! Perseus engine crate.
//!
//! A bounded frames-in-flight renderer for instanced scenes, plus the
//! platform + GPU runtime that hosts it in a window.

pub mod device;
pub mod logging;
pub mod math;
pub mod render;
pub mod scene;
pub mod window;
