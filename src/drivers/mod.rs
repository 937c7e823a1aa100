//! Display drivers: the LCD refresh task and the seven-segment renderer.

pub mod display;
pub mod segment;
