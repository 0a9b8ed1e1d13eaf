//! Embassy async tasks

pub mod bus;
pub mod button;

pub use bus::bus_task;
pub use button::button_task;
