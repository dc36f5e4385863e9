pub mod button;
pub mod hw_timer;
pub mod task_pin;
