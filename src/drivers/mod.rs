//! Actuator drivers and worker-thread helpers.

pub mod pump;
pub mod relay;
pub mod task_pin;
