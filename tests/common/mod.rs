#![allow(dead_code)]

pub mod builders;
pub mod log_capture;
pub mod mock_compute;

pub use builders::*;
pub use log_capture::*;
pub use mock_compute::*;
