//! Background Tasks Module
//!
//! Optional in-process trigger for cleanup passes. Normally passes are driven
//! by an external scheduler calling the HTTP endpoint.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
