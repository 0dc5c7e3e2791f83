pub mod bridge;
pub mod session;

pub use bridge::run_blocking;
pub use session::DocumentSession;
