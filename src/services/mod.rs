//! 服务模块

pub mod random;
pub mod responder;
pub mod session;

pub use random::{RandomSource, choose, entropy_source, seeded_source};
pub use responder::{Reply, Responder, ResponseSource};
pub use session::{ChatSession, SessionEnd, SessionSummary};
