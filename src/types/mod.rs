pub mod symbol;
pub mod timestamp;

pub use symbol::Symbol;
pub use timestamp::Timestamp;
