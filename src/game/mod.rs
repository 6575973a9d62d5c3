pub mod backspace;
pub mod session;
pub mod word;

pub use session::{GameSession, Phase, SessionSnapshot};
pub use word::FallingWord;
