//! Editor state containers.

mod session;

pub use session::EditorSession;
