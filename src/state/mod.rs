mod session;

pub use session::{ActiveDrawingSession, SaveFuture};
