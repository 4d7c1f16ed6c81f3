pub mod dispatcher;
pub mod executor;
pub mod session;
pub mod types;

pub use dispatcher::Dispatcher;
pub use executor::RequestExecutor;
pub use session::Session;
pub use types::{Completion, Exchange};
