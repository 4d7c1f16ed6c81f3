use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::http::RequestInput;
use crate::runner::session::Session;
use crate::runner::types::Completion;

/// Runs every submitted request on its own task and hands the result back to
/// whoever owns the receiver. No queue, no pool, no cancellation.
pub struct Dispatcher {
    session: Arc<Session>,
    completions: UnboundedSender<Completion>,
}

impl Dispatcher {
    pub fn new(session: Arc<Session>) -> (Self, UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                session,
                completions: tx,
            },
            rx,
        )
    }

    pub fn submit(&self, input: RequestInput) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = session.send(&input).await;
            // Receiver gone means nobody is left to display it
            if completions.send(Completion { input, result }).is_err() {
                tracing::debug!("Completion dropped: receiver closed");
            }
        })
    }
}
