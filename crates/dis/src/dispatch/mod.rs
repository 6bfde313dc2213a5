mod dispatcher;
mod handler;

pub use dispatcher::{DispatchOutcome, DispatchStats, PduDispatcher};
pub use handler::{PduHandler, PduQueue};
