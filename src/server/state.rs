use std::sync::Arc;
use std::time::Instant;

use agent_core::Dispatcher;
use supplychain_policy_center::PolicyCenter;

use crate::app_context::AppContext;

#[derive(Clone)]
pub struct ServeState {
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) policies: Arc<PolicyCenter>,
    pub(crate) started: Instant,
}

impl ServeState {
    pub fn new(dispatcher: Arc<Dispatcher>, policies: Arc<PolicyCenter>) -> Self {
        Self {
            dispatcher,
            policies,
            started: Instant::now(),
        }
    }

    pub fn from_context(context: &AppContext) -> Self {
        Self::new(
            Arc::clone(context.dispatcher()),
            Arc::clone(context.policies()),
        )
    }

    pub(crate) fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
