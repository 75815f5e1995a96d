use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::SubmissionRateLimiter;
use crate::sinks::SinkSet;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub sinks: SinkSet,
    pub limiter: SubmissionRateLimiter,
}
