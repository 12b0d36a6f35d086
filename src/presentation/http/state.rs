use crate::{
    config::Config,
    infrastructure::{database::MonitoredDb, monitoring::QueryMonitor},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: MonitoredDb,
    pub monitor: Arc<QueryMonitor>,
    pub config: Config,
}
