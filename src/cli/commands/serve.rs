use super::{connect_report_service, Command};
use crate::config::config;
use crate::dashboard::{start_server, DashboardState};
use crate::render::TemplateCache;
use anyhow::Result;
use std::path::PathBuf;

pub struct ServeCommand {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServeCommand {
    pub fn new(host: Option<String>, port: Option<u16>) -> Self {
        Self { host, port }
    }
}

impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let settings = config()?;
        let service = connect_report_service(settings)?;
        let templates = TemplateCache::new(settings.report.template_dir.as_ref().map(PathBuf::from));
        let state = DashboardState::new(service, settings.report.lookback_days, templates);

        let host = self.host.as_deref().unwrap_or(&settings.dashboard.host);
        let port = self.port.unwrap_or(settings.dashboard.port);
        start_server(state, host, port).await
    }
}
