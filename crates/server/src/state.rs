use sitewatch_core::Config;
use sitewatch_escalation::EscalationPass;

pub struct AppState {
    pub config: Config,
    pub pass: EscalationPass,
}
