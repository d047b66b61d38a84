pub mod campaign;
pub mod reports;
pub mod scripted;

pub use campaign::{CampaignConfig, CampaignReport, DayReport, run_campaign};
pub use reports::{generate_console_report, generate_json_report};
pub use scripted::ScriptedService;
