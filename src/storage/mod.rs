//! Configuration storage.

pub mod config;
pub mod paths;

pub use config::{
    BarkConfig, Config, ConsoleConfig, EmailConfig, ENV_CONFIG, GeneralConfig, MonitorConfig,
    NotificationsConfig, ResolvedConfig, TargetConfig, TelegramConfig, WebhookConfig,
};
pub use paths::AppPaths;
