//! Built-in checker adapters.
//!
//! Each provider has its own submodule; `probe` holds the shared header
//! parsing and status handling.

pub mod anthropic;
pub mod deepseek;
pub mod github;
pub mod minimax;
pub mod openai;
pub mod probe;

use std::sync::Arc;

pub use crate::core::provider::Provider;

use crate::core::checker::{Checker, CheckerRegistry};

/// Register every built-in provider under its config id.
pub fn register_builtin(registry: &mut CheckerRegistry) {
    registry.register(Provider::OpenAI.cli_name(), |spec| {
        Ok(Arc::new(openai::OpenAiChecker::new(spec)?) as Arc<dyn Checker>)
    });
    registry.register(Provider::DeepSeek.cli_name(), |spec| {
        Ok(Arc::new(deepseek::DeepSeekChecker::new(spec)?) as Arc<dyn Checker>)
    });
    registry.register(Provider::MiniMax.cli_name(), |spec| {
        Ok(Arc::new(minimax::MiniMaxChecker::new(spec)?) as Arc<dyn Checker>)
    });
    registry.register(Provider::Anthropic.cli_name(), |spec| {
        Ok(Arc::new(anthropic::AnthropicChecker::new(spec)?) as Arc<dyn Checker>)
    });
    registry.register(Provider::GitHub.cli_name(), |spec| {
        Ok(Arc::new(github::GitHubChecker::new(spec)?) as Arc<dyn Checker>)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checker::CheckerSpec;
    use crate::core::credential::Credential;
    use std::time::Duration;

    #[test]
    fn every_provider_is_registered() {
        let registry = CheckerRegistry::with_builtin();
        let spec = CheckerSpec::new(Credential::new("key"), Duration::from_secs(5));
        for provider in Provider::ALL {
            let checker = registry.create(provider.cli_name(), &spec).unwrap();
            assert_eq!(checker.provider(), provider.cli_name());
        }
    }
}
