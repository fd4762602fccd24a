//! Built-in provider tags.
//!
//! The checker registry is keyed by string ids so new providers can be
//! registered without touching this enum; the enum is the closed set that
//! ships with the binary.

use serde::{Deserialize, Serialize};

use crate::error::{GuardianError, Result};

// =============================================================================
// Provider Enum
// =============================================================================

/// Supported API providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    MiniMax,
    DeepSeek,
    Anthropic,
    GitHub,
}

impl Provider {
    /// All providers in display order.
    pub const ALL: &'static [Self] = &[
        Self::OpenAI,
        Self::MiniMax,
        Self::DeepSeek,
        Self::Anthropic,
        Self::GitHub,
    ];

    /// Config/CLI name for this provider.
    #[must_use]
    pub const fn cli_name(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::MiniMax => "minimax",
            Self::DeepSeek => "deepseek",
            Self::Anthropic => "anthropic",
            Self::GitHub => "github",
        }
    }

    /// Display name for human output.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::MiniMax => "MiniMax",
            Self::DeepSeek => "DeepSeek",
            Self::Anthropic => "Anthropic",
            Self::GitHub => "GitHub",
        }
    }

    /// Parse from config or CLI argument.
    pub fn from_cli_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|p| p.cli_name() == lower)
            .copied()
            .ok_or_else(|| GuardianError::UnknownProvider {
                provider: name.to_string(),
                known: Self::ALL
                    .iter()
                    .map(|p| p.cli_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Default API base URL.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com",
            Self::MiniMax => "https://api.minimaxi.com",
            Self::DeepSeek => "https://api.deepseek.com",
            Self::Anthropic => "https://api.anthropic.com",
            Self::GitHub => "https://api.github.com",
        }
    }

    /// Documentation page describing the provider's rate limits.
    #[must_use]
    pub const fn docs_url(self) -> &'static str {
        match self {
            Self::OpenAI => "https://platform.openai.com/docs/guides/rate-limits",
            Self::MiniMax => "https://platform.minimaxi.com/document/rate-limits",
            Self::DeepSeek => "https://api-docs.deepseek.com/quick_start/rate_limit",
            Self::Anthropic => "https://docs.anthropic.com/en/api/rate-limits",
            Self::GitHub => "https://docs.github.com/en/rest/rate-limit",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cli_name())
    }
}
