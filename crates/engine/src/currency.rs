use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code attached to expenses and imported transactions.
///
/// Cassa is effectively mono-currency today (default `EUR`); the engine
/// still models currency explicitly so the data stays unambiguous. No
/// conversion happens anywhere in the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            other => Err(EngineError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
