use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

/// Language a narration is recorded in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
    #[sea_orm(string_value = "BELARUSIAN")]
    Belarusian,
    #[sea_orm(string_value = "RUSSIAN")]
    Russian,
    #[sea_orm(string_value = "UKRAINIAN")]
    Ukrainian,
    #[sea_orm(string_value = "ENGLISH")]
    English,
}

impl Language {
    /// Stored code, e.g. `BELARUSIAN`.
    pub fn code(self) -> &'static str {
        match self {
            Language::Belarusian => "BELARUSIAN",
            Language::Russian => "RUSSIAN",
            Language::Ukrainian => "UKRAINIAN",
            Language::English => "ENGLISH",
        }
    }

    /// Case-insensitive lookup of a `lang` query parameter.
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.trim().to_uppercase();
        Self::iter().find(|lang| lang.code() == upper)
    }

    pub fn human_name(self) -> &'static str {
        match self {
            Language::Belarusian => "беларуская",
            Language::Russian => "руская",
            Language::Ukrainian => "украінская",
            Language::English => "англійская",
        }
    }
}
