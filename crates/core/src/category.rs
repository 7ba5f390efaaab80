use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a wallet category. The remote service encodes these as small
/// integers in its responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Expense,
    Income,
    DebtLoan,
}

impl CategoryKind {
    /// Decodes the service's numeric type field.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CategoryKind::DebtLoan),
            1 => Some(CategoryKind::Income),
            2 => Some(CategoryKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Expense => write!(f, "expense"),
            CategoryKind::Income => write!(f, "income"),
            CategoryKind::DebtLoan => write!(f, "debt/loan"),
        }
    }
}

/// A wallet category. Two levels at most: rows with no parent are
/// top-level, everything else hangs off a top-level row.
///
/// The service emits ids sometimes as numbers and sometimes as strings, so
/// both `id` and `parent` are held as text and compared as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id_text::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "id_text::deserialize_opt")]
    pub parent: Option<String>,
    pub wallet_id: String,
    pub kind: CategoryKind,
}

/// Serde helpers canonicalizing a numeric-or-string id to text.
pub mod id_text {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    impl From<Raw> for String {
        fn from(raw: Raw) -> String {
            match raw {
                Raw::Text(s) => s,
                Raw::Number(n) => n.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Raw::deserialize(deserializer).map(String::from)
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Raw>::deserialize(deserializer)?.map(String::from))
    }
}
