//! Trade record data model.
//!
//! A [`TradeRecord`] is one row of the journal. Stores hand out records with
//! an assigned identifier and sequence number; callers submit [`NewTrade`]
//! payloads, usually produced by validating a raw [`TradeInput`] form.

use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Returns the label used in forms and the CSV file.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "Long",
            Self::Short => "Short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            _ => Err(ValidationError::InvalidDirection(s.to_string())),
        }
    }
}

/// Whether the trader followed their own rules on this trade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum RuleCompliance {
    #[default]
    Yes,
    No,
}

impl RuleCompliance {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl fmt::Display for RuleCompliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCompliance {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(ValidationError::InvalidCompliance(s.to_string())),
        }
    }
}

/// A trade as submitted, before the store assigns an identity.
///
/// Updates replace every field; there is no partial patch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTrade {
    pub script_name: String,
    #[serde(default)]
    pub time: String,
    pub direction: Direction,
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub account_risked: Option<String>,
    #[serde(default)]
    pub target_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub exit_time: Option<String>,
    #[serde(default)]
    pub risk_reward: Option<String>,
    pub pl: Option<Decimal>,
    #[serde(default)]
    pub followed_rules: RuleCompliance,
}

impl NewTrade {
    /// Checks the fields a submitted trade must carry.
    ///
    /// # Errors
    /// Returns the first missing required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.script_name.trim().is_empty() {
            return Err(ValidationError::MissingField("script_name"));
        }
        let required = [
            ("entry_price", self.entry_price),
            ("quantity", self.quantity),
            ("exit_price", self.exit_price),
            ("pl", self.pl),
        ];
        match required.iter().find(|(_, value)| value.is_none()) {
            Some((field, _)) => Err(ValidationError::MissingField(*field)),
            None => Ok(()),
        }
    }
}

/// A stored journal entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeRecord {
    /// Store-assigned identifier.
    pub id: String,
    /// Sequence number, unique and increasing within one store.
    pub sl_no: u64,
    #[serde(flatten)]
    pub trade: NewTrade,
}

impl TradeRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, sl_no: u64, trade: NewTrade) -> Self {
        Self {
            id: id.into(),
            sl_no,
            trade,
        }
    }

    /// Profit or loss, with a missing value counted as zero.
    #[must_use]
    pub fn pl_or_zero(&self) -> Decimal {
        self.trade.pl.unwrap_or(Decimal::ZERO)
    }
}

/// Parses a decimal the way a spreadsheet user would type it.
///
/// Accepts surrounding whitespace and scientific notation. Returns `None`
/// for empty or non-numeric text.
#[must_use]
pub fn parse_decimal_lenient(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Raw form payload. Every field arrives as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeInput {
    pub script_name: String,
    pub time: String,
    pub long_short: String,
    pub entry_price: String,
    pub sl: String,
    pub quantity: String,
    pub account_risked: String,
    pub target_price: String,
    pub exit_price: String,
    pub exit_time: String,
    pub rr: String,
    pub pl: String,
    pub follow_rules: String,
}

impl TradeInput {
    /// Validates the form into a [`NewTrade`].
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when a required field is empty, a
    /// numeric field does not parse, or an enumerated field is unknown.
    pub fn parse(&self) -> Result<NewTrade, ValidationError> {
        let script_name = required_text("script_name", &self.script_name)?;
        let direction = required_text("long_short", &self.long_short)?.parse::<Direction>()?;

        let followed_rules = if self.follow_rules.trim().is_empty() {
            RuleCompliance::default()
        } else {
            self.follow_rules.parse()?
        };

        Ok(NewTrade {
            script_name,
            time: self.time.trim().to_string(),
            direction,
            entry_price: Some(required_number("entry_price", &self.entry_price)?),
            stop_loss: optional_number("sl", &self.sl)?,
            quantity: Some(required_number("quantity", &self.quantity)?),
            account_risked: optional_text(&self.account_risked),
            target_price: optional_number("target_price", &self.target_price)?,
            exit_price: Some(required_number("exit_price", &self.exit_price)?),
            exit_time: optional_text(&self.exit_time),
            risk_reward: optional_text(&self.rr),
            pl: Some(required_number("pl", &self.pl)?),
            followed_rules,
        })
    }

    /// Builds the form values that reproduce a stored trade, for editing.
    #[must_use]
    pub fn from_trade(trade: &NewTrade) -> Self {
        let number = |value: Option<Decimal>| value.map(|d| d.to_string()).unwrap_or_default();
        Self {
            script_name: trade.script_name.clone(),
            time: trade.time.clone(),
            long_short: trade.direction.to_string(),
            entry_price: number(trade.entry_price),
            sl: number(trade.stop_loss),
            quantity: number(trade.quantity),
            account_risked: trade.account_risked.clone().unwrap_or_default(),
            target_price: number(trade.target_price),
            exit_price: number(trade.exit_price),
            exit_time: trade.exit_time.clone().unwrap_or_default(),
            rr: trade.risk_reward.clone().unwrap_or_default(),
            pl: number(trade.pl),
            follow_rules: trade.followed_rules.to_string(),
        }
    }
}

fn required_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required_number(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    optional_number(field, raw)?.ok_or(ValidationError::MissingField(field))
}

fn optional_number(field: &'static str, raw: &str) -> Result<Option<Decimal>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal_lenient(raw)
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
