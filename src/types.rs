//! Core types for the Swish API

use crate::{Result, SwishError};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Base URL of the live Swish API
pub const PRODUCTION_URL: &str = "https://swicpc.bankgirot.se/swish-cpcapi/api/v1";

/// Base URL of the Swish merchant simulator
pub const SANDBOX_URL: &str = "https://mss.swicpc.bankgirot.se/swish-cpcapi/api/v1";

/// Collection path for payment requests
pub const PAYMENT_REQUESTS_PATH: &str = "/paymentrequests";

/// Collection path for refunds
pub const REFUNDS_PATH: &str = "/refunds";

/// Which Swish host the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Sandbox,
}

impl Environment {
    /// Resolve an environment name.
    ///
    /// Only `"production"` selects the live host; every other value,
    /// including the empty string, selects the sandbox.
    pub fn from_name(name: &str) -> Self {
        match name {
            "production" => Environment::Production,
            _ => Environment::Sandbox,
        }
    }

    /// Get the environment identifier string
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Sandbox => "sandbox",
        }
    }

    /// Get the API base URL for this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_URL,
            Environment::Sandbox => SANDBOX_URL,
        }
    }
}

impl From<&str> for Environment {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monetary amount.
///
/// Backed by a [`Decimal`] so no float rounding ever reaches the wire. Accepts
/// a JSON string or number and always serializes with exactly two fractional
/// digits, the form Swish accepts, so `"100.00"` and `100` produce the same
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Wrap a decimal value
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the amount as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = SwishError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self)
            .map_err(|_| SwishError::invalid_amount(s))
    }
}

impl TryFrom<&str> for Amount {
    type Error = SwishError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A payment request or refund as exchanged with the Swish API.
///
/// Every field is optional; absent fields are left out of the JSON payload
/// rather than sent as empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Resource identifier, assigned by Swish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// ISO 4217 currency code, `SEK` for Swish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee_payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_payment_reference: Option<String>,
    /// Bank reference, set once the payment is processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    /// Payment reference of the payment a refund applies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_paid: Option<String>,
    /// Only populated when Swish reports a failed payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
}

impl PaymentRecord {
    /// Create a new payment request
    pub fn payment(
        amount: impl Into<Amount>,
        currency: impl Into<String>,
        payee_alias: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            amount: Some(amount.into()),
            currency: Some(currency.into()),
            payee_alias: Some(payee_alias.into()),
            callback_url: Some(callback_url.into()),
            ..Self::default()
        }
    }

    /// Create a new refund for a previously settled payment
    pub fn refund(
        original_payment_reference: impl Into<String>,
        amount: impl Into<Amount>,
        currency: impl Into<String>,
        payer_alias: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            original_payment_reference: Some(original_payment_reference.into()),
            amount: Some(amount.into()),
            currency: Some(currency.into()),
            payer_alias: Some(payer_alias.into()),
            callback_url: Some(callback_url.into()),
            ..Self::default()
        }
    }

    /// Set the payer alias
    pub fn with_payer_alias(mut self, alias: impl Into<String>) -> Self {
        self.payer_alias = Some(alias.into());
        self
    }

    /// Set the payee payment reference
    pub fn with_payee_payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payee_payment_reference = Some(reference.into());
        self
    }

    /// Set the payer payment reference
    pub fn with_payer_payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payer_payment_reference = Some(reference.into());
        self
    }

    /// Set the message shown to the payer
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Creation time, if present and valid RFC 3339
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.date_created.as_deref().and_then(parse_timestamp)
    }

    /// Payment time, if present and valid RFC 3339
    pub fn paid_at(&self) -> Option<DateTime<FixedOffset>> {
        self.date_paid.as_deref().and_then(parse_timestamp)
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Error object returned in the body of a failed Swish API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_information: Option<String>,
}

impl From<ApiErrorBody> for SwishError {
    fn from(body: ApiErrorBody) -> Self {
        SwishError::Api {
            code: body.error_code,
            message: body.error_message,
            additional_information: body.additional_information,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_environment_resolution() {
        assert_eq!(Environment::from_name("production").base_url(), PRODUCTION_URL);
        assert_eq!(Environment::from_name("test").base_url(), SANDBOX_URL);
        assert_eq!(Environment::from_name("").base_url(), SANDBOX_URL);
        assert_eq!(Environment::from_name("Production"), Environment::Sandbox);
        assert_eq!(Environment::default(), Environment::Sandbox);
    }

    #[test]
    fn test_amount_serializes_identically_from_string_and_number() {
        let from_str: Amount = "100.00".parse().unwrap();
        let from_int = Amount::from(100i64);

        assert_eq!(from_str, from_int);
        assert_eq!(serde_json::to_value(from_str).unwrap(), json!("100.00"));
        assert_eq!(serde_json::to_value(from_int).unwrap(), json!("100.00"));
    }

    #[test]
    fn test_amount_keeps_fractional_digits() {
        let amount: Amount = "0.10".parse().unwrap();
        assert_eq!(amount.to_string(), "0.10");
        assert_eq!(amount.as_decimal(), Decimal::new(1, 1));

        let amount: Amount = "99.5".parse().unwrap();
        assert_eq!(serde_json::to_value(amount).unwrap(), json!("99.50"));
    }

    #[test]
    fn test_amount_deserializes_from_string_or_number() {
        let text: Amount = serde_json::from_value(json!("99.50")).unwrap();
        let number: Amount = serde_json::from_value(json!(99.5)).unwrap();
        let integer: Amount = serde_json::from_value(json!(100)).unwrap();

        assert_eq!(text, number);
        assert_eq!(integer, Amount::from(100u32));
    }

    #[test]
    fn test_invalid_amount() {
        let err = "ten kronor".parse::<Amount>().unwrap_err();
        assert!(err.to_string().contains("ten kronor"));
        assert!(serde_json::from_value::<Amount>(json!(true)).is_err());
    }

    #[test]
    fn test_payment_record_skips_absent_fields() {
        let record = PaymentRecord::payment(100u32, "SEK", "1234760039", "https://example.com/cb")
            .with_message("Kingston USB Flash Drive 8 GB");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "amount": "100.00",
                "currency": "SEK",
                "payeeAlias": "1234760039",
                "callbackUrl": "https://example.com/cb",
                "message": "Kingston USB Flash Drive 8 GB"
            })
        );
    }

    #[test]
    fn test_refund_record_uses_camel_case() {
        let record = PaymentRecord::refund(
            "6D6CD7406ECE4542A80152D909EF9F6B",
            100u32,
            "SEK",
            "1234760039",
            "https://example.com/cb",
        )
        .with_payer_payment_reference("0123456789");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["originalPaymentReference"], "6D6CD7406ECE4542A80152D909EF9F6B");
        assert_eq!(value["payerPaymentReference"], "0123456789");
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_payment_record_timestamps() {
        let record = PaymentRecord {
            date_created: Some("2015-02-19T22:01:53+01:00".to_string()),
            date_paid: Some("not a date".to_string()),
            ..PaymentRecord::default()
        };

        let created = record.created_at().unwrap();
        assert_eq!(created.timestamp(), 1424379713);
        assert!(record.paid_at().is_none());
    }

    #[test]
    fn test_api_error_body_accepts_null_information() {
        let errors: Vec<ApiErrorBody> = serde_json::from_str(
            r#"[{"errorCode":"RF02","errorMessage":"M","additionalInformation":null}]"#,
        )
        .unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_code, "RF02");
        assert_eq!(errors[0].additional_information, None);

        let err = SwishError::from(errors[0].clone());
        assert_eq!(err.to_string(), "M");
    }
}
