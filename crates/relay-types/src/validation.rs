//! Request schema validation for the relay API.
//!
//! Inbound requests arrive as loosely typed strings. They are checked here
//! against the expected shapes and converted into domain types, so the
//! relay itself only ever sees well-formed input.

use crate::authorization::{AuthorizationKind, AuthorizationMessage};
use alloy::primitives::{Address, Bytes, B256, U256};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static ADDRESS_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address pattern"));
static BYTES32_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{64}$").expect("valid bytes32 pattern"));
static SIGNATURE_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{130}$").expect("valid signature pattern"));
static DECIMAL_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\d+$").expect("valid decimal pattern"));

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
	pub field: String,
	pub message: String,
}

impl FieldError {
	fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			message: message.into(),
		}
	}
}

/// All field errors found in one request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Request validation failed")?;
		for (i, error) in self.0.iter().enumerate() {
			let sep = if i == 0 { ": " } else { ", " };
			write!(f, "{}{} ({})", sep, error.field, error.message)?;
		}
		Ok(())
	}
}

impl ValidationErrors {
	pub fn fields(&self) -> &[FieldError] {
		&self.0
	}
}

/// Raw authorization message as received over HTTP.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationMessageInput {
	pub from: Option<String>,
	pub to: Option<String>,
	pub value: Option<String>,
	pub valid_after: Option<String>,
	pub valid_before: Option<String>,
	pub nonce: Option<String>,
}

/// Raw body of an execute request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteAuthorizationInput {
	pub message: Option<AuthorizationMessageInput>,
	pub signature: Option<String>,
	#[serde(rename = "type")]
	pub kind: Option<String>,
}

/// A fully validated execute request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteAuthorization {
	pub message: AuthorizationMessage,
	pub signature: Bytes,
	pub kind: AuthorizationKind,
}

/// Collects field errors while converting a request.
#[derive(Default)]
struct Checker {
	errors: Vec<FieldError>,
}

impl Checker {
	fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
		match value.as_deref() {
			Some(v) => Some(v),
			None => {
				self.errors.push(FieldError::new(field, "Required"));
				None
			}
		}
	}

	fn address(&mut self, field: &str, value: &Option<String>) -> Option<Address> {
		let raw = self.required(field, value)?;
		if !ADDRESS_PATTERN.is_match(raw) {
			self.errors
				.push(FieldError::new(field, "Invalid Ethereum address"));
			return None;
		}
		Address::from_str(raw).ok()
	}

	fn bytes32(&mut self, field: &str, value: &Option<String>) -> Option<B256> {
		let raw = self.required(field, value)?;
		if !BYTES32_PATTERN.is_match(raw) {
			self.errors.push(FieldError::new(field, "Invalid bytes32"));
			return None;
		}
		B256::from_str(raw).ok()
	}

	fn uint(&mut self, field: &str, value: &Option<String>, message: &str) -> Option<U256> {
		let raw = self.required(field, value)?;
		if !DECIMAL_PATTERN.is_match(raw) {
			self.errors.push(FieldError::new(field, message));
			return None;
		}
		match U256::from_str_radix(raw, 10) {
			Ok(v) => Some(v),
			Err(_) => {
				self.errors
					.push(FieldError::new(field, "Value does not fit in uint256"));
				None
			}
		}
	}

	fn signature(&mut self, field: &str, value: &Option<String>) -> Option<Bytes> {
		let raw = self.required(field, value)?;
		if !SIGNATURE_PATTERN.is_match(raw) {
			self.errors.push(FieldError::new(field, "Invalid signature"));
			return None;
		}
		hex::decode(&raw[2..]).ok().map(Bytes::from)
	}

	fn kind(&mut self, field: &str, value: &Option<String>) -> Option<AuthorizationKind> {
		let raw = self.required(field, value)?;
		let kind = AuthorizationKind::from_tag(raw);
		if kind.is_none() {
			self.errors.push(FieldError::new(
				field,
				"Expected 'transfer' or 'receive'",
			));
		}
		kind
	}
}

impl ExecuteAuthorizationInput {
	/// Checks every field and converts the request into domain types.
	///
	/// All field errors are reported together.
	pub fn validate(&self) -> Result<ExecuteAuthorization, ValidationErrors> {
		let mut checker = Checker::default();
		let empty = AuthorizationMessageInput::default();

		let input = match &self.message {
			Some(message) => message,
			None => {
				checker.errors.push(FieldError::new("message", "Required"));
				&empty
			}
		};

		let (from, to, value, valid_after, valid_before, nonce) = if self.message.is_some() {
			(
				checker.address("message.from", &input.from),
				checker.address("message.to", &input.to),
				checker.uint("message.value", &input.value, "Invalid amount"),
				checker.uint("message.validAfter", &input.valid_after, "Invalid timestamp"),
				checker.uint("message.validBefore", &input.valid_before, "Invalid timestamp"),
				checker.bytes32("message.nonce", &input.nonce),
			)
		} else {
			(None, None, None, None, None, None)
		};
		let signature = checker.signature("signature", &self.signature);
		let kind = checker.kind("type", &self.kind);

		match (
			from,
			to,
			value,
			valid_after,
			valid_before,
			nonce,
			signature,
			kind,
		) {
			(
				Some(from),
				Some(to),
				Some(value),
				Some(valid_after),
				Some(valid_before),
				Some(nonce),
				Some(signature),
				Some(kind),
			) if checker.errors.is_empty() => Ok(ExecuteAuthorization {
				message: AuthorizationMessage {
					from,
					to,
					value,
					valid_after,
					valid_before,
					nonce,
				},
				signature,
				kind,
			}),
			_ => Err(ValidationErrors(checker.errors)),
		}
	}
}

/// Parses an `authorizer` query parameter.
pub fn parse_address(field: &str, raw: &str) -> Result<Address, ValidationErrors> {
	let mut checker = Checker::default();
	checker
		.address(field, &Some(raw.to_string()))
		.ok_or(ValidationErrors(checker.errors))
}

/// Parses a nonce or transaction hash parameter.
pub fn parse_bytes32(field: &str, raw: &str) -> Result<B256, ValidationErrors> {
	let mut checker = Checker::default();
	checker
		.bytes32(field, &Some(raw.to_string()))
		.ok_or(ValidationErrors(checker.errors))
}
