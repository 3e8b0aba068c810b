//! Local token validation and summaries for configured credentials.
//!
//! Validation never fails: every outcome, including malformed input, is reported through
//! [`TokenValidation`]. Opaque API keys (no `.` separators) are accepted on length alone,
//! while JWTs are checked against their `exp` and `nbf` claims.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	auth::{Claims, ClaimsError},
};

/// Minimum length accepted for opaque (non-JWT) tokens.
pub const MIN_OPAQUE_TOKEN_LEN: usize = 10;

const BEARER_PREFIX: &str = "bearer";

/// Reason a token failed local validation.
#[derive(Debug, ThisError)]
pub enum InvalidToken {
	/// No credential was supplied.
	#[error("Auth token is empty")]
	Empty,
	/// Opaque token is shorter than [`MIN_OPAQUE_TOKEN_LEN`].
	#[error("Auth token is too short ({length} characters); expected at least 10.")]
	TooShort {
		/// Character count of the rejected token.
		length: usize,
	},
	/// Token looks like a JWT but its payload cannot be read.
	#[error("Auth token is not a valid JWT: {0}")]
	Malformed(ClaimsError),
	/// JWT `exp` claim is in the past.
	#[error("Auth token expired at {}.", rfc3339(.at))]
	Expired {
		/// Expiration instant.
		at: OffsetDateTime,
	},
	/// JWT `nbf` claim is in the future.
	#[error("Auth token is not valid until {}.", rfc3339(.at))]
	NotYetValid {
		/// Not-before instant.
		at: OffsetDateTime,
	},
}

/// Outcome of [`validate_token`].
#[derive(Debug)]
pub enum TokenValidation {
	/// Token passed every local check.
	Valid {
		/// Decoded claims; `None` for opaque tokens.
		claims: Option<Claims>,
	},
	/// Token failed a local check.
	Invalid {
		/// Why the token was rejected.
		reason: InvalidToken,
	},
}
impl TokenValidation {
	/// Returns `true` for [`TokenValidation::Valid`].
	pub fn is_valid(&self) -> bool {
		matches!(self, Self::Valid { .. })
	}

	/// Returns the decoded claims of a valid JWT.
	pub fn claims(&self) -> Option<&Claims> {
		match self {
			Self::Valid { claims } => claims.as_ref(),
			Self::Invalid { .. } => None,
		}
	}

	/// Returns the rejection reason of an invalid token.
	pub fn reason(&self) -> Option<&InvalidToken> {
		match self {
			Self::Valid { .. } => None,
			Self::Invalid { reason } => Some(reason),
		}
	}

	/// Human-readable rejection message, if any.
	pub fn message(&self) -> Option<String> {
		self.reason().map(ToString::to_string)
	}
}
impl From<InvalidToken> for TokenValidation {
	fn from(reason: InvalidToken) -> Self {
		Self::Invalid { reason }
	}
}

/// Summary of a decodable JWT.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenInfo {
	/// Decoded claims.
	pub claims: Claims,
	/// Expiration instant, if present.
	pub expires_at: Option<OffsetDateTime>,
	/// Not-before instant, if present.
	pub not_before: Option<OffsetDateTime>,
	/// Whether the token had expired at the observation instant.
	pub is_expired: bool,
	/// Whether the token had become active at the observation instant.
	pub is_active: bool,
	/// Remaining lifetime at the observation instant; negative once expired, zero without `exp`.
	pub expires_in: Duration,
}

/// Validates `token` against the current UTC clock.
pub fn validate_token(token: &str) -> TokenValidation {
	validate_token_at(token, OffsetDateTime::now_utc())
}

/// Validates `token` as observed at `now`.
pub fn validate_token_at(token: &str, now: OffsetDateTime) -> TokenValidation {
	if token.is_empty() {
		return InvalidToken::Empty.into();
	}

	let token = strip_bearer(token);

	if !token.contains('.') {
		let length = token.chars().count();

		return if length >= MIN_OPAQUE_TOKEN_LEN {
			TokenValidation::Valid { claims: None }
		} else {
			InvalidToken::TooShort { length }.into()
		};
	}

	let claims = match Claims::decode(token) {
		Ok(claims) => claims,
		Err(e) => return InvalidToken::Malformed(e).into(),
	};

	if let Some(at) = claims.expires_at().filter(|_| claims.is_expired_at(now)) {
		return InvalidToken::Expired { at }.into();
	}
	if let Some(at) = claims.not_before().filter(|_| !claims.is_active_at(now)) {
		return InvalidToken::NotYetValid { at }.into();
	}

	TokenValidation::Valid { claims: Some(claims) }
}

/// Summarizes `token` against the current UTC clock; `None` if it is not a decodable JWT.
pub fn token_info(token: &str) -> Option<TokenInfo> {
	token_info_at(token, OffsetDateTime::now_utc())
}

/// Summarizes `token` as observed at `now`; `None` if it is not a decodable JWT.
pub fn token_info_at(token: &str, now: OffsetDateTime) -> Option<TokenInfo> {
	let claims = match Claims::decode(strip_bearer(token)) {
		Ok(claims) => claims,
		Err(_e) => {
			#[cfg(feature = "tracing")]
			tracing::debug!(error = %_e, "auth token is not a decodable JWT");

			return None;
		},
	};

	Some(TokenInfo {
		expires_at: claims.expires_at(),
		not_before: claims.not_before(),
		is_expired: claims.is_expired_at(now),
		is_active: claims.is_active_at(now),
		expires_in: claims.time_to_expiry_at(now),
		claims,
	})
}

/// Removes a leading, case-insensitive `Bearer ` prefix.
pub fn strip_bearer(token: &str) -> &str {
	let Some(head) = token.get(..BEARER_PREFIX.len()) else {
		return token;
	};

	if !head.eq_ignore_ascii_case(BEARER_PREFIX) {
		return token;
	}

	let rest = &token[BEARER_PREFIX.len()..];

	if rest.starts_with(|c: char| c.is_ascii_whitespace()) {
		rest.trim_start_matches(|c: char| c.is_ascii_whitespace())
	} else {
		token
	}
}

fn rfc3339(at: &OffsetDateTime) -> String {
	at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;
	use crate::_preludet::encode_test_jwt;

	const NOW: OffsetDateTime = macros::datetime!(2025-06-01 12:00 UTC);

	#[test]
	fn empty_token_is_rejected_with_fixed_message() {
		let outcome = validate_token_at("", NOW);

		assert!(matches!(outcome.reason(), Some(InvalidToken::Empty)));
		assert_eq!(outcome.message().as_deref(), Some("Auth token is empty"));
	}

	#[test]
	fn opaque_tokens_are_checked_by_length() {
		assert!(validate_token_at("adm_0123456", NOW).is_valid());
		assert!(validate_token_at("0123456789", NOW).is_valid());

		let short = validate_token_at("short", NOW);

		assert!(matches!(short.reason(), Some(InvalidToken::TooShort { length: 5 })));
		assert!(short.message().is_some_and(|message| message.contains('5')));
		assert!(validate_token_at("adm_0123456", NOW).claims().is_none());
	}

	#[test]
	fn bearer_prefix_is_stripped_case_insensitively() {
		assert_eq!(strip_bearer("Bearer abc"), "abc");
		assert_eq!(strip_bearer("bEaReR   abc"), "abc");
		assert_eq!(strip_bearer("Bearerabc"), "Bearerabc");
		assert_eq!(strip_bearer("abc"), "abc");
		assert!(matches!(
			validate_token_at("Bearer short", NOW).reason(),
			Some(InvalidToken::TooShort { length: 5 })
		));
	}

	#[test]
	fn expired_jwt_reports_iso_timestamp() {
		let token = encode_test_jwt(&json!({ "sub": "u", "exp": 1_735_689_600 }));
		let outcome = validate_token_at(&format!("Bearer {token}"), NOW);

		assert!(matches!(outcome.reason(), Some(InvalidToken::Expired { .. })));
		assert_eq!(
			outcome.message().as_deref(),
			Some("Auth token expired at 2025-01-01T00:00:00Z.")
		);
	}

	#[test]
	fn future_nbf_is_rejected() {
		let token = encode_test_jwt(&json!({ "nbf": 1_767_225_600 }));
		let outcome = validate_token_at(&token, NOW);

		assert!(matches!(outcome.reason(), Some(InvalidToken::NotYetValid { .. })));
		assert_eq!(
			outcome.message().as_deref(),
			Some("Auth token is not valid until 2026-01-01T00:00:00Z.")
		);
	}

	#[test]
	fn expiry_is_checked_before_not_before() {
		let token = encode_test_jwt(&json!({ "exp": 1_735_689_600, "nbf": 1_767_225_600 }));

		assert!(matches!(
			validate_token_at(&token, NOW).reason(),
			Some(InvalidToken::Expired { .. })
		));
	}

	#[test]
	fn live_jwt_returns_claims() {
		let token = encode_test_jwt(&json!({ "sub": "svc", "exp": 1_767_225_600 }));
		let outcome = validate_token_at(&token, NOW);

		assert!(outcome.is_valid());
		assert_eq!(outcome.claims().and_then(|claims| claims.sub.as_deref()), Some("svc"));
	}

	#[test]
	fn malformed_jwt_is_invalid_not_an_error() {
		let outcome = validate_token_at("a.b", NOW);

		assert!(matches!(
			outcome.reason(),
			Some(InvalidToken::Malformed(ClaimsError::SegmentCount { found: 2 }))
		));
	}

	#[test]
	fn out_of_range_exp_is_malformed_without_panicking() {
		let token = encode_test_jwt(&json!({ "sub": "u", "exp": 1e300 }));

		assert!(matches!(
			validate_token_at(&token, NOW).reason(),
			Some(InvalidToken::Malformed(ClaimsError::Json(_)))
		));
		assert!(token_info_at(&token, NOW).is_none());
	}

	#[test]
	fn numeric_subject_and_audience_still_validate() {
		let token = encode_test_jwt(&json!({ "sub": 42, "aud": 7, "exp": 1_767_225_600 }));
		let outcome = validate_token_at(&token, NOW);

		assert!(outcome.is_valid(), "{outcome:?}");

		let info = token_info_at(&token, NOW).expect("Mistyped subject should still summarize.");

		assert!(info.claims.sub.is_none());
		assert_eq!(info.claims.extra.get("sub"), Some(&json!(42)));
		assert_eq!(info.claims.extra.get("aud"), Some(&json!(7)));
	}

	#[test]
	fn token_info_summarizes_or_returns_none() {
		let token = encode_test_jwt(&json!({ "exp": 1_767_225_600 }));
		let info = token_info_at(&token, NOW).expect("Live token should summarize.");

		assert!(!info.is_expired);
		assert!(info.is_active);
		assert_eq!(info.expires_at, Some(macros::datetime!(2026-01-01 00:00 UTC)));
		assert_eq!(info.expires_in, macros::datetime!(2026-01-01 00:00 UTC) - NOW);
		assert!(token_info_at("opaque-api-key", NOW).is_none());
		assert!(token_info_at("", NOW).is_none());

		let timeless = encode_test_jwt(&json!({ "sub": "x" }));
		let info = token_info_at(&timeless, NOW).expect("Claims without exp should summarize.");

		assert_eq!(info.expires_in, Duration::ZERO);
		assert!(!info.is_expired);
	}
}
