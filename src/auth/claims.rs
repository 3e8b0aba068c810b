//! JWT claim decoding and time-based claim checks.
//!
//! Signatures are never verified here; the Admiral API remains the authority on whether a
//! credential is accepted. These helpers only read the payload segment so callers can detect
//! expired or not-yet-valid tokens before issuing requests.

// crates.io
use base64::{
	Engine,
	alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::{Deserializer, Serializer, de::Error as DeError};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

// URL-safe alphabet; padding may be present or absent.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const JWT_SEGMENTS: usize = 3;

/// Errors raised while decoding a JWT payload.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// The token does not have the `header.payload.signature` shape.
	#[error("Invalid JWT format: expected 3 segments, found {found}.")]
	SegmentCount {
		/// Number of `.`-separated segments observed.
		found: usize,
	},
	/// The payload segment is not valid base64url.
	#[error("Failed to decode JWT payload: {0}.")]
	Base64(#[source] base64::DecodeError),
	/// The payload decodes but is not a JSON claims object.
	#[error("Failed to parse JWT payload: {0}.")]
	Json(#[source] serde_json::Error),
}

/// JWT `NumericDate`: seconds since the Unix epoch, kept with millisecond precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericDate(OffsetDateTime);
impl NumericDate {
	/// Builds a date from whole seconds since the epoch.
	pub fn from_unix_timestamp(secs: i64) -> Option<Self> {
		OffsetDateTime::from_unix_timestamp(secs).ok().map(Self)
	}

	/// Builds a date from possibly fractional seconds since the epoch.
	pub fn from_unix_seconds(secs: f64) -> Option<Self> {
		if !secs.is_finite() {
			return None;
		}

		// The cast saturates, so out-of-range inputs fail the multiplication below.
		let nanos = ((secs * 1_000.).round() as i128).checked_mul(1_000_000)?;

		OffsetDateTime::from_unix_timestamp_nanos(nanos).ok().map(Self)
	}

	/// Returns the instant as an [`OffsetDateTime`] in UTC.
	pub fn as_datetime(self) -> OffsetDateTime {
		self.0
	}

	/// Returns the whole seconds since the epoch.
	pub fn unix_timestamp(self) -> i64 {
		self.0.unix_timestamp()
	}
}
impl From<OffsetDateTime> for NumericDate {
	fn from(value: OffsetDateTime) -> Self {
		Self(value)
	}
}
impl Serialize for NumericDate {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let millis = self.0.unix_timestamp_nanos() / 1_000_000;

		if millis % 1_000 == 0 {
			serializer.serialize_i64(self.0.unix_timestamp())
		} else {
			serializer.serialize_f64(millis as f64 / 1_000.)
		}
	}
}
impl<'de> Deserialize<'de> for NumericDate {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let secs = f64::deserialize(deserializer)?;

		Self::from_unix_seconds(secs)
			.ok_or_else(|| D::Error::custom(format!("timestamp {secs} is out of range")))
	}
}

/// The `aud` claim, which JWTs encode either as one string or as a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
	/// Single audience value.
	One(String),
	/// Multiple audience values.
	Many(Vec<String>),
}
impl Audience {
	/// Returns `true` if `value` is one of the audiences.
	pub fn contains(&self, value: &str) -> bool {
		match self {
			Self::One(aud) => aud == value,
			Self::Many(auds) => auds.iter().any(|aud| aud == value),
		}
	}
}

/// Decoded JWT payload.
///
/// Registered claims are typed; anything else lands in [`Claims::extra`]. A string-valued
/// registered claim (`sub`, `iss`, `aud`, `jti`) carrying another JSON type is left as `None`
/// and kept verbatim in [`Claims::extra`]. Time claims must be numeric.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Claims {
	/// Subject (`sub`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	/// Issuer (`iss`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	/// Audience (`aud`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub aud: Option<Audience>,
	/// Expiration time (`exp`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exp: Option<NumericDate>,
	/// Not-before time (`nbf`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nbf: Option<NumericDate>,
	/// Issued-at time (`iat`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<NumericDate>,
	/// Token identifier (`jti`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jti: Option<String>,
	/// Private and unregistered claims.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl<'de> Deserialize<'de> for Claims {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let mut extra = Map::<String, Value>::deserialize(deserializer)?;
		let exp = take_numeric_date(&mut extra, "exp")?;
		let nbf = take_numeric_date(&mut extra, "nbf")?;
		let iat = take_numeric_date(&mut extra, "iat")?;

		Ok(Self {
			sub: take_string(&mut extra, "sub"),
			iss: take_string(&mut extra, "iss"),
			aud: take_audience(&mut extra),
			exp,
			nbf,
			iat,
			jti: take_string(&mut extra, "jti"),
			extra,
		})
	}
}
impl Claims {
	/// Decodes the payload segment of a compact JWT.
	pub fn decode(token: &str) -> Result<Self, ClaimsError> {
		let segments = token.split('.').collect::<Vec<_>>();

		if segments.len() != JWT_SEGMENTS {
			return Err(ClaimsError::SegmentCount { found: segments.len() });
		}

		let payload = PAYLOAD_ENGINE.decode(segments[1]).map_err(ClaimsError::Base64)?;

		serde_json::from_slice(&payload).map_err(ClaimsError::Json)
	}

	/// Returns the expiration instant, if the token carries one.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.exp.map(NumericDate::as_datetime)
	}

	/// Returns the not-before instant, if the token carries one.
	pub fn not_before(&self) -> Option<OffsetDateTime> {
		self.nbf.map(NumericDate::as_datetime)
	}

	/// Returns `true` once `now` reaches the expiration instant.
	///
	/// Tokens without `exp` never expire.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|exp| now >= exp)
	}

	/// Convenience helper that checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Time remaining until expiry; negative once expired, zero when `exp` is absent.
	pub fn time_to_expiry_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at().map_or(Duration::ZERO, |exp| exp - now)
	}

	/// Time remaining until expiry relative to the current UTC clock.
	pub fn time_to_expiry(&self) -> Duration {
		self.time_to_expiry_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` once `now` reaches the not-before instant.
	///
	/// Tokens without `nbf` are always active.
	pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
		self.not_before().is_none_or(|nbf| now >= nbf)
	}

	/// Convenience helper that checks not-before against the current UTC clock.
	pub fn is_active(&self) -> bool {
		self.is_active_at(OffsetDateTime::now_utc())
	}

	/// Time remaining until the token becomes active; zero when `nbf` is absent.
	pub fn time_to_activation_at(&self, now: OffsetDateTime) -> Duration {
		self.not_before().map_or(Duration::ZERO, |nbf| nbf - now)
	}
}

/// Decodes the claims of a compact JWT. See [`Claims::decode`].
pub fn decode_claims(token: &str) -> Result<Claims, ClaimsError> {
	Claims::decode(token)
}

fn take_string(claims: &mut Map<String, Value>, name: &str) -> Option<String> {
	match claims.remove(name)? {
		Value::String(value) => Some(value),
		Value::Null => None,
		other => {
			claims.insert(name.to_owned(), other);

			None
		},
	}
}

fn take_audience(claims: &mut Map<String, Value>) -> Option<Audience> {
	let value = claims.remove("aud")?;

	if value.is_null() {
		return None;
	}

	match Audience::deserialize(&value) {
		Ok(aud) => Some(aud),
		Err(_) => {
			claims.insert("aud".to_owned(), value);

			None
		},
	}
}

fn take_numeric_date<E>(
	claims: &mut Map<String, Value>,
	name: &str,
) -> Result<Option<NumericDate>, E>
where
	E: DeError,
{
	match claims.remove(name) {
		None | Some(Value::Null) => Ok(None),
		Some(value) => NumericDate::deserialize(value)
			.map(Some)
			.map_err(|e| E::custom(format!("invalid `{name}` claim: {e}"))),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
	use serde_json::json;
	use time::macros;
	// self
	use super::*;
	use crate::_preludet::encode_test_jwt;

	#[test]
	fn decode_reads_registered_and_private_claims() {
		let token = encode_test_jwt(&json!({
			"sub": "user-1",
			"iss": "https://auth.admiral.io",
			"aud": ["api", "cli"],
			"exp": 1_735_693_200,
			"tenant": "acme",
		}));
		let claims = Claims::decode(&token).expect("Claims fixture should decode.");

		assert_eq!(claims.sub.as_deref(), Some("user-1"));
		assert_eq!(claims.iss.as_deref(), Some("https://auth.admiral.io"));
		assert!(claims.aud.as_ref().is_some_and(|aud| aud.contains("cli")));
		assert_eq!(claims.expires_at(), Some(macros::datetime!(2025-01-01 01:00 UTC)));
		assert_eq!(claims.extra.get("tenant"), Some(&json!("acme")));
	}

	#[test]
	fn decode_rejects_wrong_segment_counts() {
		for (token, found) in [("a.b", 2), ("a.b.c.d", 4), ("nodots", 1)] {
			match Claims::decode(token) {
				Err(ClaimsError::SegmentCount { found: actual }) => assert_eq!(actual, found),
				other => panic!("Unexpected decode result for {token}: {other:?}."),
			}
		}
	}

	#[test]
	fn decode_reports_base64_and_json_failures() {
		assert!(matches!(Claims::decode("h.!!!.s"), Err(ClaimsError::Base64(_))));

		let not_json = URL_SAFE_NO_PAD.encode("not json");

		assert!(matches!(Claims::decode(&format!("h.{not_json}.s")), Err(ClaimsError::Json(_))));

		let not_object = URL_SAFE_NO_PAD.encode("[1,2,3]");

		assert!(matches!(Claims::decode(&format!("h.{not_object}.s")), Err(ClaimsError::Json(_))));
	}

	#[test]
	fn decode_accepts_padded_payloads() {
		// `{"sub":"a"}` is 11 bytes, so standard encoding needs one `=`.
		let padded = STANDARD.encode(br#"{"sub":"a"}"#);

		assert!(padded.ends_with('='));

		let claims =
			Claims::decode(&format!("h.{padded}.s")).expect("Padded payload should decode.");

		assert_eq!(claims.sub.as_deref(), Some("a"));
	}

	#[test]
	fn expiry_boundaries_follow_exp_claim() {
		let exp = macros::datetime!(2025-01-01 00:00 UTC);
		let claims = Claims { exp: Some(exp.into()), ..Default::default() };

		assert!(!claims.is_expired_at(exp - Duration::milliseconds(1)));
		assert!(claims.is_expired_at(exp));
		assert_eq!(claims.time_to_expiry_at(exp - Duration::minutes(5)), Duration::minutes(5));
		assert_eq!(claims.time_to_expiry_at(exp + Duration::seconds(3)), Duration::seconds(-3));
	}

	#[test]
	fn missing_time_claims_are_permissive() {
		let claims = Claims::default();
		let now = macros::datetime!(2030-06-01 12:00 UTC);

		assert!(!claims.is_expired_at(now));
		assert_eq!(claims.time_to_expiry_at(now), Duration::ZERO);
		assert!(claims.is_active_at(now));
		assert_eq!(claims.time_to_activation_at(now), Duration::ZERO);
	}

	#[test]
	fn not_before_mirrors_expiry() {
		let nbf = macros::datetime!(2025-03-01 00:00 UTC);
		let claims = Claims { nbf: Some(nbf.into()), ..Default::default() };

		assert!(!claims.is_active_at(nbf - Duration::seconds(1)));
		assert!(claims.is_active_at(nbf));
		assert_eq!(claims.time_to_activation_at(nbf - Duration::seconds(10)), Duration::seconds(10));
	}

	#[test]
	fn numeric_dates_keep_millisecond_precision() {
		let date: NumericDate =
			serde_json::from_str("1700000000.25").expect("Fractional timestamp should parse.");

		assert_eq!(date.as_datetime().millisecond(), 250);
		assert_eq!(serde_json::to_string(&date).expect("Date should serialize."), "1700000000.25");

		let whole: NumericDate =
			serde_json::from_str("1700000000").expect("Integer timestamp should parse.");

		assert_eq!(serde_json::to_string(&whole).expect("Date should serialize."), "1700000000");
		assert!(serde_json::from_str::<NumericDate>("\"soon\"").is_err());
	}

	#[test]
	fn huge_numeric_dates_are_out_of_range() {
		assert!(NumericDate::from_unix_seconds(1e300).is_none());
		assert!(NumericDate::from_unix_seconds(-1e300).is_none());
		assert!(NumericDate::from_unix_seconds(1e20).is_none());
		assert!(NumericDate::from_unix_seconds(f64::NAN).is_none());

		let token = encode_test_jwt(&json!({ "sub": "far-future", "exp": 1e300 }));

		assert!(matches!(Claims::decode(&token), Err(ClaimsError::Json(_))));
	}

	#[test]
	fn mistyped_string_claims_stay_in_extra() {
		let token = encode_test_jwt(&json!({
			"sub": 42,
			"aud": 7,
			"iss": null,
			"jti": ["a"],
			"exp": 4_102_444_800_i64,
		}));
		let claims =
			Claims::decode(&token).expect("Mistyped string claims should not fail decoding.");

		assert!(claims.sub.is_none());
		assert!(claims.aud.is_none());
		assert!(claims.iss.is_none());
		assert!(claims.jti.is_none());
		assert_eq!(claims.extra.get("sub"), Some(&json!(42)));
		assert_eq!(claims.extra.get("aud"), Some(&json!(7)));
		assert_eq!(claims.extra.get("jti"), Some(&json!(["a"])));
		assert!(!claims.extra.contains_key("iss"));
		assert_eq!(claims.expires_at(), Some(macros::datetime!(2100-01-01 00:00 UTC)));
	}

	#[test]
	fn registered_claims_do_not_leak_into_extra() {
		let token = encode_test_jwt(&json!({
			"sub": "user-1",
			"aud": "api",
			"nbf": 1_700_000_000,
			"iat": 1_700_000_000,
			"role": "admin",
		}));
		let claims = Claims::decode(&token).expect("Claims fixture should decode.");

		assert_eq!(claims.aud, Some(Audience::One("api".into())));
		assert!(claims.iat.is_some());
		assert_eq!(claims.extra.len(), 1);
		assert_eq!(claims.extra.get("role"), Some(&json!("admin")));
	}

	#[test]
	fn non_numeric_time_claims_fail_decoding() {
		let token = encode_test_jwt(&json!({ "exp": "tomorrow" }));

		match Claims::decode(&token) {
			Err(ClaimsError::Json(e)) => assert!(e.to_string().contains("`exp`"), "{e}"),
			other => panic!("Unexpected decode result: {other:?}."),
		}
	}
}
