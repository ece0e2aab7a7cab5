//! Client-level error types shared across configuration, token acquisition, and requests.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant carries the operation that failed and its underlying cause. The client never
/// retries on its own; callers decide whether a failure is worth another attempt.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token endpoint exchange failed.
	#[error(transparent)]
	TokenAcquisition(#[from] TokenAcquisitionError),
	/// Request body object could not be encoded.
	#[error("Request body could not be encoded as JSON: {source}.")]
	Serialization {
		/// Underlying encoder failure.
		#[source]
		source: serde_json::Error,
	},
	/// Request could not be assembled from its descriptor.
	#[error(transparent)]
	RequestConstruction(#[from] RequestConstructionError),
	/// Transport failure (DNS, TCP, TLS) while sending an API request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required field is missing or blank.
	#[error("Configuration field `{field}` is required.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// API address cannot be parsed as a URL.
	#[error("API address `{address}` is not a valid URL: {source}.")]
	InvalidApiAddress {
		/// Address as supplied.
		address: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// API address parsed, but is not an absolute http(s) base URL.
	#[error("API address `{address}` must be an absolute http or https URL.")]
	UnsupportedApiAddress {
		/// Address as supplied.
		address: String,
	},
	/// Grant override names a grant other than `client_credentials`.
	#[error("Grant type `{grant}` is not supported; only client_credentials is.")]
	UnsupportedGrant {
		/// Grant type as supplied.
		grant: String,
	},
	/// Boolean environment flag cannot be parsed.
	#[error("Configuration field `{field}` expects a boolean, got `{value}`.")]
	InvalidFlag {
		/// Name of the offending field.
		field: &'static str,
		/// Raw value as supplied.
		value: String,
	},
	/// Derived OAuth endpoint URL is invalid.
	#[error("OAuth endpoint URL `{url}` is invalid: {source}.")]
	InvalidEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed: {source}.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Token endpoint exchange failures. Display output always includes the underlying cause.
#[derive(Debug, ThisError)]
pub enum TokenAcquisitionError {
	/// Token endpoint answered with an OAuth error payload.
	#[error("Error getting bearer token: token endpoint rejected the request with {}.", describe_rejection(.error, .description, .status))]
	Rejected {
		/// OAuth `error` code.
		error: String,
		/// OAuth `error_description`, when supplied.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with a body that is not a valid token response.
	#[error("Error getting bearer token: token endpoint returned a malformed response{}: {source}.", describe_status(.status))]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded in a way the negotiation could not interpret.
	#[error("Error getting bearer token: {message}{}.", describe_status(.status))]
	UnexpectedResponse {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Network failure while calling the token endpoint.
	#[error("Error getting bearer token: network error while calling the token endpoint: {source}.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token request could not be assembled.
	#[error("Error getting bearer token: token request could not be built: {0}.")]
	Http(#[from] oauth2::http::Error),
	/// I/O failure while calling the token endpoint.
	#[error("Error getting bearer token: I/O error while calling the token endpoint: {0}.")]
	Io(#[from] std::io::Error),
}
impl TokenAcquisitionError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// HTTP status returned by the token endpoint, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. }
			| Self::MalformedResponse { status, .. }
			| Self::UnexpectedResponse { status, .. } => *status,
			_ => None,
		}
	}
}

/// Failures raised while turning a descriptor into a wire request.
#[derive(Debug, ThisError)]
pub enum RequestConstructionError {
	/// Resolved URL cannot be parsed.
	#[error("Request URL `{url}` is invalid: {source}.")]
	InvalidUrl {
		/// Resolved URL as built from the API address and path.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Path contains `.` or `..` segments, which URL parsing would collapse.
	#[error("Request URL `{url}` contains dot segments and cannot be sent verbatim.")]
	DotSegment {
		/// Resolved URL as built from the API address and path.
		url: String,
	},
	/// Header name is not a valid HTTP token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Header name as supplied.
		name: String,
	},
	/// Header value contains characters not allowed in HTTP headers.
	#[error("Value for header `{name}` is invalid.")]
	InvalidHeaderValue {
		/// Header name the value was supplied for.
		name: String,
	},
}

/// Transport-level failures while sending API requests.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {method} {url}: {source}.")]
	Network {
		/// Request method.
		method: String,
		/// Request URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: ReqwestError,
	},
}

/// Failures raised while decoding a response body.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body could not be read from the connection.
	#[error("Response body could not be read: {source}.")]
	Read {
		/// Underlying read failure.
		#[source]
		source: ReqwestError,
	},
	/// Body is not valid JSON for the requested shape.
	#[error("Response body is not valid JSON: {source}.")]
	Json {
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

fn describe_rejection(error: &str, description: &Option<String>, status: &Option<u16>) -> String {
	let mut buf = format!("`{error}`");

	if let Some(description) = description {
		buf.push_str(&format!(" ({description})"));
	}

	buf.push_str(&describe_status(status));

	buf
}

fn describe_status(status: &Option<u16>) -> String {
	status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}
