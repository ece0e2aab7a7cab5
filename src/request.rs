//! Request descriptors: method, resolved URL, query parameters, headers, and body source.
//!
//! A [`RequestDescriptor`] is a transient value built per call and consumed once by
//! [`RequestDescriptor::into_wire`]. Nothing is validated or encoded until then, so every
//! construction failure surfaces before any network call is made.

// crates.io
use reqwest::{
	Method, Request,
	header::{HeaderName, HeaderValue},
};
// self
use crate::{_prelude::*, error::RequestConstructionError};

/// Object-safe JSON encoder for request body objects.
pub trait EncodeBody
where
	Self: Send + Sync,
{
	/// Serializes the object as JSON.
	fn encode(&self) -> serde_json::Result<Vec<u8>>;
}
impl<T> EncodeBody for T
where
	T: Serialize + Send + Sync,
{
	fn encode(&self) -> serde_json::Result<Vec<u8>> {
		serde_json::to_vec(self)
	}
}

/// Body source of a request, resolved when the wire request is built.
pub enum Body {
	/// Bytes sent as-is.
	Raw(Vec<u8>),
	/// Object serialized to JSON at build time.
	Encodable(Box<dyn EncodeBody>),
}
impl Body {
	/// Wraps an object pending JSON serialization.
	pub fn encodable<T>(value: T) -> Self
	where
		T: 'static + Serialize + Send + Sync,
	{
		Self::Encodable(Box::new(value))
	}

	/// Resolves the body to the bytes that go on the wire.
	pub fn into_bytes(self) -> Result<Vec<u8>> {
		match self {
			Body::Raw(bytes) => Ok(bytes),
			Body::Encodable(value) =>
				value.encode().map_err(|source| Error::Serialization { source }),
		}
	}
}
impl Debug for Body {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Body::Raw(bytes) => f.debug_tuple("Body::Raw").field(&bytes.len()).finish(),
			Body::Encodable(_) => f.write_str("Body::Encodable(..)"),
		}
	}
}

/// Describes one request to the resource API.
#[derive(Debug)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// URL resolved from the API address and the caller's path.
	pub url: String,
	/// Query parameters in insertion order; keys may repeat.
	pub params: Vec<(String, String)>,
	/// Headers in insertion order, attached exactly as given.
	pub headers: Vec<(String, String)>,
	/// Optional body source.
	pub body: Option<Body>,
}
impl RequestDescriptor {
	/// Creates a descriptor with no parameters, headers, or body.
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self { method, url: url.into(), params: Vec::new(), headers: Vec::new(), body: None }
	}

	/// Appends a query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));

		self
	}

	/// Appends a header. Names and values are validated when the wire request is built.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Sets a raw body, replacing any previous body source.
	pub fn raw_body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
		self.body = Some(Body::Raw(bytes.into()));

		self
	}

	/// Sets an object to serialize as JSON, replacing any previous body source.
	pub fn json<T>(mut self, value: T) -> Self
	where
		T: 'static + Serialize + Send + Sync,
	{
		self.body = Some(Body::encodable(value));

		self
	}

	/// Replaces every header named `name` (case-insensitively) with a single value.
	pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
		self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
		self.headers.push((name.to_owned(), value.into()));
	}

	/// Builds the wire request.
	///
	/// Encodes an [`Body::Encodable`] object, appends query parameters in order, and attaches
	/// headers without adding any defaults. Paths with `.` or `..` segments are rejected, since
	/// they could not be sent as written.
	pub fn into_wire(self) -> Result<Request> {
		if has_dot_segment(&self.url) {
			return Err(RequestConstructionError::DotSegment { url: self.url }.into());
		}

		let mut url = Url::parse(&self.url).map_err(|source| {
			RequestConstructionError::InvalidUrl { url: self.url.clone(), source }
		})?;

		if !self.params.is_empty() {
			url.query_pairs_mut().extend_pairs(self.params.iter());
		}

		let mut request = Request::new(self.method, url);

		for (name, value) in self.headers {
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
				RequestConstructionError::InvalidHeaderName { name: name.clone() }
			})?;
			let header_value = HeaderValue::from_str(&value)
				.map_err(|_| RequestConstructionError::InvalidHeaderValue { name })?;

			request.headers_mut().append(header_name, header_value);
		}

		if let Some(body) = self.body {
			*request.body_mut() = Some(body.into_bytes()?.into());
		}

		Ok(request)
	}
}

fn has_dot_segment(url: &str) -> bool {
	let path = url.split(['?', '#']).next().unwrap_or_default();
	let path = match path.split_once("://") {
		Some((_, rest)) => rest.find('/').map_or("", |at| &rest[at..]),
		None => path,
	};

	path.split('/').any(|segment| {
		matches!(
			segment.to_ascii_lowercase().as_str(),
			"." | ".." | "%2e" | "%2e%2e" | ".%2e" | "%2e."
		)
	})
}
