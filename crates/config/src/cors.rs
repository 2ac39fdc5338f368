use ascii::AsciiString;
use duration_str::deserialize_option_duration;
use std::time::Duration;
use url::Url;

use crate::Environment;

/// Origins of the canvas frontend during local development.
const DEVELOPMENT_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:3001"];

/// Configuration for CORS (Cross-Origin Resource Sharing)
#[derive(Clone, Default, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// If false (or not defined), credentials are not allowed in requests
    pub allow_credentials: bool,
    /// Origins from which we allow requests
    pub allow_origins: Option<AnyOrUrlArray>,
    /// Maximum time between OPTIONS and the next request
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub max_age: Option<Duration>,
    /// HTTP methods allowed to the endpoint.
    pub allow_methods: Option<AnyOrHttpMethodArray>,
    /// Headers allowed in incoming requests
    pub allow_headers: Option<AnyOrAsciiStringArray>,
    /// Headers exposed from the OPTIONS request
    pub expose_headers: Option<AnyOrAsciiStringArray>,
    /// If set, allows browsers from private network to connect
    pub allow_private_network: bool,
}

impl CorsConfig {
    /// The CORS policy used when the configuration has no `[server.cors]` section.
    ///
    /// Development allows the local frontend with credentials. Production allows
    /// no cross-origin requests until origins are configured explicitly.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => {
                let origins = DEVELOPMENT_ORIGINS
                    .iter()
                    .filter_map(|origin| Url::parse(origin).ok())
                    .collect();

                CorsConfig {
                    allow_credentials: true,
                    allow_origins: Some(AnyOrArray::Explicit(origins)),
                    allow_methods: Some(AnyOrArray::Explicit(vec![HttpMethod::Get, HttpMethod::Post])),
                    allow_headers: Some(AnyOrArray::Explicit(
                        ["content-type", "authorization"]
                            .into_iter()
                            .filter_map(|header| AsciiString::from_ascii(header).ok())
                            .collect(),
                    )),
                    ..Default::default()
                }
            }
            Environment::Production => CorsConfig::default(),
        }
    }
}

/// Represents a standard HTTP method.
#[derive(Debug, PartialEq, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
    /// CONNECT
    Connect,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "CONNECT" => Ok(HttpMethod::Connect),
            "PATCH" => Ok(HttpMethod::Patch),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(format!("Unknown HTTP method: {s}")),
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
            HttpMethod::Connect => http::Method::CONNECT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Trace => http::Method::TRACE,
        }
    }
}

/// A type alias for `AnyOrArray` specifically for `Url` types.
pub type AnyOrUrlArray = AnyOrArray<Url>;

/// A type alias for `AnyOrArray` specifically for `HttpMethod` types.
pub type AnyOrHttpMethodArray = AnyOrArray<HttpMethod>;

/// A type alias for `AnyOrArray` specifically for `AsciiString` types.
pub type AnyOrAsciiStringArray = AnyOrArray<AsciiString>;

/// Either the wildcard `*` or an explicit list of values.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyOrArray<T> {
    /// Indicates that any value is allowed (e.g., `*`).
    Any,
    /// A specific, explicit list of allowed values.
    Explicit(Vec<T>),
}

impl<'de, T> serde::Deserialize<'de> for AnyOrArray<T>
where
    T: serde::Deserialize<'de> + std::str::FromStr<Err: std::fmt::Display>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AnyOrArrayVisitor<T> {
            _marker: std::marker::PhantomData<T>,
        }

        impl<'de, T> serde::de::Visitor<'de> for AnyOrArrayVisitor<T>
        where
            T: serde::Deserialize<'de> + std::str::FromStr<Err: std::fmt::Display>,
        {
            type Value = AnyOrArray<T>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("expecting string \"*\", or an array of values")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if value == "*" {
                    return Ok(AnyOrArray::Any);
                }

                value
                    .parse::<T>()
                    .map_err(E::custom)
                    .map(|value| AnyOrArray::Explicit(vec![value]))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut array = Vec::with_capacity(seq.size_hint().unwrap_or_default());

                while let Some(value) = seq.next_element()? {
                    array.push(value);
                }

                Ok(AnyOrArray::Explicit(array))
            }
        }

        deserializer.deserialize_any(AnyOrArrayVisitor {
            _marker: std::marker::PhantomData,
        })
    }
}
