//! The data returned by a successful authentication request
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The catalog name of the object storage service
pub const CLOUD_FILES_SERVICE: &str = "cloudFiles";

/// Which of an endpoint's two URLs to use
///
/// The internal URL is only reachable from inside the provider's network but
/// traffic over it is not billed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interface {
    #[default]
    Public,
    Internal,
}

/// One regional location of a service
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Endpoint {
    #[serde(rename = "internalURL", deserialize_with = "null_as_default")]
    pub internal_url: String,
    #[serde(rename = "publicURL", deserialize_with = "null_as_default")]
    pub public_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(rename = "tenantId", deserialize_with = "null_as_default")]
    pub tenant_id: String,
}

impl Endpoint {
    pub fn url(&self, interface: Interface) -> &str {
        match interface {
            Interface::Public => self.public_url.as_str(),
            Interface::Internal => self.internal_url.as_str(),
        }
    }
}

/// A service our permissions allow us to use, with one endpoint per region
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceCatalog {
    #[serde(deserialize_with = "null_as_default")]
    pub endpoints: Vec<Endpoint>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub service_type: String,
}

impl ServiceCatalog {
    /// Finds the endpoint for a region.  Region codes are compared without
    /// regard to case ("dfw" matches "DFW").
    pub fn endpoint_in_region(&self, region: &str) -> Option<&Endpoint> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.region.eq_ignore_ascii_case(region))
    }
}

/// The billing scope a token belongs to
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Tenant {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// The session token
#[derive(Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Token {
    #[serde(rename = "RAX-AUTH:authenticatedBy", deserialize_with = "null_as_default")]
    pub authenticated_by: Vec<String>,
    /// The expiry timestamp exactly as sent by the server
    #[serde(deserialize_with = "null_as_default")]
    pub expires: String,
    /// The bearer value to send with every storage request
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tenant: Tenant,
}

// Custom implementation of Debug to avoid printing the token id
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("authenticated_by", &self.authenticated_by)
            .field("expires", &self.expires)
            .field("id", &"**********")
            .field("tenant", &self.tenant)
            .finish()
    }
}

impl Token {
    /// The expiry time, if the server sent one we can parse
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expires)
            .ok()
            .map(|expires| expires.with_timezone(&Utc))
    }

    /// True if the token has expired by `now`.  A token without a readable
    /// expiry is never reported as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map_or(false, |expires| expires <= now)
    }
}

/// A role granted to the authenticated user
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Role {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "tenantId", alias = "tenanId", deserialize_with = "null_as_default")]
    pub tenant_id: String,
}

/// The profile of the authenticated user
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "RAX-AUTH:defaultRegion", deserialize_with = "null_as_default")]
    pub default_region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub roles: Vec<Role>,
}

/// Everything granted by an authentication request
///
/// A zero valued `Access` (empty token id) is what a rejected authentication
/// leaves behind, see [`Identity::authenticate`].
///
/// [`Identity::authenticate`]: crate::auth::Identity::authenticate
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Access {
    #[serde(rename = "serviceCatalog", deserialize_with = "null_as_default")]
    pub service_catalog: Vec<ServiceCatalog>,
    #[serde(deserialize_with = "null_as_default")]
    pub token: Token,
    #[serde(deserialize_with = "null_as_default")]
    pub user: User,
}

impl Access {
    /// Looks up a service by its catalog name (e.g. "cloudFiles")
    pub fn service(&self, name: &str) -> Option<&ServiceCatalog> {
        self.service_catalog.iter().find(|service| service.name == name)
    }

    /// Looks up the first service of a type (e.g. "object-store")
    pub fn service_by_type(&self, service_type: &str) -> Option<&ServiceCatalog> {
        self.service_catalog
            .iter()
            .find(|service| service.service_type == service_type)
    }

    /// The Cloud Files URL for a region
    ///
    /// If `region` is None then the user's default region is used.
    pub fn cloud_files_endpoint(&self, region: Option<&str>, interface: Interface) -> Option<&str> {
        let region = region.unwrap_or(&self.user.default_region);
        self.service(CLOUD_FILES_SERVICE)?
            .endpoint_in_region(region)
            .map(|endpoint| endpoint.url(interface))
    }
}

/// A JSON null leaves a field at its zero value, the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
