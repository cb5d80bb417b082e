//! A Rust definition of the Cloud Files container API and a client to access it
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    access::{null_as_default, Access, Interface},
    error::{RackspaceError, Result},
    transport::{add_auth_headers, read_json, GLOBAL_CLIENT},
};

/// A storage container
///
/// The CDN fields are empty for containers that have never been published
/// to the CDN.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Container {
    /// Unique per account and region
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// The number of objects in the container
    #[serde(deserialize_with = "null_as_default")]
    pub count: u64,
    /// The total size of the objects in bytes
    #[serde(deserialize_with = "null_as_default")]
    pub bytes: u64,
    #[serde(rename = "cdn_uri", deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(rename = "cdn_streaming_uri", deserialize_with = "null_as_default")]
    pub streaming_uri: String,
    #[serde(rename = "cdn_ios_uri", deserialize_with = "null_as_default")]
    pub ios_uri: String,
    #[serde(rename = "cdn_ssl_uri", deserialize_with = "null_as_default")]
    pub ssl_uri: String,
    #[serde(rename = "cdn_enabled", deserialize_with = "null_as_default")]
    pub enabled: bool,
    /// How long (in seconds) the CDN caches objects
    #[serde(deserialize_with = "null_as_default")]
    pub ttl: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub log_retention: bool,
}

/// Lists every container in the account.
///
/// # Arguments
///
/// * `endpoint` - The storage URL for the account, as found in the service catalog
/// * `auth_token` - The token id from an authenticated [`Access`]
///
/// The response status is not checked.  A request rejected with an empty or
/// error shaped body comes back as an empty list or a decode error.
pub async fn all_containers(endpoint: &str, auth_token: &str) -> Result<Vec<Container>> {
    tracing::debug!(endpoint, "listing containers");

    let request = GLOBAL_CLIENT.get(format!("{}?format=json", endpoint));
    let response = add_auth_headers(request, auth_token).send().await?;

    read_json::<Vec<Container>>(response).await
}

/// Checks for a container by exact (case sensitive) name, returning any
/// error raised while listing the containers.
pub async fn try_container_exists(endpoint: &str, auth_token: &str, name: &str) -> Result<bool> {
    let containers = all_containers(endpoint, auth_token).await?;
    Ok(containers.iter().any(|container| container.name == name))
}

/// Checks for a container by exact (case sensitive) name.
///
/// A failure to list the containers is logged and reported as `false`, so a
/// false result does not prove the container is absent.  Use
/// [`try_container_exists`] to tell the two apart.
pub async fn container_exists(endpoint: &str, auth_token: &str, name: &str) -> bool {
    match try_container_exists(endpoint, auth_token, name).await {
        Ok(exists) => exists,
        Err(err) => {
            tracing::warn!(endpoint, name, error = %err, "container_exists: listing failed");
            false
        }
    }
}

/// Creates a container.
///
/// Only 200 and 202 count as success, any other status (201 included) is
/// returned as [`RackspaceError::CreateContainerFailed`].  The service treats
/// creating an existing container as a success.
///
/// An empty name is rejected with [`RackspaceError::InvalidInput`] before any
/// request is made.  Sending it would `PUT` to the account URL itself
/// (`endpoint/`), which is not a container create.
pub async fn create_container(endpoint: &str, auth_token: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RackspaceError::required("name"));
    }
    tracing::debug!(endpoint, name, "creating container");

    let request = GLOBAL_CLIENT.put(format!("{}/{}", endpoint, name));
    let response = add_auth_headers(request, auth_token).send().await?;

    let status = response.status();
    // Drain the body so the connection can be reused
    response.bytes().await?;

    if status != StatusCode::OK && status != StatusCode::ACCEPTED {
        Err(RackspaceError::create_failed(name, status))
    } else {
        Ok(())
    }
}

/// Container functions of the Cloud Files API
#[async_trait]
pub trait CloudFilesApi {
    /// Lists the containers in the account
    ///
    /// # Returns
    ///
    /// The containers in the order the service returns them
    async fn list_containers(&self) -> Result<Vec<Container>>;

    /// Checks if a container exists
    ///
    /// # Arguments
    ///
    /// * `name` - The exact name of the container
    ///
    /// # Returns
    ///
    /// True if the container was found.  False if it was not found or the
    /// containers could not be listed.
    async fn container_exists(&self, name: &str) -> bool;

    /// Creates a container
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the new container
    ///
    /// # Returns
    ///
    /// None
    async fn create_container(&self, name: &str) -> Result<()>;
}

/// A client bound to one storage endpoint and token
pub struct CloudFilesClient {
    /// The storage URL for the account in one region
    endpoint: String,
    /// The token id sent in the X-Auth-Token header
    auth_token: String,
}

// Custom implementation of Debug to avoid printing the token
impl std::fmt::Debug for CloudFilesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudFilesClient")
            .field("endpoint", &self.endpoint)
            .field("auth_token", &"**********")
            .finish()
    }
}

impl CloudFilesClient {
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
        }
    }

    /// Creates a client from an authenticated session
    ///
    /// If `region` is None the user's default region is used.  Returns None if
    /// the catalog has no Cloud Files endpoint for the region.
    pub fn from_access(access: &Access, region: Option<&str>, interface: Interface) -> Option<Self> {
        let endpoint = access.cloud_files_endpoint(region, interface)?;
        Some(Self::new(endpoint, access.token.id.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CloudFilesApi for CloudFilesClient {
    async fn list_containers(&self) -> Result<Vec<Container>> {
        all_containers(&self.endpoint, &self.auth_token).await
    }

    async fn container_exists(&self, name: &str) -> bool {
        container_exists(&self.endpoint, &self.auth_token, name).await
    }

    async fn create_container(&self, name: &str) -> Result<()> {
        create_container(&self.endpoint, &self.auth_token, name).await
    }
}
