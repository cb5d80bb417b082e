//! A client for the [Rackspace Cloud Identity](https://docs.rackspace.com/docs/cloud-identity/)
//! and [Cloud Files](https://docs.rackspace.com/docs/cloud-files/) APIs.
//!
//! Using the API is a two step process.  First the account credentials are exchanged for
//! an authenticated session (an [`Access`]) by an [`Identity`]:
//!
//! [`Access`]: crate::access::Access
//! [`Identity`]: crate::auth::Identity
//!
//! ```ignore
//! use rackspace::auth::{Account, Identity};
//!
//! let mut identity = Identity::rackspace(Account::new("demoauthor", "0123456789abcdef"));
//! identity.authenticate().await?;
//!
//! // A rejected login is not an error, the access is simply left empty
//! if !identity.is_authenticated() {
//!     panic!("bad credentials");
//! }
//! ```
//!
//! The access contains the bearer token and a catalog of the services (and regional
//! endpoints) the account may use.  The token id and a Cloud Files endpoint are then
//! passed to the container functions:
//!
//! ```ignore
//! use rackspace::access::Interface;
//! use rackspace::client::{all_containers, create_container};
//!
//! let access = identity.access();
//! let endpoint = access
//!     .cloud_files_endpoint(Some("DFW"), Interface::Public)
//!     .expect("no Cloud Files endpoint in DFW");
//!
//! create_container(endpoint, &access.token.id, "photos").await?;
//! for container in all_containers(endpoint, &access.token.id).await? {
//!     println!("{} ({} objects, {} bytes)", container.name, container.count, container.bytes);
//! }
//! ```
//!
//! The same operations are available through a [`CloudFilesClient`], which keeps the
//! endpoint and token together:
//!
//! [`CloudFilesClient`]: crate::client::CloudFilesClient
//!
//! ```ignore
//! use rackspace::client::{CloudFilesApi, CloudFilesClient};
//!
//! let client = CloudFilesClient::from_access(identity.access(), None, Default::default())
//!     .expect("no Cloud Files endpoint in the default region");
//! if !client.container_exists("photos").await {
//!     client.create_container("photos").await?;
//! }
//! ```
//!
//! Log events are emitted through [`tracing`](https://docs.rs/tracing); install a
//! subscriber in your application to see them.

pub mod access;
pub mod auth;
pub mod client;
pub mod error;
mod transport;
