//! Exchanging account credentials for an authenticated session
use serde::{Deserialize, Serialize};

use crate::{
    access::{null_as_default, Access},
    error::Result,
    transport::{read_json, GLOBAL_CLIENT},
};

/// The public Rackspace Cloud Identity token endpoint
pub const DEFAULT_IDENTITY_URL: &str = "https://identity.api.rackspacecloud.com/v2.0/tokens";

/// The account credentials needed to authenticate
///
/// Nothing is validated here, bad credentials are only detected by the
/// identity service.
#[derive(Clone)]
pub struct Account {
    user: String,
    api_key: String,
}

// Custom implementation of Debug to avoid printing the api key
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("user", &self.user)
            .field("api_key", &"**********")
            .finish()
    }
}

impl Account {
    pub fn new(user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            api_key: api_key.into(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

#[derive(Debug, Serialize)]
struct ApiKeyCredentials<'a> {
    username: &'a str,
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

#[derive(Debug, Serialize)]
struct AuthCredentials<'a> {
    #[serde(rename = "RAX-KSKEY:apiKeyCredentials")]
    api_key_credentials: ApiKeyCredentials<'a>,
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    auth: AuthCredentials<'a>,
}

impl<'a> From<&'a Account> for AuthRequest<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            auth: AuthCredentials {
                api_key_credentials: ApiKeyCredentials {
                    username: &account.user,
                    api_key: &account.api_key,
                },
            },
        }
    }
}

// The identity service wraps the access data in one extra object
#[derive(Debug, Default, Deserialize)]
struct IdentityData {
    #[serde(default, deserialize_with = "null_as_default")]
    access: Access,
}

/// An account bound to an identity endpoint
///
/// After a call to [`Identity::authenticate`] the identity holds the
/// [`Access`] granted by the service.  Authenticating takes `&mut self` so
/// an identity shared between tasks needs to be wrapped in a lock by the
/// caller.
#[derive(Debug, Clone)]
pub struct Identity {
    url: String,
    account: Account,
    access: Access,
}

impl Identity {
    pub fn new(url: impl Into<String>, account: Account) -> Self {
        Self {
            url: url.into(),
            account,
            access: Access::default(),
        }
    }

    /// Creates an identity that authenticates against the public Rackspace endpoint
    pub fn rackspace(account: Account) -> Self {
        Self::new(DEFAULT_IDENTITY_URL, account)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The access granted by the last successful call to authenticate.
    ///
    /// Before authenticating this is a zero valued `Access`.
    pub fn access(&self) -> &Access {
        &self.access
    }

    /// True once a call to authenticate returned a token
    pub fn is_authenticated(&self) -> bool {
        !self.access.token.id.is_empty()
    }

    /// Creates an authenticated session
    ///
    /// Sends the account credentials to the identity endpoint and replaces the
    /// current access with the one in the response.
    ///
    /// The response status is not checked.  A rejected request whose body is
    /// valid JSON (e.g. `{}` or an error object) succeeds and leaves a zero
    /// valued access behind, so check [`Identity::is_authenticated`] afterwards.
    /// Transport and JSON errors are returned and leave the previous access
    /// untouched.
    pub async fn authenticate(&mut self) -> Result<()> {
        tracing::debug!(url = %self.url, user = %self.account.user, "authenticating");

        let response = GLOBAL_CLIENT
            .post(&self.url)
            .json(&AuthRequest::from(&self.account))
            .send()
            .await?;
        let status = response.status();

        let data = read_json::<IdentityData>(response).await?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "identity service rejected the request");
        }
        self.access = data.access;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use all_asserts::{assert_false, assert_true};
    use mockito::{Matcher, ServerGuard};
    use serde_json::json;

    use super::*;
    use crate::access::{ServiceCatalog, Token};
    use crate::error::RackspaceError;

    fn create_identity(server: &ServerGuard) -> Identity {
        Identity::new(
            format!("{}/v2.0/tokens", server.url()),
            Account::new("demoauthor", "0123456789abcdef"),
        )
    }

    fn mock_access(token_id: &str) -> Access {
        Access {
            service_catalog: vec![ServiceCatalog {
                name: "cloudFiles".to_string(),
                service_type: "object-store".to_string(),
                ..Default::default()
            }],
            token: Token {
                id: token_id.to_string(),
                expires: "2014-11-24T22:05:39.115Z".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn account_debug_hides_api_key() {
        let account = Account::new("demoauthor", "0123456789abcdef");
        let printed = format!("{:?}", account);

        assert_true!(printed.contains("demoauthor"));
        assert_false!(printed.contains("0123456789abcdef"));
    }

    #[test]
    fn account_accepts_anything() {
        let account = Account::new("", "");
        assert_eq!(account.user(), "");
    }

    #[tokio::test]
    async fn can_authenticate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "auth": {
                    "RAX-KSKEY:apiKeyCredentials": {
                        "username": "demoauthor",
                        "apiKey": "0123456789abcdef"
                    }
                }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "access": mock_access("abc-123") }).to_string())
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        assert_false!(identity.is_authenticated());

        identity.authenticate().await.unwrap();

        assert_true!(identity.is_authenticated());
        assert_eq!(identity.access().token.id, "abc-123");
        assert_eq!(identity.access(), &mock_access("abc-123"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn credentials_are_escaped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .match_body(Matcher::PartialJson(json!({
                "auth": {
                    "RAX-KSKEY:apiKeyCredentials": { "username": "quote\"user" }
                }
            })))
            .with_body("{}")
            .create_async()
            .await;

        let mut identity = Identity::new(
            format!("{}/v2.0/tokens", server.url()),
            Account::new("quote\"user", "key"),
        );
        identity.authenticate().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_authentication_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        identity.authenticate().await.unwrap();

        assert_eq!(identity.access(), &Access::default());
        assert_false!(identity.is_authenticated());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_payload_gives_empty_access() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .with_status(401)
            .with_body(r#"{"unauthorized": {"code": 401, "message": "Username or api key is invalid."}}"#)
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        identity.authenticate().await.unwrap();

        assert_eq!(identity.access().token.id, "");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_body_gives_empty_access() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        identity.authenticate().await.unwrap();

        assert_false!(identity.is_authenticated());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn null_body_gives_empty_access() {
        let mut server = mockito::Server::new_async().await;
        let null_body = server
            .mock("POST", "/v2.0/tokens")
            .with_status(401)
            .with_body("null")
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        identity.authenticate().await.unwrap();
        assert_eq!(identity.access(), &Access::default());
        null_body.assert_async().await;

        let mut null_access_server = mockito::Server::new_async().await;
        let null_access = null_access_server
            .mock("POST", "/v2.0/tokens")
            .with_body(r#"{"access": null}"#)
            .create_async()
            .await;

        identity.url = format!("{}/v2.0/tokens", null_access_server.url());
        identity.authenticate().await.unwrap();
        assert_false!(identity.is_authenticated());
        null_access.assert_async().await;
    }

    #[tokio::test]
    async fn null_fields_are_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .with_body(
                r#"{"access": {"serviceCatalog": null, "token": {"id": "abc", "tenant": null}, "user": {"roles": null}}}"#,
            )
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        identity.authenticate().await.unwrap();

        assert_eq!(identity.access().token.id, "abc");
        assert_true!(identity.access().user.roles.is_empty());
        mock.assert_async().await;
    }

    #[test]
    fn identity_debug_hides_secrets() {
        let mut identity = Identity::new(
            "http://127.0.0.1:1/v2.0/tokens",
            Account::new("demoauthor", "0123456789abcdef"),
        );
        identity.access = mock_access("abc-123");
        let printed = format!("{:?}", identity);

        assert_true!(printed.contains("demoauthor"));
        assert_false!(printed.contains("0123456789abcdef"));
        assert_false!(printed.contains("abc-123"));
    }

    #[tokio::test]
    async fn trailing_whitespace_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .with_body(format!("{}\n\n  ", json!({ "access": mock_access("abc-123") })))
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        identity.authenticate().await.unwrap();

        assert_eq!(identity.access().token.id, "abc-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_json_keeps_previous_access() {
        let mut good_server = mockito::Server::new_async().await;
        let good = good_server
            .mock("POST", "/v2.0/tokens")
            .with_body(json!({ "access": mock_access("first") }).to_string())
            .create_async()
            .await;

        let mut bad_server = mockito::Server::new_async().await;
        let bad = bad_server
            .mock("POST", "/v2.0/tokens")
            .with_body(r#"{"access": {"token": {"id": "second""#)
            .create_async()
            .await;

        let mut identity = create_identity(&good_server);
        identity.authenticate().await.unwrap();
        assert_eq!(identity.access().token.id, "first");

        identity.url = format!("{}/v2.0/tokens", bad_server.url());
        let err = identity.authenticate().await.unwrap_err();

        assert_true!(matches!(err, RackspaceError::DecodeError(_)));
        assert_eq!(identity.access(), &mock_access("first"));
        good.assert_async().await;
        bad.assert_async().await;
    }

    #[tokio::test]
    async fn reauthenticating_replaces_access() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.0/tokens")
            .with_body(json!({ "access": { "token": { "id": "second" } } }).to_string())
            .create_async()
            .await;

        let mut identity = create_identity(&server);
        identity.access = mock_access("first");
        identity.authenticate().await.unwrap();

        // Nothing from the old access survives
        assert_true!(identity.access().service_catalog.is_empty());
        assert_eq!(identity.access().token.id, "second");
        assert_eq!(identity.access().token.expires, "");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let mut identity = Identity::new(
            "http://127.0.0.1:1/v2.0/tokens",
            Account::new("demoauthor", "0123456789abcdef"),
        );
        let err = identity.authenticate().await.unwrap_err();

        assert_true!(matches!(err, RackspaceError::HttpError(_)));
        assert_false!(identity.is_authenticated());
    }
}
