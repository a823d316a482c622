//! GreenMail container helpers.

use testcontainers::{
    ContainerAsync, GenericImage, ImageExt as _, TestcontainersError,
    core::{IntoContainerPort as _, WaitFor},
    runners::AsyncRunner as _,
};

/// A running GreenMail server with one account.
pub struct GreenMail {
    /// Keeps the container alive.
    _container: ContainerAsync<GenericImage>,

    /// The host the IMAP port is published on.
    pub host: String,

    /// The published plaintext IMAP port.
    pub port: u16,
}

impl GreenMail {
    /// Start a container with the given account and resolve its IMAP endpoint.
    pub async fn start(user: &str, password: &str) -> Result<Self, TestcontainersError> {
        let container = GenericImage::new("greenmail/standalone", "latest")
            .with_exposed_port(crate::IMAP_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Starting GreenMail API server at"))
            .with_env_var("GREENMAIL_USERS", format!("{user}:{password}"))
            .start()
            .await?;

        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(crate::IMAP_PORT).await?;

        Ok(Self {
            _container: container,
            host,
            port,
        })
    }
}
