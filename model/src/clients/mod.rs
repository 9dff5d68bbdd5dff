/*!

This module provides the client used to talk to the assisted installer. Everything that needs the
installer depends on the [`InstallerClient`] trait so that mock implementations can be injected
for testing; in practice you will use [`AssistedClient`].

!*/

mod assisted_client;
mod error;
mod installer_client;

pub use assisted_client::AssistedClient;
pub use error::{Error, Result};
pub use installer_client::InstallerClient;
