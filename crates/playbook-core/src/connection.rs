//! Connection builder

use playbook_model::{ConnectionConfig, Credentials, Platform};

use crate::config::{
    AssemblerConfig, ENV_CLOUD_APIKEY, ENV_TPP_ACCESS_TOKEN, ENV_TPP_TRUST_BUNDLE, ENV_TPP_URL,
};
use crate::credentials::{validate_environment, CredentialSource};
use crate::error::PlaybookResult;

/// Build the connection block for `platform`
///
/// `tpp` gets `url` and `trustBundle`; `vaas` leaves them out entirely.
///
/// # Errors
/// [`crate::PlaybookError::MissingEnvironment`] if any required input is
/// absent
pub fn build_connection(
    config: &AssemblerConfig,
    platform: Platform,
    source: &impl CredentialSource,
) -> PlaybookResult<ConnectionConfig> {
    validate_environment(platform, source)?;

    let connection = match platform {
        Platform::Tpp => ConnectionConfig::tpp(
            source.require(platform, ENV_TPP_URL)?,
            source.require(platform, ENV_TPP_TRUST_BUNDLE)?,
            Credentials::new(
                config.client_id.clone(),
                source.require(platform, ENV_TPP_ACCESS_TOKEN)?,
            ),
        ),
        Platform::Vaas => ConnectionConfig::vaas(Credentials::new(
            config.client_id.clone(),
            source.require(platform, ENV_CLOUD_APIKEY)?,
        )),
    };

    tracing::info!("Built {} connection", platform);
    Ok(connection)
}

/// Parse the platform name, then [`build_connection`]
///
/// # Errors
/// [`crate::PlaybookError::UnknownPlatform`] or any error of
/// [`build_connection`]
pub fn build_connection_named(
    config: &AssemblerConfig,
    platform: &str,
    source: &impl CredentialSource,
) -> PlaybookResult<ConnectionConfig> {
    let platform: Platform = platform.parse()?;
    build_connection(config, platform, source)
}
