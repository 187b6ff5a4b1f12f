//! Encrypted-field sealing for gateway configs.

use gateway_catalog_sdk::{AdpAiGatewayConfig, ApigConfig, AuthHeader, GatewayConfig, HigressConfig};

use crate::domain::cipher::{CipherError, CredentialCipher};

/// A config whose secret fields must be encrypted before storage and
/// decrypted only for the duration of an outbound call.
pub trait SecretFields: Sized {
    /// Wire names of the secret fields.
    const SECRET_FIELDS: &'static [&'static str];

    /// Copy of `self` with `f` applied to every secret field that is set.
    ///
    /// # Errors
    /// Returns the first error produced by `f`.
    fn map_secrets<E, F>(&self, f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>;

    /// Copy with every secret field encrypted.
    ///
    /// # Errors
    /// Propagates [`CredentialCipher::encrypt`] errors.
    fn seal(&self, cipher: &CredentialCipher) -> Result<Self, CipherError> {
        self.map_secrets(|v| cipher.encrypt(v))
    }

    /// Copy with every secret field decrypted.
    ///
    /// # Errors
    /// Propagates [`CredentialCipher::decrypt`] errors.
    fn open(&self, cipher: &CredentialCipher) -> Result<Self, CipherError> {
        self.map_secrets(|v| cipher.decrypt(v))
    }
}

fn map_opt<E, F>(value: Option<&String>, f: &mut F) -> Result<Option<String>, E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    value.map(|v| f(v)).transpose()
}

impl SecretFields for ApigConfig {
    const SECRET_FIELDS: &'static [&'static str] = &["accessKey", "secretKey"];

    fn map_secrets<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        Ok(Self {
            access_key: f(&self.access_key)?,
            secret_key: f(&self.secret_key)?,
            ..self.clone()
        })
    }
}

impl SecretFields for HigressConfig {
    const SECRET_FIELDS: &'static [&'static str] = &["accessToken", "password"];

    fn map_secrets<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        Ok(Self {
            access_token: map_opt(self.access_token.as_ref(), &mut f)?,
            password: map_opt(self.password.as_ref(), &mut f)?,
            ..self.clone()
        })
    }
}

impl SecretFields for AdpAiGatewayConfig {
    const SECRET_FIELDS: &'static [&'static str] = &["authSeed", "authHeaders[].value"];

    fn map_secrets<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let auth_seed = map_opt(self.auth_seed.as_ref(), &mut f)?;
        let auth_headers = self
            .auth_headers
            .iter()
            .map(|h| {
                Ok(AuthHeader {
                    key: h.key.clone(),
                    value: map_opt(h.value.as_ref(), &mut f)?,
                })
            })
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Self {
            auth_seed,
            auth_headers,
            ..self.clone()
        })
    }
}

// The union owns no fields itself; each variant declares its own.
impl SecretFields for GatewayConfig {
    const SECRET_FIELDS: &'static [&'static str] = &[];

    fn map_secrets<E, F>(&self, f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        Ok(match self {
            Self::ApigApi(c) => Self::ApigApi(c.map_secrets(f)?),
            Self::ApigAi(c) => Self::ApigAi(c.map_secrets(f)?),
            Self::AdpAiGateway(c) => Self::AdpAiGateway(c.map_secrets(f)?),
            Self::Higress(c) => Self::Higress(c.map_secrets(f)?),
        })
    }
}
