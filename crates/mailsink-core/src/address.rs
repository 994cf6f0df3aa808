//! Recipient address checks.

/// Longest accepted address, in bytes.
pub const MAX_ADDRESS_LEN: usize = 254;

/// Longest accepted local part, in bytes.
pub const MAX_LOCAL_LEN: usize = 64;

/// Why an address was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// Address is empty.
    Empty,
    /// Address is longer than [`MAX_ADDRESS_LEN`].
    TooLong,
    /// Address does not contain exactly one `@`.
    AtSign,
    /// Local part is empty.
    EmptyLocal,
    /// Local part is longer than [`MAX_LOCAL_LEN`].
    LocalTooLong,
    /// Domain is empty.
    EmptyDomain,
    /// Domain has no dot.
    DomainWithoutDot,
    /// Domain starts or ends with a dot.
    DomainEdgeDot,
    /// Domain contains `..`.
    DomainConsecutiveDots,
}

impl AddressError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Email address cannot be empty",
            Self::TooLong => "Email address is too long",
            Self::AtSign => "Email must contain exactly one @ symbol",
            Self::EmptyLocal => "Email local part cannot be empty",
            Self::LocalTooLong => "Email local part is too long",
            Self::EmptyDomain => "Email domain cannot be empty",
            Self::DomainWithoutDot => "Email domain must contain a dot",
            Self::DomainEdgeDot => "Email domain cannot start or end with a dot",
            Self::DomainConsecutiveDots => "Email domain cannot contain consecutive dots",
        }
    }
}

impl std::fmt::Display for AddressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AddressError {}

/// Checks the basic shape of an email address.
///
/// # Errors
///
/// Returns the first rule the address breaks.
pub fn validate_email(email: &str) -> Result<(), AddressError> {
    if email.is_empty() {
        return Err(AddressError::Empty);
    }
    if email.len() > MAX_ADDRESS_LEN {
        return Err(AddressError::TooLong);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AddressError::AtSign);
    };
    if domain.contains('@') {
        return Err(AddressError::AtSign);
    }

    if local.is_empty() {
        return Err(AddressError::EmptyLocal);
    }
    if local.len() > MAX_LOCAL_LEN {
        return Err(AddressError::LocalTooLong);
    }
    if domain.is_empty() {
        return Err(AddressError::EmptyDomain);
    }
    if !domain.contains('.') {
        return Err(AddressError::DomainWithoutDot);
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(AddressError::DomainEdgeDot);
    }
    if domain.contains("..") {
        return Err(AddressError::DomainConsecutiveDots);
    }

    Ok(())
}

/// Returns the lowercased local part if `recipient` is on `domain`.
///
/// The domain comparison ignores case. An empty local part yields `None`.
#[must_use]
pub fn extract_username(recipient: &str, domain: &str) -> Option<String> {
    let recipient = recipient.trim().to_lowercase();
    let suffix = format!("@{}", domain.to_lowercase());

    recipient
        .strip_suffix(&suffix)
        .filter(|local| !local.is_empty())
        .map(ToOwned::to_owned)
}
