use super::*;

/// The only accepted credential scheme.
pub const SCHEME: &str = "Bearer";

/// Extracts the credential from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and separated from the
/// credential by whitespace. A missing header, a foreign scheme, and an
/// empty credential are distinct rejections.
pub fn bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?.trim();
    let (scheme, credential) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(AuthError::MalformedHeader);
    }
    match credential.trim() {
        "" => Err(AuthError::EmptyCredential),
        credential => Ok(credential),
    }
}
