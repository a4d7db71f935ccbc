use super::DriverError;

/// Put `text` on the system clipboard.
///
/// Used together with [`super::DesktopElement::paste`] to move the OTP
/// into inputs that ignore synthetic keystrokes.
pub fn set_text(text: &str) -> Result<(), DriverError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| DriverError::Platform(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| DriverError::Platform(e.to_string()))
}
