use super::errors::InfrastructureError;

pub struct ClipboardService;

impl ClipboardService {
    pub fn copy_text(text: &str) -> Result<(), InfrastructureError> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_owned())?;
        tracing::debug!(chars = text.chars().count(), "copied to clipboard");
        Ok(())
    }
}
