//! Terminal preview using Unicode half blocks.

use qrbolt_business::Settings;
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;
use qrcode::types::QrError;

/// Renders the settings' text as rows of half-block characters.
///
/// Follows the inversion flag. The quiet zone is drawn only when the margin is nonzero,
/// since terminal cells cannot show a fractional margin.
pub fn render(settings: &Settings) -> Result<String, QrError> {
    let code =
        QrCode::with_error_correction_level(settings.text.as_bytes(), settings.level.into())?;
    let (dark, light) = if settings.inverted {
        (Dense1x2::Light, Dense1x2::Dark)
    } else {
        (Dense1x2::Dark, Dense1x2::Light)
    };

    Ok(code
        .render::<Dense1x2>()
        .dark_color(dark)
        .light_color(light)
        .quiet_zone(settings.margin > 0)
        .build())
}
