/// An sRGB color as (r, g, b) bytes.
pub type Rgb = (u8, u8, u8);

/// Sequential 7-class "Reds" palette, lightest first.
pub const REDS_7: [Rgb; 7] = [
    (0xfe, 0xe5, 0xd9),
    (0xfc, 0xbb, 0xa1),
    (0xfc, 0x92, 0x72),
    (0xfb, 0x6a, 0x4a),
    (0xef, 0x3b, 0x2c),
    (0xcb, 0x18, 0x1d),
    (0x99, 0x00, 0x0d),
];

/// Fill for counties that have no joined education record.
pub const NO_DATA_FILL: Rgb = (0xcc, 0xcc, 0xcc);

/// Stroke for the state border overlay.
pub const STATE_BORDER_STROKE: Rgb = (0x40, 0x19, 0x17);

/// Format RGB as a lowercase `#rrggbb` CSS color string.
pub fn hex_css((r, g, b): Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
