use ratatui::style::Color;

/// A named color palette for the UI. Cycled with Ctrl+T and persisted
/// to prefs.
#[derive(Debug)]
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: &[Theme] = &[
  Theme {
    name: "slate",
    bg: Color::Rgb(24, 26, 31),
    fg: Color::Rgb(220, 223, 228),
    muted: Color::Rgb(120, 126, 138),
    accent: Color::Rgb(224, 82, 82),
    border: Color::Rgb(58, 62, 72),
    highlight_fg: Color::Rgb(24, 26, 31),
    highlight_bg: Color::Rgb(224, 82, 82),
    stripe_bg: Color::Rgb(29, 32, 38),
    status: Color::Rgb(152, 195, 121),
    error: Color::Rgb(224, 108, 117),
    key_fg: Color::Rgb(24, 26, 31),
    key_bg: Color::Rgb(120, 126, 138),
  },
  Theme {
    name: "paper",
    bg: Color::Rgb(250, 248, 243),
    fg: Color::Rgb(55, 53, 47),
    muted: Color::Rgb(140, 136, 126),
    accent: Color::Rgb(200, 52, 52),
    border: Color::Rgb(216, 212, 202),
    highlight_fg: Color::Rgb(250, 248, 243),
    highlight_bg: Color::Rgb(200, 52, 52),
    stripe_bg: Color::Rgb(243, 240, 233),
    status: Color::Rgb(80, 130, 70),
    error: Color::Rgb(190, 60, 60),
    key_fg: Color::Rgb(250, 248, 243),
    key_bg: Color::Rgb(140, 136, 126),
  },
  Theme {
    name: "midnight",
    bg: Color::Rgb(13, 17, 23),
    fg: Color::Rgb(201, 209, 217),
    muted: Color::Rgb(110, 118, 129),
    accent: Color::Rgb(88, 166, 255),
    border: Color::Rgb(48, 54, 61),
    highlight_fg: Color::Rgb(13, 17, 23),
    highlight_bg: Color::Rgb(88, 166, 255),
    stripe_bg: Color::Rgb(22, 27, 34),
    status: Color::Rgb(63, 185, 80),
    error: Color::Rgb(248, 81, 73),
    key_fg: Color::Rgb(13, 17, 23),
    key_bg: Color::Rgb(110, 118, 129),
  },
];
