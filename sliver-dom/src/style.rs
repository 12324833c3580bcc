use sliver::Direction;

/// How an element takes part in layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Display {
    #[default]
    Normal,
    None,
    /// A virtualized scroll container along the given axis.
    Sliver(Direction),
}

impl Display {
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    pub fn sliver_direction(self) -> Option<Direction> {
        match self {
            Self::Sliver(direction) => Some(direction),
            _ => None,
        }
    }
}

/// A length declaration: explicit pixels or `auto`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Length {
    #[default]
    Auto,
    Px(u32),
}

impl Length {
    pub fn px(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Px(px) => Some(px),
        }
    }
}

/// Style properties the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleProperty {
    Display,
    SliverDirection,
    Width,
    Height,
}

impl StyleProperty {
    /// Accepts both the camel-case (`sliverDirection`) and the kebab-case spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "display" => Some(Self::Display),
            "sliverDirection" | "sliver-direction" => Some(Self::SliverDirection),
            "width" => Some(Self::Width),
            "height" => Some(Self::Height),
            _ => None,
        }
    }
}

/// The resolved style of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    pub display: Display,
    /// Declared `sliverDirection`; remembered while `display` is not `sliver`.
    pub direction: Direction,
    pub width: Length,
    pub height: Length,
}

impl Style {
    pub fn set_display(&mut self, display: Display) {
        if let Display::Sliver(direction) = display {
            self.direction = direction;
        }
        self.display = display;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        if let Display::Sliver(_) = self.display {
            self.display = Display::Sliver(direction);
        }
    }
}

/// Parses a `display` keyword. Keywords other than `none` and `sliver` lay out normally.
pub fn parse_display(value: &str, direction: Direction) -> Display {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        Display::None
    } else if value.eq_ignore_ascii_case("sliver") {
        Display::Sliver(direction)
    } else {
        Display::Normal
    }
}

/// Parses a `sliverDirection` value. Unsupported values fall back to `column`.
pub fn parse_direction(value: &str) -> Direction {
    match Direction::from_keyword(value) {
        Some(direction) => direction,
        None => {
            dlog!(warn, value, "unsupported sliver direction, using column");
            Direction::Column
        }
    }
}

/// Parses `auto`, an empty value, `<n>px` or a bare number. Returns `None` for anything else.
pub fn parse_length(value: &str) -> Option<Length> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("auto") {
        return Some(Length::Auto);
    }
    let has_px = |split: usize| {
        value.is_char_boundary(split) && value[split..].eq_ignore_ascii_case("px")
    };
    let number = match value.len().checked_sub(2) {
        Some(split) if has_px(split) => &value[..split],
        _ => value,
    };
    let px: f64 = number.trim_end().parse().ok()?;
    if !px.is_finite() || px < 0.0 {
        return None;
    }
    Some(Length::Px((px + 0.5).min(u32::MAX as f64) as u32))
}
