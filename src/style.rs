use crate::error::PlotError;
use std::fmt;
use std::str::FromStr;

/// Grid line width in points when the fancy style is active.
pub const GRID_LINE_WIDTH_PT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    #[default]
    Simple,
    Fancy,
}

impl FromStr for StyleMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(StyleMode::Simple),
            "fancy" => Ok(StyleMode::Fancy),
            other => Err(PlotError::UnknownStyle(other.to_string())),
        }
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleMode::Simple => write!(f, "simple"),
            StyleMode::Fancy => write!(f, "fancy"),
        }
    }
}

/// Major grid settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyle {
    pub line_width_pt: f64,
}

/// Everything the style toggle controls on the axes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxesStyle {
    pub mode: StyleMode,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub grid: Option<GridStyle>,
    pub minor_ticks: bool,
}

impl AxesStyle {
    pub fn simple() -> Self {
        Self::default()
    }

    pub fn fancy(title: &str, xlabel: &str, ylabel: &str) -> Self {
        Self {
            mode: StyleMode::Fancy,
            title: title.to_string(),
            xlabel: xlabel.to_string(),
            ylabel: ylabel.to_string(),
            grid: Some(GridStyle {
                line_width_pt: GRID_LINE_WIDTH_PT,
            }),
            minor_ticks: true,
        }
    }
}

/// Legend placement names, following the usual plotting-library vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendLocation {
    #[default]
    Best,
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
    Right,
    CenterLeft,
    CenterRight,
    LowerCenter,
    UpperCenter,
    Center,
}

impl LegendLocation {
    /// Fractional position of the legend box point that sits on the anchor:
    /// (0, 0) is the lower-left corner of the box, (1, 1) the upper-right.
    pub fn box_alignment(&self) -> (f64, f64) {
        match self {
            LegendLocation::Best | LegendLocation::UpperRight => (1.0, 1.0),
            LegendLocation::UpperLeft => (0.0, 1.0),
            LegendLocation::LowerLeft => (0.0, 0.0),
            LegendLocation::LowerRight => (1.0, 0.0),
            LegendLocation::Right | LegendLocation::CenterRight => (1.0, 0.5),
            LegendLocation::CenterLeft => (0.0, 0.5),
            LegendLocation::LowerCenter => (0.5, 0.0),
            LegendLocation::UpperCenter => (0.5, 1.0),
            LegendLocation::Center => (0.5, 0.5),
        }
    }
}

impl FromStr for LegendLocation {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let location = match s {
            "best" => LegendLocation::Best,
            "upper right" => LegendLocation::UpperRight,
            "upper left" => LegendLocation::UpperLeft,
            "lower left" => LegendLocation::LowerLeft,
            "lower right" => LegendLocation::LowerRight,
            "right" => LegendLocation::Right,
            "center left" => LegendLocation::CenterLeft,
            "center right" => LegendLocation::CenterRight,
            "lower center" => LegendLocation::LowerCenter,
            "upper center" => LegendLocation::UpperCenter,
            "center" => LegendLocation::Center,
            other => return Err(PlotError::UnknownLegendLocation(other.to_string())),
        };
        Ok(location)
    }
}

/// An active legend. Anchor coordinates are fractions of the axes box,
/// (0, 0) lower-left, and may lie outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegendConfig {
    pub location: LegendLocation,
    pub anchor: Option<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_mode_parses_known_names() {
        assert_eq!("simple".parse::<StyleMode>().unwrap(), StyleMode::Simple);
        assert_eq!("fancy".parse::<StyleMode>().unwrap(), StyleMode::Fancy);
    }

    #[test]
    fn style_mode_rejects_unknown_names() {
        let err = "bogus".parse::<StyleMode>().unwrap_err();
        assert!(matches!(err, PlotError::UnknownStyle(ref s) if s == "bogus"));
    }

    #[test]
    fn fancy_enables_thin_major_grid_and_minor_ticks() {
        let style = AxesStyle::fancy("T", "x", "y");
        assert_eq!(style.grid, Some(GridStyle { line_width_pt: 0.1 }));
        assert!(style.minor_ticks);
        assert_eq!(AxesStyle::simple().grid, None);
    }

    #[test]
    fn legend_locations_parse() {
        assert_eq!(
            "upper center".parse::<LegendLocation>().unwrap(),
            LegendLocation::UpperCenter
        );
        assert!("sideways".parse::<LegendLocation>().is_err());
    }
}
