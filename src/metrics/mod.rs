//! Physical page sizes and unit conversion

use crate::config::{Margins, PaginateConfig};
use crate::error::PaginateError;
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Named paper format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageFormat {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageFormat {
    pub const ALL: [PageFormat; 6] = [
        PageFormat::A3,
        PageFormat::A4,
        PageFormat::A5,
        PageFormat::Letter,
        PageFormat::Legal,
        PageFormat::Tabloid,
    ];

    /// Portrait (width, height) in millimeters
    pub fn size_mm(&self) -> (f32, f32) {
        match self {
            PageFormat::A3 => (297.0, 420.0),
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
            PageFormat::Tabloid => (279.4, 431.8),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageFormat::A3 => "A3",
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::Letter => "Letter",
            PageFormat::Legal => "Legal",
            PageFormat::Tabloid => "Tabloid",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageFormat {
    type Err = PaginateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PaginateError::InvalidConfiguration(format!("unknown page format '{}'", s)))
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = PaginateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(PaginateError::InvalidConfiguration(format!(
                "unknown page orientation '{}'",
                s
            ))),
        }
    }
}

/// Usable page area in logical pixels for a format, orientation and resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    format: PageFormat,
    orientation: Orientation,
    resolution_dpi: f32,
    margins: Margins,
}

impl PageMetrics {
    pub fn new(
        format: PageFormat,
        orientation: Orientation,
        resolution_dpi: f32,
        margins: Margins,
    ) -> Result<Self, PaginateError> {
        if !resolution_dpi.is_finite() || resolution_dpi <= 0.0 {
            return Err(PaginateError::InvalidConfiguration(format!(
                "resolution must be positive, got {}",
                resolution_dpi
            )));
        }

        let metrics = Self {
            format,
            orientation,
            resolution_dpi,
            margins,
        };

        let (width, height) = metrics.page_size_mm();
        if height - margins.top - margins.bottom <= 0.0 || width - margins.left - margins.right <= 0.0 {
            return Err(PaginateError::InvalidConfiguration(format!(
                "margins leave no content area on {} {:?}",
                format, orientation
            )));
        }

        Ok(metrics)
    }

    /// Build metrics from the named format and orientation in a config
    pub fn from_config(config: &PaginateConfig) -> Result<Self, PaginateError> {
        Self::new(
            config.format.parse()?,
            config.orientation.parse()?,
            config.resolution_dpi,
            config.margins_mm,
        )
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Page (width, height) in millimeters, orientation applied
    pub fn page_size_mm(&self) -> (f32, f32) {
        let (width, height) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }

    /// Maximum content height per page in logical pixels
    pub fn max_content_height(&self) -> f32 {
        let (_, height) = self.page_size_mm();
        self.mm_to_px(height - self.margins.top - self.margins.bottom)
    }

    /// Usable content width per page in logical pixels
    pub fn max_content_width(&self) -> f32 {
        let (width, _) = self.page_size_mm();
        self.mm_to_px(width - self.margins.left - self.margins.right)
    }

    pub fn px_to_mm(&self, px: f32) -> f32 {
        px * MM_PER_INCH / self.resolution_dpi
    }

    pub fn mm_to_px(&self, mm: f32) -> f32 {
        mm * self.resolution_dpi / MM_PER_INCH
    }
}
