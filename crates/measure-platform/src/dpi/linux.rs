//! Linux display density from DRM connectors.
//!
//! Each connector under `/sys/class/drm` exposes a `status` file and the raw
//! EDID block of the attached monitor. The preferred detailed timing
//! descriptor carries both the horizontal active pixel count and the image
//! width in millimetres.

use crate::error::{PlatformError, PlatformResult};
use measure_core::ppi_from_extent;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DRM_ROOT: &str = "/sys/class/drm";
const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
const EDID_BLOCK_LEN: usize = 128;
const FIRST_DESCRIPTOR: usize = 54;
const SCREEN_WIDTH_CM: usize = 21;

/// Connector name prefixes of built-in panels, preferred as the primary display.
const INTERNAL_PANELS: [&str; 3] = ["eDP", "LVDS", "DSI"];

/// Horizontal extent read from an EDID block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EdidExtent {
    pub pixels: u32,
    pub millimetres: f64,
}

/// Set DPI awareness (no-op on Linux).
pub fn set_dpi_aware() {}

/// Horizontal physical density of the primary connected display.
pub fn physical_pixels_per_inch() -> PlatformResult<f64> {
    physical_pixels_per_inch_in(Path::new(DRM_ROOT))
}

pub(crate) fn physical_pixels_per_inch_in(root: &Path) -> PlatformResult<f64> {
    let connectors = connected_connectors(root)?;
    if connectors.is_empty() {
        return Err(PlatformError::NoDisplay);
    }

    for connector in connectors {
        let edid = match fs::read(connector.join("edid")) {
            Ok(edid) => edid,
            Err(error) => {
                debug!(?connector, %error, "Unreadable EDID, trying next connector");
                continue;
            }
        };
        let Some(extent) = parse_edid(&edid) else {
            debug!(?connector, len = edid.len(), "EDID has no usable extent, trying next connector");
            continue;
        };
        if let Some(ppi) = ppi_from_extent(extent.pixels, extent.millimetres) {
            debug!(?connector, pixels = extent.pixels, millimetres = extent.millimetres, ppi, "Density from EDID");
            return Ok(ppi);
        }
    }

    Err(PlatformError::UnknownPhysicalSize)
}

/// Connected connectors, built-in panels first, then by name.
fn connected_connectors(root: &Path) -> PlatformResult<Vec<PathBuf>> {
    let mut connected = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        // Connectors look like "card0-HDMI-A-1"; bare "card0" is the device itself.
        let Some((_, kind)) = name.split_once('-') else {
            continue;
        };
        let status = fs::read_to_string(path.join("status")).unwrap_or_default();
        if status.trim() == "connected" {
            let internal = INTERNAL_PANELS.iter().any(|p| kind.starts_with(p));
            connected.push((!internal, name, path));
        }
    }

    connected.sort();
    Ok(connected.into_iter().map(|(_, _, path)| path).collect())
}

/// Extract the horizontal extent from an EDID base block.
pub(crate) fn parse_edid(edid: &[u8]) -> Option<EdidExtent> {
    if edid.len() < EDID_BLOCK_LEN || edid[..8] != EDID_HEADER {
        return None;
    }

    let d = &edid[FIRST_DESCRIPTOR..FIRST_DESCRIPTOR + 18];
    // A zero pixel clock marks a display descriptor rather than a timing.
    if d[0] == 0 && d[1] == 0 {
        return None;
    }

    let pixels = u32::from(d[2]) | (u32::from(d[4] & 0xF0) << 4);
    let mut millimetres = f64::from(u32::from(d[12]) | (u32::from(d[14] & 0xF0) << 4));
    if millimetres == 0.0 {
        millimetres = f64::from(edid[SCREEN_WIDTH_CM]) * 10.0;
    }

    if pixels == 0 || millimetres == 0.0 {
        return None;
    }
    Some(EdidExtent { pixels, millimetres })
}
