//! Geometry resolver
//!
//! Converts a normalized antenna box into physical extent using the average
//! device dimensions of [`DeviceGeometryConstants`].

use crate::config::DeviceGeometryConstants;
use crate::error::{LinkError, LinkResult};
use crate::types::{NormalizedBox, PhysicalGeometry};

/// Resolve a normalized box to physical width, height and vertical center.
///
/// The center is the midpoint of the antenna's vertical extent, measured from
/// the top edge of the device.
pub fn resolve(
    bbox: &NormalizedBox,
    constants: &DeviceGeometryConstants,
) -> LinkResult<PhysicalGeometry> {
    bbox.validate()?;

    let width_m = bbox.width() * constants.average_width_m;
    let height_m = bbox.height() * constants.average_height_m;
    if !(width_m > 0.0 && height_m > 0.0) || !width_m.is_finite() || !height_m.is_finite() {
        return Err(LinkError::geometry(format!(
            "physical extent must be positive, got {width_m} m x {height_m} m"
        )));
    }

    let top_m = bbox.y0 * constants.average_height_m;
    let bottom_m = bbox.y1 * constants.average_height_m;
    let center_y_m = (top_m + bottom_m) / 2.0;

    Ok(PhysicalGeometry {
        width_m,
        height_m,
        center_y_m,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resolve_reference_box() {
        let constants = DeviceGeometryConstants::default();
        let geom = resolve(&NormalizedBox::new(0.3, 0.0, 0.7, 0.1), &constants).unwrap();
        assert_relative_eq!(geom.width_m, 0.03, max_relative = 1e-12);
        assert_relative_eq!(geom.height_m, 0.015, max_relative = 1e-12);
        assert_relative_eq!(geom.center_y_m, 0.0075, max_relative = 1e-12);
        assert_relative_eq!(geom.area_m2(), 0.00045, max_relative = 1e-12);
    }

    #[test]
    fn test_center_is_measured_from_top() {
        let constants = DeviceGeometryConstants::default();
        let bottom = resolve(&NormalizedBox::new(0.2, 0.8, 0.8, 1.0), &constants).unwrap();
        assert_relative_eq!(bottom.center_y_m, 0.135, max_relative = 1e-12);
    }

    #[test]
    fn test_malformed_box_is_rejected() {
        let constants = DeviceGeometryConstants::default();
        for bbox in [
            NormalizedBox::new(0.5, 0.1, 0.5, 0.2),
            NormalizedBox::new(0.1, 0.3, 0.2, 0.1),
            NormalizedBox::new(0.1, 0.1, 1.2, 0.2),
        ] {
            assert!(
                matches!(resolve(&bbox, &constants), Err(LinkError::InvalidGeometry { .. })),
                "{bbox:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_degenerate_device_dimensions_are_rejected() {
        let constants = DeviceGeometryConstants {
            average_height_m: 0.0,
            ..Default::default()
        };
        let result = resolve(&NormalizedBox::new(0.3, 0.0, 0.7, 0.1), &constants);
        assert!(matches!(result, Err(LinkError::InvalidGeometry { .. })));
    }
}
