use serde::{Deserialize, Serialize};

use crate::calendar::JD_J2000;
use crate::error::{OrbitError, OrbitResult};

/// Raw Keplerian elements as they appear in a dataset, before validation.
///
/// Field names follow the camelCase spelling; the short keys used by
/// JPL-style body tables (`a`, `e`, `I`, `longPeri`, ...) are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementsDescriptor {
    /// Semi-major axis (AU).
    #[serde(alias = "a")]
    pub semi_major_axis: f64,
    /// Eccentricity, `0 ≤ e < 1`.
    #[serde(alias = "e")]
    pub eccentricity: f64,
    /// Inclination (degrees).
    #[serde(default, alias = "I", alias = "i")]
    pub inclination: f64,
    /// Longitude of the ascending node Ω (degrees).
    #[serde(default, alias = "longNode")]
    pub longitude_of_ascending_node: f64,
    /// Longitude of periapsis ϖ (degrees).
    #[serde(default, alias = "longPeri")]
    pub longitude_of_periapsis: f64,
    /// Mean motion (degrees per day).
    #[serde(alias = "n")]
    pub mean_motion: f64,
    /// Mean longitude at the reference epoch (degrees).
    #[serde(default, alias = "L")]
    pub mean_longitude_at_epoch: f64,
    /// Reference epoch (Julian Day).
    #[serde(default = "default_epoch", alias = "T")]
    pub reference_epoch: f64,
}

fn default_epoch() -> f64 {
    JD_J2000
}

impl Default for ElementsDescriptor {
    fn default() -> Self {
        Self {
            semi_major_axis: 1.0,
            eccentricity: 0.0,
            inclination: 0.0,
            longitude_of_ascending_node: 0.0,
            longitude_of_periapsis: 0.0,
            mean_motion: 0.0,
            mean_longitude_at_epoch: 0.0,
            reference_epoch: JD_J2000,
        }
    }
}

impl ElementsDescriptor {
    /// Validate and freeze into [`OrbitalElements`].
    pub fn build(self) -> OrbitResult<OrbitalElements> {
        OrbitalElements::from_descriptor(self)
    }

    fn validate(&self) -> OrbitResult<()> {
        let fields = [
            ("semiMajorAxis", self.semi_major_axis),
            ("eccentricity", self.eccentricity),
            ("inclination", self.inclination),
            ("longitudeOfAscendingNode", self.longitude_of_ascending_node),
            ("longitudeOfPeriapsis", self.longitude_of_periapsis),
            ("meanMotion", self.mean_motion),
            ("meanLongitudeAtEpoch", self.mean_longitude_at_epoch),
            ("referenceEpoch", self.reference_epoch),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(OrbitError::NonFinite { field });
        }
        if self.semi_major_axis <= 0.0 {
            return Err(OrbitError::NonPositiveSemiMajorAxis(self.semi_major_axis));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(OrbitError::EccentricityOutOfRange(self.eccentricity));
        }
        Ok(())
    }
}

/// Immutable, validated Keplerian elements of one bound orbit.
///
/// Angles are stored in degrees, as supplied; the radian accessors convert
/// on the way out. The only time dependence is the linear mean-motion term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementsDescriptor", into = "ElementsDescriptor")]
pub struct OrbitalElements {
    semi_major_axis: f64,
    eccentricity: f64,
    inclination: f64,
    longitude_of_ascending_node: f64,
    longitude_of_periapsis: f64,
    mean_motion: f64,
    mean_longitude_at_epoch: f64,
    reference_epoch: f64,
}

impl OrbitalElements {
    pub fn from_descriptor(descriptor: ElementsDescriptor) -> OrbitResult<Self> {
        descriptor.validate()?;
        Ok(Self::from_descriptor_unchecked(descriptor))
    }

    /// For built-in tables whose values are known to be in range.
    pub(crate) const fn from_descriptor_unchecked(d: ElementsDescriptor) -> Self {
        Self {
            semi_major_axis: d.semi_major_axis,
            eccentricity: d.eccentricity,
            inclination: d.inclination,
            longitude_of_ascending_node: d.longitude_of_ascending_node,
            longitude_of_periapsis: d.longitude_of_periapsis,
            mean_motion: d.mean_motion,
            mean_longitude_at_epoch: d.mean_longitude_at_epoch,
            reference_epoch: d.reference_epoch,
        }
    }

    /// Parse and validate one element set. Either key spelling is accepted.
    pub fn from_json(json: &str) -> OrbitResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn descriptor(&self) -> ElementsDescriptor {
        ElementsDescriptor::from(*self)
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Inclination (degrees).
    pub fn inclination(&self) -> f64 {
        self.inclination
    }

    /// Longitude of the ascending node (degrees).
    pub fn longitude_of_ascending_node(&self) -> f64 {
        self.longitude_of_ascending_node
    }

    /// Longitude of periapsis (degrees).
    pub fn longitude_of_periapsis(&self) -> f64 {
        self.longitude_of_periapsis
    }

    /// Mean motion (degrees per day).
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// Mean longitude at the reference epoch (degrees).
    pub fn mean_longitude_at_epoch(&self) -> f64 {
        self.mean_longitude_at_epoch
    }

    /// Reference epoch (Julian Day).
    pub fn reference_epoch(&self) -> f64 {
        self.reference_epoch
    }

    pub fn inclination_rad(&self) -> f64 {
        self.inclination.to_radians()
    }

    pub fn ascending_node_rad(&self) -> f64 {
        self.longitude_of_ascending_node.to_radians()
    }

    pub fn periapsis_longitude_rad(&self) -> f64 {
        self.longitude_of_periapsis.to_radians()
    }

    /// Mean longitude (degrees, unwrapped) at Julian Day `jd`.
    pub fn mean_longitude_at(&self, jd: f64) -> f64 {
        self.mean_longitude_at_epoch + self.mean_motion * (jd - self.reference_epoch)
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    /// Closest distance to the focus.
    pub fn periapsis_distance(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Farthest distance from the focus.
    pub fn apoapsis_distance(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Orbital period in days; infinite for a body with zero mean motion.
    pub fn period_days(&self) -> f64 {
        360.0 / self.mean_motion.abs()
    }
}

impl TryFrom<ElementsDescriptor> for OrbitalElements {
    type Error = OrbitError;

    fn try_from(descriptor: ElementsDescriptor) -> OrbitResult<Self> {
        Self::from_descriptor(descriptor)
    }
}

impl From<OrbitalElements> for ElementsDescriptor {
    fn from(elements: OrbitalElements) -> Self {
        Self {
            semi_major_axis: elements.semi_major_axis,
            eccentricity: elements.eccentricity,
            inclination: elements.inclination,
            longitude_of_ascending_node: elements.longitude_of_ascending_node,
            longitude_of_periapsis: elements.longitude_of_periapsis,
            mean_motion: elements.mean_motion,
            mean_longitude_at_epoch: elements.mean_longitude_at_epoch,
            reference_epoch: elements.reference_epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn earth() -> ElementsDescriptor {
        ElementsDescriptor {
            semi_major_axis: 1.00000261,
            eccentricity: 0.01671123,
            inclination: -0.00001531,
            longitude_of_ascending_node: 0.0,
            longitude_of_periapsis: 102.93768193,
            mean_motion: 0.9856076686,
            mean_longitude_at_epoch: 100.46457166,
            reference_epoch: JD_J2000,
        }
    }

    #[test]
    fn valid_elements_build() {
        let elements = earth().build().unwrap();
        assert_eq!(elements.eccentricity(), 0.01671123);
        assert_relative_eq!(elements.period_days(), 365.256, epsilon = 1e-3);
        assert!(elements.periapsis_distance() < elements.semi_major_axis());
        assert!(elements.apoapsis_distance() > elements.semi_major_axis());
        assert!(elements.semi_minor_axis() < elements.semi_major_axis());
    }

    #[test]
    fn rejects_unbound_eccentricity() {
        let err = ElementsDescriptor { eccentricity: 1.0, ..earth() }.build().unwrap_err();
        assert!(matches!(err, OrbitError::EccentricityOutOfRange(e) if e == 1.0));

        let err = ElementsDescriptor { eccentricity: -0.1, ..earth() }.build().unwrap_err();
        assert!(matches!(err, OrbitError::EccentricityOutOfRange(_)));
    }

    #[test]
    fn rejects_degenerate_axis() {
        let err = ElementsDescriptor { semi_major_axis: 0.0, ..earth() }.build().unwrap_err();
        assert!(matches!(err, OrbitError::NonPositiveSemiMajorAxis(_)));
    }

    #[test]
    fn rejects_non_finite_fields() {
        let err = ElementsDescriptor { mean_motion: f64::NAN, ..earth() }.build().unwrap_err();
        assert!(matches!(err, OrbitError::NonFinite { field: "meanMotion" }));

        let err = ElementsDescriptor { inclination: f64::INFINITY, ..earth() }.build().unwrap_err();
        assert!(matches!(err, OrbitError::NonFinite { field: "inclination" }));
    }

    #[test]
    fn mean_longitude_advances_linearly() {
        let elements = earth().build().unwrap();
        assert_eq!(elements.mean_longitude_at(JD_J2000), 100.46457166);
        assert_relative_eq!(
            elements.mean_longitude_at(JD_J2000 + 10.0),
            100.46457166 + 9.856076686,
            epsilon = 1e-9
        );
    }

    #[test]
    fn parses_short_dataset_keys() {
        let json = r#"{
            "a": 1.52371034, "e": 0.09339410, "I": 1.84969142,
            "longPeri": -23.94362959, "longNode": 49.55953891,
            "n": 0.524039, "L": -4.55343205
        }"#;
        let elements = OrbitalElements::from_json(json).unwrap();
        assert_eq!(elements.semi_major_axis(), 1.52371034);
        assert_eq!(elements.longitude_of_periapsis(), -23.94362959);
        assert_eq!(elements.reference_epoch(), JD_J2000);
    }

    #[test]
    fn deserialization_validates() {
        let json = r#"{ "a": 1.0, "e": 1.2, "n": 0.5 }"#;
        let err = serde_json::from_str::<OrbitalElements>(json).unwrap_err();
        assert!(err.to_string().contains("eccentricity"), "{err}");
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let elements = earth().build().unwrap();
        let value = serde_json::to_value(elements).unwrap();
        assert_eq!(value["semiMajorAxis"], 1.00000261);
        assert_eq!(value["longitudeOfPeriapsis"], 102.93768193);
        let back: OrbitalElements = serde_json::from_value(value).unwrap();
        assert_eq!(back, elements);
    }
}
