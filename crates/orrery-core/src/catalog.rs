use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::calendar::{DAYS_PER_JULIAN_CENTURY, JD_J2000};
use crate::elements::{ElementsDescriptor, OrbitalElements};
use crate::error::{OrbitError, OrbitResult};
use crate::kepler::KeplerSolver;
use crate::path::{generate_orbit_path_with, OrbitPath};
use crate::position::{position_at_julian_day_with, Position};

/// Stable handle for a body within one catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Planet,
    DwarfPlanet,
    #[default]
    Asteroid,
    Comet,
}

/// Orbital half of a body's record. Display attributes live with the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRecord {
    pub id: BodyId,
    pub label: String,
    pub kind: BodyKind,
    /// Flagged as a potentially hazardous asteroid.
    pub potentially_hazardous: bool,
    #[serde(flatten)]
    pub elements: OrbitalElements,
}

/// Non-orbital keys of one catalog entry.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryMeta {
    #[serde(default)]
    id: Option<BodyId>,
    #[serde(alias = "name")]
    label: String,
    #[serde(default)]
    kind: BodyKind,
    #[serde(default, alias = "pHAs", alias = "pha")]
    potentially_hazardous: bool,
}

/// Accepted top-level shapes: `{"bodies": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { bodies: Vec<serde_json::Value> },
    Bare(Vec<serde_json::Value>),
}

// JPL approximate elements (Standish), J2000 ecliptic, valid 1800-2050.
// label, a, e, I, L, longPeri, longNode, dL/dt (deg per century)
const PLANETS: [(&str, f64, f64, f64, f64, f64, f64, f64); 8] = [
    ("Mercury", 0.38709927, 0.20563593, 7.00497902, 252.25032350, 77.45779628, 48.33076593, 149472.67411175),
    ("Venus", 0.72333566, 0.00677672, 3.39467605, 181.97909950, 131.60246718, 76.67984255, 58517.81538729),
    ("Earth", 1.00000261, 0.01671123, -0.00001531, 100.46457166, 102.93768193, 0.0, 35999.37244981),
    ("Mars", 1.52371034, 0.09339410, 1.84969142, -4.55343205, -23.94362959, 49.55953891, 19140.30268499),
    ("Jupiter", 5.20288700, 0.04838624, 1.30439695, 34.39644051, 14.72847983, 100.47390909, 3034.74612775),
    ("Saturn", 9.53667594, 0.05386179, 2.48599187, 49.95424423, 92.59887831, 113.66242448, 1222.49362201),
    ("Uranus", 19.18916464, 0.04725744, 0.77263783, 313.23810451, 170.95427630, 74.01692503, 428.48202785),
    ("Neptune", 30.06992276, 0.00859048, 1.77004347, -55.12002969, 44.96476227, 131.78422574, 218.45945325),
];

/// One past the largest id in `ids`, `BodyId(0)` when empty.
/// `None` once `u32::MAX` is in use.
fn next_free_id(ids: impl Iterator<Item = BodyId>) -> Option<BodyId> {
    match ids.max() {
        None => Some(BodyId(0)),
        Some(BodyId(max)) => max.checked_add(1).map(BodyId),
    }
}

/// Ordered set of bodies with their elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyCatalog {
    bodies: Vec<BodyRecord>,
}

impl BodyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog. Entries carry their elements inline, using either
    /// the camelCase or the short dataset keys. Entries without an `id` are
    /// numbered after the largest explicit one; a repeated explicit `id` is
    /// an error. Any invalid entry fails the whole load.
    pub fn from_json(json: &str) -> OrbitResult<Self> {
        let entries = match serde_json::from_str(json)? {
            CatalogDocument::Wrapped { bodies } => bodies,
            CatalogDocument::Bare(bodies) => bodies,
        };

        let mut parsed = Vec::with_capacity(entries.len());
        let mut taken = HashSet::new();
        for entry in &entries {
            let meta = EntryMeta::deserialize(entry)?;
            let elements = ElementsDescriptor::deserialize(entry)?.build()?;
            if let Some(id) = meta.id {
                if !taken.insert(id) {
                    return Err(OrbitError::DuplicateBodyId(id.0));
                }
            }
            parsed.push((meta, elements));
        }

        let mut catalog = Self::new();
        let mut next = next_free_id(taken.iter().copied());
        for (meta, elements) in parsed {
            let id = match meta.id {
                Some(id) => id,
                None => {
                    let id = next.ok_or(OrbitError::BodyIdsExhausted)?;
                    next = id.0.checked_add(1).map(BodyId);
                    id
                }
            };
            catalog.bodies.push(BodyRecord {
                id,
                label: meta.label,
                kind: meta.kind,
                potentially_hazardous: meta.potentially_hazardous,
                elements,
            });
        }

        log::info!("catalog: loaded {} bodies", catalog.len());
        Ok(catalog)
    }

    /// The eight planets at J2000.
    pub fn planets() -> Self {
        let bodies = PLANETS
            .iter()
            .enumerate()
            .map(|(index, &(label, a, e, i, l, peri, node, l_rate))| BodyRecord {
                id: BodyId(index as u32),
                label: label.to_string(),
                kind: BodyKind::Planet,
                potentially_hazardous: false,
                elements: OrbitalElements::from_descriptor_unchecked(ElementsDescriptor {
                    semi_major_axis: a,
                    eccentricity: e,
                    inclination: i,
                    longitude_of_ascending_node: node,
                    longitude_of_periapsis: peri,
                    mean_motion: l_rate / DAYS_PER_JULIAN_CENTURY,
                    mean_longitude_at_epoch: l,
                    reference_epoch: JD_J2000,
                }),
            })
            .collect();
        Self { bodies }
    }

    /// Append a body; returns the id it was given, one past the largest in use.
    pub fn push(
        &mut self,
        label: impl Into<String>,
        kind: BodyKind,
        potentially_hazardous: bool,
        elements: OrbitalElements,
    ) -> OrbitResult<BodyId> {
        let id = next_free_id(self.bodies.iter().map(|b| b.id)).ok_or(OrbitError::BodyIdsExhausted)?;
        self.bodies.push(BodyRecord {
            id,
            label: label.into(),
            kind,
            potentially_hazardous,
            elements,
        });
        Ok(id)
    }

    /// Append every body of `other`, renumbering them after the current ones.
    pub fn extend(&mut self, other: BodyCatalog) -> OrbitResult<()> {
        for body in other.bodies {
            self.push(body.label, body.kind, body.potentially_hazardous, body.elements)?;
        }
        Ok(())
    }

    pub fn get(&self, id: BodyId) -> Option<&BodyRecord> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Case-insensitive lookup by label.
    pub fn find(&self, label: &str) -> OrbitResult<&BodyRecord> {
        self.bodies
            .iter()
            .find(|b| b.label.eq_ignore_ascii_case(label))
            .ok_or_else(|| OrbitError::UnknownBody(label.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyRecord> {
        self.bodies.iter()
    }

    pub fn bodies(&self) -> &[BodyRecord] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Positions of every body at `jd`, in catalog order.
    pub fn positions_at(&self, jd: f64, unit_scale: f64) -> Vec<Position> {
        self.positions_at_with(jd, unit_scale, KeplerSolver::default())
    }

    pub fn positions_at_with(&self, jd: f64, unit_scale: f64, solver: KeplerSolver) -> Vec<Position> {
        self.bodies
            .iter()
            .map(|b| position_at_julian_day_with(&b.elements, jd, unit_scale, solver))
            .collect()
    }

    /// One orbit ring per body, in catalog order.
    pub fn orbit_paths(
        &self,
        segments: u32,
        unit_scale: f64,
        solver: KeplerSolver,
    ) -> OrbitResult<Vec<OrbitPath>> {
        self.bodies
            .iter()
            .map(|b| generate_orbit_path_with(&b.elements, segments, unit_scale, solver))
            .collect()
    }
}

impl<'a> IntoIterator for &'a BodyCatalog {
    type Item = &'a BodyRecord;
    type IntoIter = std::slice::Iter<'a, BodyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.bodies.iter()
    }
}
