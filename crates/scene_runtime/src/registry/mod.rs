//! Entity registry
//!
//! Discovers which renderable entity kinds the engine exports and turns each
//! usable one into a named factory. Discovery happens once, when the runtime
//! is constructed:
//!
//! 1. Only two capability shapes are considered: geometry-producing kinds
//!    (`*Geometry` with a geometry constructor) and light-producing kinds
//!    (`*Light` with a light constructor). Everything else is ignored.
//! 2. The constructor signature is parsed for parameter names and literal
//!    defaults. Kinds whose signature cannot be extracted are skipped; the
//!    rest of the registry is unaffected.
//! 3. The factory name is the type name in snake_case, with the `Geometry`
//!    suffix dropped for geometries (`TorusKnotGeometry` → `torus_knot`,
//!    `PointLight` → `point_light`).

pub mod signature;

use std::collections::BTreeMap;

use crate::engine::catalog::{Constructor, ConstructorSignature, EntityKindInfo};
use crate::engine::{EngineError, EngineObject, Material, Mesh, ObjectBody};
use crate::foundation::math::Color;

pub use signature::{Param, SignatureError};

const GEOMETRY_SUFFIX: &str = "Geometry";
const LIGHT_SUFFIX: &str = "Light";

/// Capability shape of a registered entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityShape {
    /// Builds a mesh around engine geometry
    Geometry,
    /// Builds a light
    Light,
}

/// A discovered, constructible entity kind
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    /// Factory name, e.g. `sphere`
    pub name: String,
    /// Engine type name, e.g. `SphereGeometry`
    pub type_name: &'static str,
    /// Capability shape
    pub shape: EntityShape,
    /// Formal parameters with literal defaults
    pub params: Vec<Param>,
    constructor: Constructor,
}

impl EntityDescriptor {
    /// Build the engine object for positional `args`
    ///
    /// Missing trailing arguments take the declared defaults; extra arguments
    /// are ignored. Geometry kinds get a fresh material in `material_color`.
    pub fn build(&self, args: &[f64], material_color: Color) -> Result<EngineObject, EngineError> {
        if args.len() > self.params.len() {
            log::trace!(
                "{}: ignoring {} extra argument(s)",
                self.name,
                args.len() - self.params.len()
            );
        }
        let resolved: Vec<Option<f64>> = self
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| args.get(index).copied().or(param.default))
            .collect();

        let body = match self.constructor {
            Constructor::Geometry(build) => ObjectBody::Mesh(Mesh {
                geometry: build(self.type_name, &resolved)?,
                material: Material { color: material_color },
            }),
            Constructor::Light(build) => ObjectBody::Light(build(&resolved)?),
        };
        Ok(EngineObject::new(body))
    }
}

/// Named factories for every usable entity kind
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entries: BTreeMap<String, EntityDescriptor>,
    skipped: Vec<(&'static str, SignatureError)>,
}

impl EntityRegistry {
    /// Discover factories from the kinds an engine exports
    pub fn discover(kinds: impl IntoIterator<Item = EntityKindInfo>) -> Self {
        let mut registry = Self::default();

        for kind in kinds {
            let Some((name, shape)) = factory_name(&kind) else {
                log::trace!("Ignoring engine type {}", kind.type_name);
                continue;
            };

            let params = match kind.signature {
                ConstructorSignature::Declared(source) => signature::parse(source),
                ConstructorSignature::Opaque => Err(SignatureError::Opaque),
            };
            let params = match params {
                Ok(params) => params,
                Err(err) => {
                    log::debug!("Skipping {}: {}", kind.type_name, err);
                    registry.skipped.push((kind.type_name, err));
                    continue;
                }
            };

            if registry.entries.contains_key(&name) {
                log::warn!("Duplicate entity name {} from {}; keeping the first", name, kind.type_name);
                continue;
            }
            registry.entries.insert(
                name.clone(),
                EntityDescriptor {
                    name,
                    type_name: kind.type_name,
                    shape,
                    params,
                    constructor: kind.constructor,
                },
            );
        }

        log::info!(
            "Entity registry ready: {} kinds registered, {} skipped",
            registry.entries.len(),
            registry.skipped.len()
        );
        registry
    }

    /// Look up a factory by name
    pub fn get(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entries.get(name)
    }

    /// Whether a factory with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Factory names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Registered descriptors in name order
    pub fn descriptors(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entries.values()
    }

    /// Kinds that matched a shape but could not be registered
    pub fn skipped(&self) -> &[(&'static str, SignatureError)] {
        &self.skipped
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no factory was registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Factory name and shape for an engine type, if it has a usable shape
fn factory_name(kind: &EntityKindInfo) -> Option<(String, EntityShape)> {
    match kind.constructor {
        Constructor::Geometry(_) => {
            let stem = kind.type_name.strip_suffix(GEOMETRY_SUFFIX)?;
            (!stem.is_empty()).then(|| (snake_case(stem), EntityShape::Geometry))
        }
        Constructor::Light(_) if kind.type_name.ends_with(LIGHT_SUFFIX) && kind.type_name != LIGHT_SUFFIX => {
            Some((snake_case(kind.type_name), EntityShape::Light))
        }
        Constructor::Light(_) => None,
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, ch) in name.char_indices() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
