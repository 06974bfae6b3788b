//! Entity kinds exported by the engine
//!
//! The engine advertises every constructible type it knows about, together
//! with its constructor signature as declared source text (for example
//! `"radius = 1, detail = 0"`). The entity registry decides which of these it
//! can drive from numeric live-code arguments.

use super::object::{Geometry, Light, LightKind};
use super::EngineError;
use crate::foundation::math::{utils, Color};

/// Resolved positional constructor arguments; `None` marks a parameter with no
/// argument and no default
pub type ResolvedArgs<'a> = &'a [Option<f64>];

/// How the engine constructs one entity kind
#[derive(Clone, Copy)]
pub enum Constructor {
    /// Produces mesh geometry
    Geometry(fn(&'static str, ResolvedArgs<'_>) -> Result<Geometry, EngineError>),
    /// Produces a light
    Light(fn(ResolvedArgs<'_>) -> Result<Light, EngineError>),
}

impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geometry(_) => f.write_str("Constructor::Geometry"),
            Self::Light(_) => f.write_str("Constructor::Light"),
        }
    }
}

/// Constructor signature as the engine exposes it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorSignature {
    /// Parameter list source text, without parentheses
    Declared(&'static str),
    /// The engine offers no readable signature
    Opaque,
}

/// One exported entity type
#[derive(Debug, Clone, Copy)]
pub struct EntityKindInfo {
    /// Engine type name, e.g. `TorusKnotGeometry`
    pub type_name: &'static str,
    /// Declared constructor signature
    pub signature: ConstructorSignature,
    /// Constructor entry point
    pub constructor: Constructor,
}

impl EntityKindInfo {
    const fn geometry(type_name: &'static str, signature: &'static str) -> Self {
        Self {
            type_name,
            signature: ConstructorSignature::Declared(signature),
            constructor: Constructor::Geometry(parametric_geometry),
        }
    }

    const fn light(
        type_name: &'static str,
        signature: &'static str,
        build: fn(ResolvedArgs<'_>) -> Result<Light, EngineError>,
    ) -> Self {
        Self {
            type_name,
            signature: ConstructorSignature::Declared(signature),
            constructor: Constructor::Light(build),
        }
    }
}

const BUILTIN_KINDS: &[EntityKindInfo] = &[
    EntityKindInfo::geometry(
        "BoxGeometry",
        "width = 1, height = 1, depth = 1, widthSegments = 1, heightSegments = 1, depthSegments = 1",
    ),
    EntityKindInfo::geometry("CapsuleGeometry", "radius = 1, length = 1, capSegments = 4, radialSegments = 8"),
    EntityKindInfo::geometry(
        "CircleGeometry",
        "radius = 1, segments = 32, thetaStart = 0, thetaLength = 6.283185307179586",
    ),
    EntityKindInfo::geometry(
        "ConeGeometry",
        "radius = 1, height = 1, radialSegments = 32, heightSegments = 1, openEnded = false, thetaStart = 0, thetaLength = 6.283185307179586",
    ),
    EntityKindInfo::geometry(
        "CylinderGeometry",
        "radiusTop = 1, radiusBottom = 1, height = 1, radialSegments = 32, heightSegments = 1, openEnded = false, thetaStart = 0, thetaLength = 6.283185307179586",
    ),
    EntityKindInfo::geometry("DodecahedronGeometry", "radius = 1, detail = 0"),
    EntityKindInfo {
        type_name: "EdgesGeometry",
        signature: ConstructorSignature::Opaque,
        constructor: Constructor::Geometry(parametric_geometry),
    },
    EntityKindInfo::geometry("ExtrudeGeometry", "shapes = new Shape( [ new Vector2( 0.5, 0.5 ) ] ), options = {}"),
    EntityKindInfo::geometry("IcosahedronGeometry", "radius = 1, detail = 0"),
    EntityKindInfo::geometry("LatheGeometry", "points = [ new Vector2( 0, - 0.5 ) ], segments = 12"),
    EntityKindInfo::geometry("OctahedronGeometry", "radius = 1, detail = 0"),
    EntityKindInfo::geometry("PlaneGeometry", "width = 1, height = 1, widthSegments = 1, heightSegments = 1"),
    EntityKindInfo::geometry(
        "RingGeometry",
        "innerRadius = 0.5, outerRadius = 1, thetaSegments = 32, phiSegments = 1, thetaStart = 0, thetaLength = 6.283185307179586",
    ),
    EntityKindInfo::geometry("ShapeGeometry", "shapes = new Shape( [ new Vector2( 0, 0.5 ) ] ), curveSegments = 12"),
    EntityKindInfo::geometry(
        "SphereGeometry",
        "radius = 1, widthSegments = 32, heightSegments = 16, phiStart = 0, phiLength = 6.283185307179586, thetaStart = 0, thetaLength = 3.141592653589793",
    ),
    EntityKindInfo::geometry("TetrahedronGeometry", "radius = 1, detail = 0"),
    EntityKindInfo::geometry(
        "TorusGeometry",
        "radius = 1, tube = 0.4, radialSegments = 12, tubularSegments = 48, arc = 6.283185307179586",
    ),
    EntityKindInfo::geometry(
        "TorusKnotGeometry",
        "radius = 1, tube = 0.4, tubularSegments = 64, radialSegments = 8, p = 2, q = 3",
    ),
    EntityKindInfo::geometry("TubeGeometry", "path = new QuadraticBezierCurve3(), tubularSegments = 64, radius = 1"),
    EntityKindInfo::light("AmbientLight", "color = 0xffffff, intensity = 1", ambient_light),
    EntityKindInfo::light("DirectionalLight", "color = 0xffffff, intensity = 1", directional_light),
    EntityKindInfo::light(
        "HemisphereLight",
        "skyColor = 0xffffff, groundColor = 0x444444, intensity = 1",
        hemisphere_light,
    ),
    EntityKindInfo::light("LightProbe", "sh = new SphericalHarmonics3(), intensity = 1", ambient_light),
    EntityKindInfo::light("PointLight", "color = 0xffffff, intensity = 1, distance = 0, decay = 2", point_light),
    EntityKindInfo::light(
        "RectAreaLight",
        "color = 0xffffff, intensity = 1, width = 10, height = 10",
        rect_area_light,
    ),
    EntityKindInfo::light(
        "SpotLight",
        "color = 0xffffff, intensity = 1, distance = 0, angle = 1.0471975511965976, penumbra = 0, decay = 2",
        spot_light,
    ),
];

/// Every entity type the built-in engine exports
pub fn builtin_kinds() -> Vec<EntityKindInfo> {
    BUILTIN_KINDS.to_vec()
}

fn required(args: ResolvedArgs<'_>, index: usize, param: &'static str) -> Result<f64, EngineError> {
    match args.get(index).copied().flatten() {
        Some(value) if value.is_finite() => Ok(value),
        Some(value) => Err(EngineError::InvalidArgument {
            param,
            reason: format!("{value} is not finite"),
        }),
        None => Err(EngineError::MissingArgument { param }),
    }
}

fn hex_color(args: ResolvedArgs<'_>, index: usize, param: &'static str) -> Result<Color, EngineError> {
    let value = required(args, index, param)?;
    if !(0.0..=f64::from(0x00ff_ffff_u32)).contains(&value) {
        return Err(EngineError::InvalidArgument {
            param,
            reason: format!("{value} is not a 0xRRGGBB color"),
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let packed = value as u32;
    Ok(utils::color_from_hex(packed))
}

/// Geometry whose arguments are all plain numbers
fn parametric_geometry(kind: &'static str, args: ResolvedArgs<'_>) -> Result<Geometry, EngineError> {
    let params = args
        .iter()
        .enumerate()
        .map(|(index, arg)| match arg {
            Some(value) if value.is_finite() => Ok(*value),
            Some(value) => Err(EngineError::InvalidArgument {
                param: kind,
                reason: format!("argument {index} ({value}) is not finite"),
            }),
            None => Err(EngineError::MissingArgument { param: kind }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Geometry { kind, params })
}

fn ambient_light(args: ResolvedArgs<'_>) -> Result<Light, EngineError> {
    Ok(Light::new(
        LightKind::Ambient,
        hex_color(args, 0, "color")?,
        required(args, 1, "intensity")?,
    ))
}

fn directional_light(args: ResolvedArgs<'_>) -> Result<Light, EngineError> {
    Ok(Light::new(
        LightKind::Directional,
        hex_color(args, 0, "color")?,
        required(args, 1, "intensity")?,
    ))
}

fn hemisphere_light(args: ResolvedArgs<'_>) -> Result<Light, EngineError> {
    let mut light = Light::new(
        LightKind::Hemisphere,
        hex_color(args, 0, "skyColor")?,
        required(args, 2, "intensity")?,
    );
    light.ground_color = hex_color(args, 1, "groundColor")?;
    Ok(light)
}

fn point_light(args: ResolvedArgs<'_>) -> Result<Light, EngineError> {
    let mut light = Light::new(
        LightKind::Point,
        hex_color(args, 0, "color")?,
        required(args, 1, "intensity")?,
    );
    light.range = required(args, 2, "distance")?;
    light.decay = required(args, 3, "decay")?;
    Ok(light)
}

fn rect_area_light(args: ResolvedArgs<'_>) -> Result<Light, EngineError> {
    let mut light = Light::new(
        LightKind::RectArea,
        hex_color(args, 0, "color")?,
        required(args, 1, "intensity")?,
    );
    light.extent = (required(args, 2, "width")?, required(args, 3, "height")?);
    Ok(light)
}

fn spot_light(args: ResolvedArgs<'_>) -> Result<Light, EngineError> {
    let mut light = Light::new(
        LightKind::Spot,
        hex_color(args, 0, "color")?,
        required(args, 1, "intensity")?,
    );
    light.range = required(args, 2, "distance")?;
    light.angle = required(args, 3, "angle")?;
    light.penumbra = required(args, 4, "penumbra")?;
    light.decay = required(args, 5, "decay")?;
    Ok(light)
}
