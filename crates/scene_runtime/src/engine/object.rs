//! Engine objects
//!
//! Value-semantic stand-ins for the objects a rendering engine keeps in its
//! scene graph: meshes, lights and cameras. Every object carries a [`Pose`];
//! cloning one produces a fully independent copy, which is what lets derived
//! nodes own their state without aliasing their parent.

use crate::foundation::math::{utils, Color, Pose, Quat, Vec3};

/// Geometry description produced by a geometry constructor
///
/// The runtime never looks inside geometry; it only carries the engine type
/// name and the resolved constructor arguments through to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Engine type name, e.g. `SphereGeometry`
    pub kind: &'static str,
    /// Resolved constructor arguments in declaration order
    pub params: Vec<f64>,
}

/// Surface material of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Diffuse color
    pub color: Color,
}

/// A renderable mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Shape of the mesh
    pub geometry: Geometry,
    /// Material applied to the mesh
    pub material: Material,
}

/// Types of lights the engine can construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Uniform light on every surface
    Ambient,
    /// Parallel rays, like sunlight
    Directional,
    /// Sky/ground gradient
    Hemisphere,
    /// Radiates in all directions from a position
    Point,
    /// Rectangular emitter
    RectArea,
    /// Cone of light from a position
    Spot,
}

/// A light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// The type of light
    pub kind: LightKind,
    /// RGB color of the light
    pub color: Color,
    /// Light intensity multiplier
    pub intensity: f64,
    /// Maximum range for point/spot lights, `0.0` meaning unlimited
    pub range: f64,
    /// Falloff exponent for point/spot lights
    pub decay: f64,
    /// Cone half-angle in radians for spot lights
    pub angle: f64,
    /// Cone edge softness for spot lights
    pub penumbra: f64,
    /// Ground color for hemisphere lights
    pub ground_color: Color,
    /// Emitter extent for rect-area lights
    pub extent: (f64, f64),
}

impl Light {
    /// Create a light with the common defaults for every optional property
    pub fn new(kind: LightKind, color: Color, intensity: f64) -> Self {
        Self {
            kind,
            color,
            intensity,
            range: 0.0,
            decay: 2.0,
            angle: std::f64::consts::FRAC_PI_3,
            penumbra: 0.0,
            ground_color: Color::zeros(),
            extent: (10.0, 10.0),
        }
    }
}

/// Perspective projection parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f64,
    /// Width / height of the surface when the camera was built
    pub aspect: f64,
    /// Near clipping plane
    pub near: f64,
    /// Far clipping plane
    pub far: f64,
}

/// What an engine object is
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectBody {
    /// Geometry plus material
    Mesh(Mesh),
    /// Light source
    Light(Light),
    /// Viewpoint
    Camera(PerspectiveCamera),
}

/// Coarse classification of an engine object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// See [`ObjectBody::Mesh`]
    Mesh,
    /// See [`ObjectBody::Light`]
    Light,
    /// See [`ObjectBody::Camera`]
    Camera,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mesh => "mesh",
            Self::Light => "light",
            Self::Camera => "camera",
        };
        f.write_str(name)
    }
}

/// One object in the engine's scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct EngineObject {
    /// Position, rotation and scale
    pub pose: Pose,
    /// Kind-specific state
    pub body: ObjectBody,
}

impl EngineObject {
    /// Wrap a body at the identity pose
    pub fn new(body: ObjectBody) -> Self {
        Self {
            pose: Pose::identity(),
            body,
        }
    }

    /// Classify the object
    pub fn kind(&self) -> ObjectKind {
        match self.body {
            ObjectBody::Mesh(_) => ObjectKind::Mesh,
            ObjectBody::Light(_) => ObjectKind::Light,
            ObjectBody::Camera(_) => ObjectKind::Camera,
        }
    }

    /// Material color for meshes, emitted color for lights
    pub fn color(&self) -> Option<Color> {
        match &self.body {
            ObjectBody::Mesh(mesh) => Some(mesh.material.color),
            ObjectBody::Light(light) => Some(light.color),
            ObjectBody::Camera(_) => None,
        }
    }

    /// Overwrite the color; returns `false` for objects without one
    pub fn set_color(&mut self, color: Color) -> bool {
        match &mut self.body {
            ObjectBody::Mesh(mesh) => mesh.material.color = color,
            ObjectBody::Light(light) => light.color = color,
            ObjectBody::Camera(_) => return false,
        }
        true
    }

    /// Copy pose and color from `source`
    ///
    /// Everything else (geometry, light type, projection) stays as cloned.
    pub fn inherit_from(&mut self, source: &EngineObject) {
        self.pose.clone_from(&source.pose);
        if let Some(color) = source.color() {
            self.set_color(color);
        }
    }

    /// Rotate the object so it faces `target`
    ///
    /// Meshes point their +Z axis at the target; cameras and lights look down
    /// -Z, so they point -Z at it. A target at the object's own position
    /// leaves the rotation untouched.
    pub fn look_at(&mut self, target: &Vec3) {
        let toward = target - self.pose.position;
        let forward = match self.kind() {
            ObjectKind::Mesh => toward,
            ObjectKind::Light | ObjectKind::Camera => -toward,
        };
        if let Some(rotation) = utils::face_towards(&forward) {
            self.pose.rotation = rotation;
        }
    }

    /// Revolve the object about the origin and reorient it by `rotation`
    pub fn revolve(&mut self, rotation: &Quat) {
        self.pose.position = rotation * self.pose.position;
        self.pose.rotation = rotation * self.pose.rotation;
    }
}
