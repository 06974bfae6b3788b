//! Functional transformation chains
//!
//! A [`Node`] wraps exactly one engine object. Calling a transform on a node
//! never mutates it: the object is cloned and a new node is returned whose
//! tick derives its state from the parent's state at the same time value.
//!
//! ```
//! use scene_runtime::args;
//! use scene_runtime::engine::{EngineObject, Geometry, Material, Mesh, ObjectBody};
//! use scene_runtime::foundation::math::{Color, Vec3};
//! use scene_runtime::node::Node;
//!
//! let cube = Node::new(EngineObject::new(ObjectBody::Mesh(Mesh {
//!     geometry: Geometry { kind: "BoxGeometry", params: vec![1.0, 1.0, 1.0] },
//!     material: Material { color: Color::new(1.0, 1.0, 1.0) },
//! })));
//! let drifting = cube.translate(&args![0, 0, 0, 1]).unwrap();
//!
//! drifting.tick(2.0).unwrap();
//! assert_eq!(drifting.position(), Vec3::new(2.0, 0.0, 0.0));
//! assert_eq!(cube.position(), Vec3::zeros());
//! ```

pub mod transform;
pub mod value;

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::engine::{EngineObject, ObjectKind};
use crate::foundation::math::{Color, Pose, Quat, Vec3};

pub use transform::{TransformKind, TransformOp};
pub use value::{DynamicError, FrameContext, Value};

/// Errors raised while building a transform
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// More positional arguments than the transform declares
    #[error("{transform} takes at most {expected} arguments, got {given}")]
    TooManyArguments {
        /// Transform being built
        transform: TransformKind,
        /// Declared parameter count
        expected: usize,
        /// Arguments supplied
        given: usize,
    },

    /// A constant argument that is NaN or infinite
    #[error("{transform}: {param} must be finite, got {value}")]
    InvalidArgument {
        /// Transform being built
        transform: TransformKind,
        /// Parameter name
        param: &'static str,
        /// Rejected value
        value: f64,
    },

    /// The transform does not apply to this kind of object
    #[error("{transform} is not supported on a {kind}")]
    Unsupported {
        /// Transform being built
        transform: TransformKind,
        /// Kind of the wrapped object
        kind: ObjectKind,
    },
}

/// Errors raised while evaluating a node for one frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A dynamic argument returned an error
    #[error("{transform}: argument {param} failed: {message}")]
    Argument {
        /// Transform being evaluated
        transform: TransformKind,
        /// Parameter name
        param: &'static str,
        /// Error reported by the argument
        message: String,
    },

    /// A dynamic argument returned NaN or infinity
    #[error("{transform}: argument {param} is not finite ({value})")]
    NonFinite {
        /// Transform being evaluated
        transform: TransformKind,
        /// Parameter name
        param: &'static str,
        /// Returned value
        value: f64,
    },

    /// Evaluation for this time never completed, either because it panicked
    /// or because the node was ticked again from inside its own evaluation
    #[error("{transform}: evaluation did not complete")]
    Incomplete {
        /// Transform being evaluated
        transform: TransformKind,
    },
}

struct Derivation {
    parent: Node,
    op: TransformOp,
}

struct NodeInner {
    object: RefCell<EngineObject>,
    derivation: Option<Derivation>,
    last_tick: RefCell<Option<(f64, Result<(), EvalError>)>>,
}

/// Handle onto one engine object and the transform that derives it
///
/// Cloning the handle is cheap and yields the same node; use
/// [`Node::ptr_eq`] to compare identity.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

impl Node {
    /// Root node around `object`; its tick does nothing
    pub fn new(object: EngineObject) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                object: RefCell::new(object),
                derivation: None,
                last_tick: RefCell::new(None),
            }),
        }
    }

    /// Static offset plus drift: `x, y, z, speed_x, speed_y, speed_z`
    pub fn translate(&self, args: &[Value]) -> Result<Node, NodeError> {
        self.derive(TransformKind::Translate, args)
    }

    /// Orbit and reorient in turns: `x, y, z, speed_x, speed_y, speed_z`
    ///
    /// The rotation is applied to the inherited position as well as the
    /// orientation, so a translated node revolves about the origin.
    pub fn rotate(&self, args: &[Value]) -> Result<Node, NodeError> {
        self.derive(TransformKind::Rotate, args)
    }

    /// Uniform scale with per-axis multipliers: `amount, x_mult, y_mult, z_mult`
    pub fn scale(&self, args: &[Value]) -> Result<Node, NodeError> {
        self.derive(TransformKind::Scale, args)
    }

    /// Material or light color: `r, g, b`
    pub fn color(&self, args: &[Value]) -> Result<Node, NodeError> {
        self.derive(TransformKind::Color, args)
    }

    /// Face a point: `x, y, z`
    pub fn look_at(&self, args: &[Value]) -> Result<Node, NodeError> {
        self.derive(TransformKind::LookAt, args)
    }

    fn derive(&self, kind: TransformKind, args: &[Value]) -> Result<Node, NodeError> {
        let object = self.inner.object.borrow().clone();
        if kind == TransformKind::Color && object.color().is_none() {
            return Err(NodeError::Unsupported {
                transform: kind,
                kind: object.kind(),
            });
        }
        let op = TransformOp::new(kind, args)?;

        Ok(Self {
            inner: Rc::new(NodeInner {
                object: RefCell::new(object),
                derivation: Some(Derivation {
                    parent: self.clone(),
                    op,
                }),
                last_tick: RefCell::new(None),
            }),
        })
    }

    /// Bring the wrapped object up to date for `time`
    ///
    /// Ancestors are evaluated first. A second call with the same `time`
    /// returns the first call's outcome without evaluating again, so every
    /// dependent of a failed node sees the same failure.
    pub fn tick(&self, time: f64) -> Result<(), EvalError> {
        if let Some((seen, outcome)) = self.inner.last_tick.borrow().as_ref() {
            if *seen == time {
                return outcome.clone();
            }
        }

        let Some(derivation) = &self.inner.derivation else {
            self.inner.last_tick.replace(Some((time, Ok(()))));
            return Ok(());
        };

        // Stays in place if evaluation unwinds.
        let pending = Err(EvalError::Incomplete {
            transform: derivation.op.kind(),
        });
        self.inner.last_tick.replace(Some((time, pending)));

        let outcome = Self::evaluate(derivation, &self.inner.object, time);
        self.inner.last_tick.replace(Some((time, outcome.clone())));
        outcome
    }

    fn evaluate(derivation: &Derivation, object: &RefCell<EngineObject>, time: f64) -> Result<(), EvalError> {
        derivation.parent.tick(time)?;

        // Dynamic arguments run with no borrow held.
        let resolved = derivation.op.resolve(time)?;

        let parent = derivation.parent.inner.object.borrow();
        let mut object = object.borrow_mut();
        object.inherit_from(&parent);
        derivation.op.apply(time, &mut object, &resolved);
        Ok(())
    }

    /// Borrow the wrapped engine object
    pub fn object(&self) -> Ref<'_, EngineObject> {
        self.inner.object.borrow()
    }

    /// Copy of the current pose
    pub fn pose(&self) -> Pose {
        self.inner.object.borrow().pose.clone()
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.inner.object.borrow().pose.position
    }

    /// Current orientation
    pub fn rotation(&self) -> Quat {
        self.inner.object.borrow().pose.rotation
    }

    /// Current per-axis scale
    pub fn current_scale(&self) -> Vec3 {
        self.inner.object.borrow().pose.scale
    }

    /// Current material or light color; `None` for cameras
    pub fn current_color(&self) -> Option<Color> {
        self.inner.object.borrow().color()
    }

    /// What the node wraps
    pub fn kind(&self) -> ObjectKind {
        self.inner.object.borrow().kind()
    }

    /// Whether the node wraps a light
    pub fn is_light(&self) -> bool {
        self.kind() == ObjectKind::Light
    }

    /// Whether the node wraps a mesh
    pub fn is_mesh(&self) -> bool {
        self.kind() == ObjectKind::Mesh
    }

    /// Whether the node wraps a camera
    pub fn is_camera(&self) -> bool {
        self.kind() == ObjectKind::Camera
    }

    /// Node this one was derived from
    pub fn parent(&self) -> Option<&Node> {
        self.inner.derivation.as_ref().map(|d| &d.parent)
    }

    /// Transform this node applies to its parent
    pub fn transform(&self) -> Option<TransformKind> {
        self.inner.derivation.as_ref().map(|d| d.op.kind())
    }

    /// Number of transforms between this node and its root
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(node) = current {
            depth += 1;
            current = node.parent();
        }
        depth
    }

    /// Time of the most recent tick
    pub fn last_tick(&self) -> Option<f64> {
        self.inner.last_tick.borrow().as_ref().map(|(time, _)| *time)
    }

    /// Whether both handles refer to the same node
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("transform", &self.transform())
            .field("depth", &self.depth())
            .field("last_tick", &self.last_tick())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::engine::{Geometry, Light, LightKind, Material, Mesh, ObjectBody, PerspectiveCamera};
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::f64::consts::FRAC_PI_2;

    fn cube() -> Node {
        Node::new(EngineObject::new(ObjectBody::Mesh(Mesh {
            geometry: Geometry {
                kind: "BoxGeometry",
                params: vec![1.0, 1.0, 1.0],
            },
            material: Material {
                color: Color::new(0.9, 0.9, 0.9),
            },
        })))
    }

    fn counting(calls: &Rc<Cell<u32>>) -> Value {
        let calls = Rc::clone(calls);
        Value::dynamic(move |frame| {
            calls.set(calls.get() + 1);
            frame.time
        })
    }

    #[test]
    fn test_tick_is_memoized_per_time() {
        let calls = Rc::new(Cell::new(0));
        let node = cube().translate(&[counting(&calls)]).expect("valid translate");

        node.tick(1.0).expect("tick");
        node.tick(1.0).expect("tick");
        assert_eq!(calls.get(), 1);
        assert_eq!(node.last_tick(), Some(1.0));

        node.tick(1.5).expect("tick");
        assert_eq!(calls.get(), 2);
        assert_relative_eq!(node.position(), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_parent_is_independent() {
        let root = cube();
        let moved = root.translate(&args![3, 0, 0]).expect("valid translate");
        let left = moved.scale(&args![2]).expect("valid scale");
        let right = moved.color(&args![1, 0, 0]).expect("valid color");

        left.tick(0.0).expect("tick");
        right.tick(0.0).expect("tick");

        assert_eq!(root.position(), Vec3::zeros());
        assert_eq!(root.current_color(), Some(Color::new(0.9, 0.9, 0.9)));
        assert_eq!(moved.current_scale(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(left.current_scale(), Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(left.current_color(), Some(Color::new(0.9, 0.9, 0.9)));
        assert_eq!(right.current_color(), Some(Color::new(1.0, 0.0, 0.0)));
        assert_eq!(right.current_scale(), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(right.position(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_drift() {
        let node = cube().translate(&args![0, 0, 0, 1]).expect("valid translate");
        node.tick(2.0).expect("tick");
        assert_relative_eq!(node.position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_translate_overwrites_inherited_position() {
        let node = cube()
            .translate(&args![5, 5, 5])
            .and_then(|n| n.translate(&args![1]))
            .expect("valid chain");
        node.tick(0.0).expect("tick");
        assert_eq!(node.position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_quarter_turn_also_revolves_position() {
        let node = cube()
            .translate(&args![1])
            .and_then(|n| n.rotate(&args![0, 0.25]))
            .expect("valid chain");
        node.tick(0.0).expect("tick");

        assert_relative_eq!(
            node.rotation(),
            Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2),
            epsilon = 1e-9
        );
        // Rotation orbits the translated node about the origin, not in place.
        assert_relative_eq!(node.position(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_speed_is_time_driven() {
        let node = cube().rotate(&args![0, 0, 0, 0, 0, 0.5]).expect("valid rotate");
        node.tick(1.0).expect("tick");
        assert_relative_eq!(
            node.rotation(),
            Quat::from_axis_angle(&Vec3::z_axis(), std::f64::consts::PI),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_shared_ancestor_ticks_once() {
        let calls = Rc::new(Cell::new(0));
        let shared = cube().translate(&[counting(&calls)]).expect("valid translate");
        let a = shared.scale(&[]).expect("valid scale");
        let b = shared.look_at(&args![0, 0, 10]).expect("valid look_at");

        a.tick(0.5).expect("tick");
        b.tick(0.5).expect("tick");
        assert_eq!(calls.get(), 1);
        assert_eq!(b.position(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_failed_tick_repeats_its_error_for_same_time() {
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        let node = cube()
            .translate(&[Value::try_dynamic(move |_| {
                counter.set(counter.get() + 1);
                Err("offline".into())
            })])
            .expect("valid translate");

        let first = node.tick(1.0);
        assert!(matches!(first, Err(EvalError::Argument { .. })));
        assert_eq!(node.tick(1.0), first);
        assert_eq!(attempts.get(), 1);
        assert!(node.tick(2.0).is_err());
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn test_failed_ancestor_fails_every_dependent() {
        let failing = cube()
            .translate(&[Value::try_dynamic(|frame| {
                if frame.time > 0.5 {
                    Err("lost signal".into())
                } else {
                    Ok(frame.time)
                }
            })])
            .expect("valid translate");
        let big = failing.scale(&args![2]).expect("valid scale");
        let tinted = failing.color(&args![0, 1, 0]).expect("valid color");

        assert!(failing.tick(1.0).is_err());
        assert!(matches!(big.tick(1.0), Err(EvalError::Argument { .. })));
        assert!(matches!(tinted.tick(1.0), Err(EvalError::Argument { .. })));
        assert_eq!(big.last_tick(), Some(1.0));
    }

    #[test]
    fn test_interrupted_tick_is_incomplete() {
        let node = cube()
            .translate(&[Value::dynamic(|_| panic!("argument exploded"))])
            .expect("valid translate");

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| node.tick(1.0)));
        assert!(unwound.is_err());
        assert_eq!(
            node.tick(1.0),
            Err(EvalError::Incomplete {
                transform: TransformKind::Translate
            })
        );
    }

    #[test]
    fn test_translate_branches_leave_root_at_origin() {
        let root = cube();
        let right = root.translate(&args![1, 0, 0]).expect("valid translate");
        let left = root.translate(&args![-1, 0, 0]).expect("valid translate");

        right.tick(0.0).expect("tick");
        left.tick(0.0).expect("tick");

        assert_eq!(right.position(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(left.position(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(root.position(), Vec3::zeros());
    }

    #[test]
    fn test_quarter_turn_about_x_revolves_position() {
        let node = cube()
            .translate(&args![0, 1, 0])
            .and_then(|n| n.rotate(&args![0.25, 0, 0]))
            .expect("valid chain");
        node.tick(0.0).expect("tick");

        assert_relative_eq!(node.position(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(
            node.rotation(),
            Quat::from_axis_angle(&Vec3::x_axis(), FRAC_PI_2),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_color_on_camera_is_rejected() {
        let camera = Node::new(EngineObject::new(ObjectBody::Camera(PerspectiveCamera {
            fov: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        })));
        assert!(matches!(
            camera.color(&args![1, 0, 0]),
            Err(NodeError::Unsupported {
                kind: ObjectKind::Camera,
                ..
            })
        ));
        assert!(camera.translate(&args![0, 0, 5]).is_ok());
    }

    #[test]
    fn test_light_inherits_color() {
        let light = Node::new(EngineObject::new(ObjectBody::Light(Light::new(
            LightKind::Point,
            Color::new(1.0, 1.0, 1.0),
            1.0,
        ))));
        let node = light
            .color(&args![0, 0, 1])
            .and_then(|n| n.translate(&args![0, 2]))
            .expect("valid chain");
        node.tick(0.0).expect("tick");

        assert!(node.is_light());
        assert_eq!(node.current_color(), Some(Color::new(0.0, 0.0, 1.0)));
        assert_eq!(node.position(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_too_many_arguments() {
        let result = cube().scale(&args![1, 1, 1, 1, 1]);
        assert!(matches!(result, Err(NodeError::TooManyArguments { given: 5, .. })));
    }

    #[test]
    fn test_introspection() {
        let root = cube();
        let node = root
            .translate(&[])
            .and_then(|n| n.scale(&[]))
            .expect("valid chain");

        assert_eq!(node.depth(), 2);
        assert_eq!(node.transform(), Some(TransformKind::Scale));
        assert!(node.parent().and_then(Node::parent).is_some_and(|p| p.ptr_eq(&root)));
        assert!(root.transform().is_none());
        assert!(node.clone().ptr_eq(&node));
        assert!(!node.ptr_eq(&root));
    }
}
