//! Transform vocabulary and per-transform formulas
//!
//! Time is in seconds; angles are full-turn fractions (`1.0 == 360°`).

use super::value::{FrameContext, Value};
use super::{EvalError, NodeError};
use crate::engine::EngineObject;
use crate::foundation::math::{utils, Color, Vec3};

/// Supported transform kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Static offset plus linear drift
    Translate,
    /// Orbit about the origin and reorient
    Rotate,
    /// Uniform amount times per-axis multipliers
    Scale,
    /// Overwrite material or light color
    Color,
    /// Face a fixed point
    LookAt,
}

impl TransformKind {
    /// Name used in logs and errors
    pub fn name(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
            Self::Color => "color",
            Self::LookAt => "look_at",
        }
    }

    /// Formal parameters and their defaults, in positional order
    pub fn params(self) -> &'static [(&'static str, f64)] {
        match self {
            Self::Translate | Self::Rotate => &[
                ("x", 0.0),
                ("y", 0.0),
                ("z", 0.0),
                ("speed_x", 0.0),
                ("speed_y", 0.0),
                ("speed_z", 0.0),
            ],
            Self::Scale => &[("amount", 1.5), ("x_mult", 1.0), ("y_mult", 1.0), ("z_mult", 1.0)],
            Self::Color => &[("r", 1.0), ("g", 1.0), ("b", 1.0)],
            Self::LookAt => &[("x", 0.0), ("y", 0.0), ("z", 0.0)],
        }
    }

    /// Apply the formula with fully resolved arguments
    fn apply(self, time: f64, object: &mut EngineObject, a: &[f64]) {
        match self {
            Self::Translate => {
                object.pose.position = Vec3::new(a[0] + a[3] * time, a[1] + a[4] * time, a[2] + a[5] * time);
            }
            Self::Rotate => {
                let rotation = utils::euler_xyz(
                    utils::turns_to_rad(a[0] + a[3] * time),
                    utils::turns_to_rad(a[1] + a[4] * time),
                    utils::turns_to_rad(a[2] + a[5] * time),
                );
                object.revolve(&rotation);
            }
            Self::Scale => {
                object.pose.scale = Vec3::new(a[0] * a[1], a[0] * a[2], a[0] * a[3]);
            }
            Self::Color => {
                object.set_color(Color::new(a[0], a[1], a[2]));
            }
            Self::LookAt => object.look_at(&Vec3::new(a[0], a[1], a[2])),
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A transform kind with its arguments, padded to the full parameter list
#[derive(Debug, Clone)]
pub struct TransformOp {
    kind: TransformKind,
    args: Vec<Value>,
}

impl TransformOp {
    /// Validate positional arguments and fill the rest from defaults
    pub fn new(kind: TransformKind, args: &[Value]) -> Result<Self, NodeError> {
        let params = kind.params();
        if args.len() > params.len() {
            return Err(NodeError::TooManyArguments {
                transform: kind,
                expected: params.len(),
                given: args.len(),
            });
        }
        for (index, arg) in args.iter().enumerate() {
            if let Value::Constant(value) = arg {
                if !value.is_finite() {
                    return Err(NodeError::InvalidArgument {
                        transform: kind,
                        param: params[index].0,
                        value: *value,
                    });
                }
            }
        }

        let args = params
            .iter()
            .enumerate()
            .map(|(index, (_, default))| args.get(index).cloned().unwrap_or(Value::Constant(*default)))
            .collect();
        Ok(Self { kind, args })
    }

    /// Transform kind
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Evaluate every argument for `time`
    pub fn resolve(&self, time: f64) -> Result<Vec<f64>, EvalError> {
        let frame = FrameContext { time };
        self.args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                let value = arg.resolve(frame).map_err(|err| EvalError::Argument {
                    transform: self.kind,
                    param: self.kind.params()[index].0,
                    message: err.to_string(),
                })?;
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(EvalError::NonFinite {
                        transform: self.kind,
                        param: self.kind.params()[index].0,
                        value,
                    })
                }
            })
            .collect()
    }

    /// Apply previously resolved arguments to `object`
    pub fn apply(&self, time: f64, object: &mut EngineObject, resolved: &[f64]) {
        debug_assert_eq!(resolved.len(), self.args.len());
        self.kind.apply(time, object, resolved);
    }
}
