//! Transform arguments
//!
//! Every transform argument is either a constant or a function of the frame
//! time, re-evaluated on every tick.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

/// What a dynamic argument is evaluated against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Synthesized time in seconds
    pub time: f64,
}

/// Error type dynamic arguments may return
pub type DynamicError = Box<dyn Error>;

type DynamicFn = dyn Fn(FrameContext) -> Result<f64, DynamicError>;

/// A transform argument
#[derive(Clone)]
pub enum Value {
    /// Same value every frame
    Constant(f64),
    /// Evaluated with the current [`FrameContext`] on every tick
    Dynamic(Rc<DynamicFn>),
}

impl Value {
    /// Argument computed from the frame time
    ///
    /// ```
    /// use scene_runtime::node::{FrameContext, Value};
    ///
    /// let wobble = Value::dynamic(|frame| frame.time.sin());
    /// assert_eq!(wobble.resolve(FrameContext { time: 0.0 }).ok(), Some(0.0));
    /// ```
    pub fn dynamic(f: impl Fn(FrameContext) -> f64 + 'static) -> Self {
        Self::Dynamic(Rc::new(move |frame| Ok(f(frame))))
    }

    /// Argument computed from the frame time that may fail
    ///
    /// A failure is reported for the frame and the scene keeps its last good
    /// state; the frame loop continues.
    pub fn try_dynamic(f: impl Fn(FrameContext) -> Result<f64, DynamicError> + 'static) -> Self {
        Self::Dynamic(Rc::new(f))
    }

    /// Evaluate for one frame
    pub fn resolve(&self, frame: FrameContext) -> Result<f64, DynamicError> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::Dynamic(f) => f(frame),
        }
    }

    /// Whether the value changes with time
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Constant(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Constant(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Constant(f64::from(value))
    }
}

/// Build an array of transform arguments
///
/// Each item is converted with `Value::from`, so numbers and [`Value`]s mix
/// freely:
///
/// ```
/// use scene_runtime::args;
/// use scene_runtime::node::Value;
///
/// let orbit = args![0, 0, 0, 0, Value::dynamic(|f| f.time * 0.1)];
/// assert_eq!(orbit.len(), 5);
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        [$($crate::node::Value::from($value)),*]
    };
}
