/// Positivity constraints for trainable parameters
use candle_core::{DType, Result, Tensor};
use ndarray::{ArrayBase, ArrayD, Data, Dimension};
use num_traits::Float;

/// Default lower bound for constrained values
pub const DEFAULT_MINVAL: f64 = 1e-10;

/// Constrain a tensor to be positive: `max(|x|, minval)` elementwise
///
/// Output keeps the dtype and shape of `x`. Gradients flow through `abs`,
/// so a variable wrapped in `pos` can be optimised directly.
///
/// Fails when a positive `minval` rounds to zero in the dtype of `x`
/// (e.g. the default `1e-10` in F16/BF16); pass a larger `minval` there.
pub fn pos(x: &Tensor, minval: f64) -> Result<Tensor> {
    x.abs()?.maximum(&floor_like(x, minval)?)
}

/// `minval` broadcast to the shape and dtype of `x`
fn floor_like(x: &Tensor, minval: f64) -> Result<Tensor> {
    let floor = Tensor::new(minval, x.device())?.to_dtype(x.dtype())?;
    let stored = floor.to_dtype(DType::F64)?.to_scalar::<f64>()?;
    if minval > 0.0 && stored <= 0.0 {
        return Err(candle_core::Error::Msg(format!(
            "minval {:e} is not representable in {:?}",
            minval,
            x.dtype()
        )));
    }
    floor.broadcast_as(x.shape())
}

/// [`pos`] with [`DEFAULT_MINVAL`]
pub fn pos_default(x: &Tensor) -> Result<Tensor> {
    pos(x, DEFAULT_MINVAL)
}

/// Host-side counterpart of [`pos`] for ndarray values
pub fn pos_array<F, S, D>(x: &ArrayBase<S, D>, minval: F) -> ArrayD<F>
where
    F: Float,
    S: Data<Elem = F>,
    D: Dimension,
{
    x.mapv(|v| v.abs().max(minval)).into_dyn()
}

/// Strategy used to map an unconstrained parameter onto the positive reals
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Positivity {
    /// `max(|x|, minval)`: fastest, more local optima
    AbsClamp { minval: f64 },
    /// `exp(x)`: gradients tend to explode
    Exp,
    /// `ln(1 + exp(x))`: slowest but well behaved
    Softplus,
}

impl Default for Positivity {
    fn default() -> Self {
        Positivity::AbsClamp {
            minval: DEFAULT_MINVAL,
        }
    }
}

impl Positivity {
    /// Apply the constraint elementwise
    pub fn apply(&self, x: &Tensor) -> Result<Tensor> {
        match *self {
            Positivity::AbsClamp { minval } => pos(x, minval),
            Positivity::Exp => Self::floored(&x.exp()?),
            Positivity::Softplus => {
                // max(x, 0) + ln(1 + exp(-|x|)) stays finite for large x
                let tail = x.abs()?.neg()?.exp()?.affine(1.0, 1.0)?.log()?;
                Self::floored(&x.relu()?.add(&tail)?)
            }
        }
    }

    // exp/softplus underflow to exactly zero for very negative inputs
    fn floored(x: &Tensor) -> Result<Tensor> {
        x.maximum(&floor_like(x, DEFAULT_MINVAL)?)
    }
}
