//! Adapter that exposes a user `LeastSquares` model as an `argmin` problem.
//!
//! The cost is the sum of squared residuals `c(θ) = Σ r_i(θ)²`. With an
//! analytic Jacobian `J = ∂r/∂θ` the gradient is `2 Jᵀ r`; without one the
//! cost closure is finite-differenced.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    least_squares::{
        finite_diff::fd_gradient,
        traits::{LeastSquares, sum_of_squares},
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_jacobian, validate_residuals},
    },
};
use argmin::core::{CostFunction, Error, Gradient};

/// Bridges a user `LeastSquares` model to `argmin`'s `CostFunction` and
/// `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LeastSquares> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LeastSquares> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user model and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: LeastSquares> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ) = Σ r_i(θ)²`.
    ///
    /// # Errors
    /// Propagates the model's `OptError`; a non-finite sum is reported as
    /// `OptError::NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let residuals = self.f.residuals(theta, self.data)?;
        let output = sum_of_squares(&residuals);
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: LeastSquares> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `∇c(θ)`.
    ///
    /// Behavior:
    /// - With an analytic Jacobian, validate residuals and Jacobian and
    ///   return `2 Jᵀ r`.
    /// - On `OptError::GradientNotImplemented`, finite-difference the cost
    ///   (central first, forward as fallback).
    ///
    /// # Errors
    /// - Propagates model errors other than `GradientNotImplemented`.
    /// - Returns validation errors for malformed derivatives.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.jacobian(theta, self.data) {
            Ok(jac) => {
                let residuals = self.f.residuals(theta, self.data)?;
                validate_residuals(&residuals, jac.nrows())?;
                validate_jacobian(&jac, residuals.len(), dim)?;
                let grad = jac.t().dot(&residuals) * 2.0;
                validate_grad(&grad, dim)?;
                Ok(grad)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                Ok(fd_gradient(theta, &cost_func, &closure_err)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptResult,
        least_squares::types::{Jacobian, Residuals},
    };
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, array};

    // Straight line y = m·x + c through the data, analytic Jacobian.
    struct Line;

    impl LeastSquares for Line {
        type Data = (Array1<f64>, Array1<f64>);

        fn residuals(&self, theta: &Theta, data: &Self::Data) -> OptResult<Residuals> {
            Ok(&data.1 - &(data.0.mapv(|x| theta[0] * x + theta[1])))
        }

        fn check(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<()> {
            Ok(())
        }

        fn jacobian(&self, _theta: &Theta, data: &Self::Data) -> OptResult<Jacobian> {
            let mut jac = Array2::zeros((data.0.len(), 2));
            for (i, &x) in data.0.iter().enumerate() {
                jac[[i, 0]] = -x;
                jac[[i, 1]] = -1.0;
            }
            Ok(jac)
        }
    }

    // Same model without a Jacobian.
    struct LineNoJacobian;

    impl LeastSquares for LineNoJacobian {
        type Data = (Array1<f64>, Array1<f64>);

        fn residuals(&self, theta: &Theta, data: &Self::Data) -> OptResult<Residuals> {
            Line.residuals(theta, data)
        }

        fn check(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // The analytic `2 Jᵀ r` gradient agrees with the finite-difference
    // fallback.
    //
    // Given
    // -----
    // - Four points and a parameter vector away from the optimum.
    //
    // Expect
    // ------
    // - Both gradients match to finite-difference accuracy.
    fn analytic_and_fd_gradients_agree() {
        // Arrange
        let data = (array![0.0, 1.0, 2.0, 3.0], array![1.0, 2.9, 5.2, 7.1]);
        let theta = array![1.5, 0.2];

        // Act
        let analytic = ArgMinAdapter::new(&Line, &data).gradient(&theta).unwrap();
        let numeric = ArgMinAdapter::new(&LineNoJacobian, &data).gradient(&theta).unwrap();

        // Assert
        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_relative_eq!(*a, *n, epsilon = 1e-5);
        }
    }

    #[test]
    fn cost_is_sum_of_squared_residuals() {
        let data = (array![0.0, 1.0], array![1.0, 1.0]);
        let cost = ArgMinAdapter::new(&Line, &data).cost(&array![0.0, 0.0]).unwrap();
        assert_relative_eq!(cost, 2.0);
    }
}
