use cartpole_core::CartPole;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut2, Zip};

use super::STATE_ROWS;

/// The per-column Heun update, free of any batch bookkeeping.
#[derive(Debug, Clone, Copy)]
pub(super) struct Kernel {
    pub(super) model: CartPole,
    pub(super) dt: f64,
    pub(super) steps: usize,
}

/// Derivative and probe buffers reused across sub-steps.
#[derive(Debug, Clone)]
pub(super) struct Scratch {
    probe: Array2<f64>,
    k1: Array2<f64>,
    k2: Array2<f64>,
}

impl Default for Scratch {
    fn default() -> Self {
        Self::with_columns(0)
    }
}

impl Scratch {
    fn with_columns(columns: usize) -> Self {
        Self {
            probe: Array2::zeros((STATE_ROWS, columns)),
            k1: Array2::zeros((STATE_ROWS, columns)),
            k2: Array2::zeros((STATE_ROWS, columns)),
        }
    }

    fn fit(&mut self, columns: usize) {
        if self.k1.ncols() != columns {
            *self = Self::with_columns(columns);
        }
    }
}

impl Kernel {
    /// Integrates `block` in place over one control period.
    pub(super) fn advance_block(
        &self,
        mut block: ArrayViewMut2<'_, f64>,
        inputs: ArrayView1<'_, f64>,
        scratch: &mut Scratch,
    ) {
        scratch.fit(block.ncols());
        let Scratch { probe, k1, k2 } = scratch;
        let dt = self.dt;

        for _ in 0..self.steps {
            self.derivative_into(block.view(), inputs, k1);

            Zip::from(&mut *probe)
                .and(&block)
                .and(&*k1)
                .for_each(|p, &x, &k| *p = x + k * dt);

            self.derivative_into(probe.view(), inputs, k2);

            Zip::from(&mut block)
                .and(&*k1)
                .and(&*k2)
                .for_each(|x, &a, &b| *x += (a + b) * 0.5 * dt);
        }
    }

    fn derivative_into(
        &self,
        states: ArrayView2<'_, f64>,
        inputs: ArrayView1<'_, f64>,
        rates: &mut Array2<f64>,
    ) {
        Zip::from(rates.columns_mut())
            .and(states.columns())
            .and(inputs)
            .for_each(|mut rate, state, &input| {
                rate[0] = state[2];
                rate[1] = state[3];
                rate[2] = input;
                rate[3] = self.model.angular_acceleration(input, state[1]);
            });
    }
}
