//! Derivative-free minimization (Nelder–Mead simplex)

use super::ModelError;

/// Nelder–Mead stopping rules
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    pub max_iterations: usize,
    /// Simplex diameter tolerance, relative to `1 + max |x_best|`
    pub x_tolerance: f64,
    /// Objective spread tolerance, relative to `1 + |f_best|`
    pub f_tolerance: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            x_tolerance: 1e-6,
            f_tolerance: 1e-9,
        }
    }
}

/// Result of a successful minimization
#[derive(Debug, Clone)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
}

impl NelderMead {
    /// Minimize `f` from `x0`; points where `f` is not finite are rejected
    pub fn minimize<F>(&self, f: F, x0: &[f64]) -> Result<Minimum, ModelError>
    where
        F: Fn(&[f64]) -> f64,
    {
        let objective = |x: &[f64]| {
            let v = f(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        let dim = x0.len();
        let start = objective(x0);
        if !start.is_finite() {
            return Err(ModelError::NonFiniteLikelihood);
        }

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
        simplex.push((x0.to_vec(), start));
        for i in 0..dim {
            let mut vertex = x0.to_vec();
            vertex[i] = if vertex[i] != 0.0 {
                vertex[i] * 1.05
            } else {
                0.00025
            };
            let value = objective(&vertex);
            simplex.push((vertex, value));
        }

        for iteration in 0..self.max_iterations {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best = simplex[0].1;
            let f_spread = simplex.iter().map(|(_, v)| (v - best).abs()).fold(0.0, f64::max);
            let x_spread = simplex
                .iter()
                .skip(1)
                .flat_map(|(x, _)| x.iter().zip(&simplex[0].0).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);
            let x_scale = 1.0 + simplex[0].0.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if f_spread <= self.f_tolerance * (1.0 + best.abs())
                && x_spread <= self.x_tolerance * x_scale
            {
                return Ok(Minimum {
                    x: simplex[0].0.clone(),
                    value: best,
                    iterations: iteration,
                });
            }

            let centroid: Vec<f64> = (0..dim)
                .map(|j| simplex[..dim].iter().map(|(x, _)| x[j]).sum::<f64>() / dim as f64)
                .collect();
            let worst = simplex[dim].clone();
            let toward = |coef: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(&worst.0)
                    .map(|(c, w)| c + coef * (w - c))
                    .collect()
            };

            let reflected = toward(-1.0);
            let f_reflected = objective(&reflected);

            if f_reflected < simplex[0].1 {
                let expanded = toward(-2.0);
                let f_expanded = objective(&expanded);
                simplex[dim] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }

            if f_reflected < simplex[dim - 1].1 {
                simplex[dim] = (reflected, f_reflected);
                continue;
            }

            let contracted = if f_reflected < worst.1 {
                toward(-0.5)
            } else {
                toward(0.5)
            };
            let f_contracted = objective(&contracted);
            if f_contracted < worst.1.min(f_reflected) {
                simplex[dim] = (contracted, f_contracted);
                continue;
            }

            // Shrink toward the best vertex
            let best_x = simplex[0].0.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let shrunk: Vec<f64> = best_x
                    .iter()
                    .zip(&vertex.0)
                    .map(|(b, x)| b + 0.5 * (x - b))
                    .collect();
                let value = objective(&shrunk);
                *vertex = (shrunk, value);
            }
        }

        Err(ModelError::NotConverged {
            iterations: self.max_iterations,
        })
    }
}
