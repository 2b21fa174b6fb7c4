//! Objective Capability Dispatch
//!
//! An optimizer front end that picks how to drive an objective from the
//! methods the objective type happens to provide. Detection runs at compile
//! time on concrete types; the results are stored in an associated const and
//! read by generic code.

use method_probe::prelude::*;

// --- Shapes ---

method_form! {
    /// `fn evaluate(&self, &[f64], ..) -> f64`
    pub struct EvaluateForm = fn(&self, &[f64], ..) -> f64;

    /// `fn gradient(&self, &[f64], &mut [f64], ..)`
    pub struct GradientForm = fn(&self, &[f64], &mut [f64], ..);
}

method_detector! {
    HasEvaluate = evaluate;
    HasGradient = gradient;
}

// --- Objectives ---

/// Smooth bowl with an analytic gradient.
struct Sphere;

#[methods]
impl Sphere {
    fn evaluate(&self, x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn gradient(&self, x: &[f64], out: &mut [f64]) {
        for (g, v) in out.iter_mut().zip(x) {
            *g = 2.0 * v;
        }
    }
}

/// Separable sum evaluated over a window of terms.
struct SeparableSum;

#[methods]
impl SeparableSum {
    fn evaluate(&self, x: &[f64], begin: usize, batch_size: usize) -> f64 {
        x.iter().skip(begin).take(batch_size).map(|v| v.abs()).sum()
    }
}

/// Nothing registered.
struct Opaque;

// =============================================================================
// Lifting detection results
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Gradient,
    Batched,
    ValueOnly,
    Unsupported,
}

trait Plan {
    const STRATEGY: Strategy;
}

/// Writes the `Plan` impl for a concrete objective type.
macro_rules! plan {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Plan for $ty {
                const STRATEGY: Strategy = {
                    if has_method_form!(HasGradient<GradientForm, $ty>, arity = 0) {
                        Strategy::Gradient
                    } else if has_method_form!(HasEvaluate<EvaluateForm, $ty>, arity = 2) {
                        Strategy::Batched
                    } else if has_method_form!(HasEvaluate<EvaluateForm, $ty>) {
                        Strategy::ValueOnly
                    } else {
                        Strategy::Unsupported
                    }
                };
            }
        )*
    };
}

plan!(Sphere, SeparableSum, Opaque);

fn describe<F: Plan>(name: &str) {
    let how = match F::STRATEGY {
        Strategy::Gradient => "follow the analytic gradient",
        Strategy::Batched => "sweep over term windows",
        Strategy::ValueOnly => "compare objective values",
        Strategy::Unsupported => "cannot be optimized",
    };
    println!("{:<14} {:?}: {}", name, F::STRATEGY, how);
}

fn main() {
    println!("=== Objective Capability Dispatch ===\n");

    describe::<Sphere>("Sphere");
    describe::<SeparableSum>("SeparableSum");
    describe::<Opaque>("Opaque");

    println!();
    println!(
        "SeparableSum evaluate arity: {:?}",
        method_form_arity!(HasEvaluate<EvaluateForm, SeparableSum>)
    );

    let mut grad = [0.0; 3];
    Sphere.gradient(&[1.0, 2.0, 3.0], &mut grad);
    println!("Sphere value {} gradient {:?}", Sphere.evaluate(&[1.0, 2.0, 3.0]), grad);
    println!("SeparableSum window {}", SeparableSum.evaluate(&[1.0, -2.0, 3.0], 1, 2));
}
