use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Explicit (forward) Euler: `x += dt * f(t, x)`.
pub struct ForwardEuler<T: Scalar> {
    k: Vec<T>,
}

impl<T: Scalar> ForwardEuler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for ForwardEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        debug_assert_eq!(state.len(), system.dimension());
        self.k.resize(system.dimension(), T::zero());
        system.apply(*t, state, &mut self.k);
        for (x, k) in state.iter_mut().zip(&self.k) {
            *x = *x + dt * *k;
        }
        *t = *t + dt;
    }
}

/// Semi-implicit (symplectic) Euler for second-order systems.
///
/// The state is laid out as `[positions.., velocities..]` with equal halves,
/// and the system's derivative for the velocity half is the acceleration.
/// Velocities are updated first and the new velocities then move the
/// positions:
///
/// ```text
/// v += a(x, v) * dt
/// x += v * dt
/// ```
pub struct SemiImplicitEuler<T: Scalar> {
    k: Vec<T>,
}

impl<T: Scalar> SemiImplicitEuler<T> {
    pub fn new(dim: usize) -> Self {
        debug_assert!(dim % 2 == 0, "semi-implicit Euler needs [x.., v..] pairs");
        Self {
            k: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for SemiImplicitEuler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        debug_assert_eq!(state.len(), system.dimension());
        self.k.resize(system.dimension(), T::zero());
        let half = state.len() / 2;
        system.apply(*t, state, &mut self.k);

        for i in half..state.len() {
            state[i] = state[i] + dt * self.k[i];
        }
        for i in 0..half {
            state[i] = state[i] + dt * state[i + half];
        }

        *t = *t + dt;
    }
}
