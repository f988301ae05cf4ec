pub mod commands;
pub mod coords;
pub mod demos;
pub mod equation_engine;
pub mod field;
pub mod heat;
pub mod input;
pub mod integrate;
pub mod parametric;
pub mod plotter;
pub mod presets;
pub mod render;
pub mod solvers;
pub mod style;
/// The `fieldplot_core` crate is the target-independent engine behind the
/// fieldplot canvas visualizations. It never touches a real canvas: every
/// frame is a list of [`commands::DrawCommand`]s that a host replays.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem`, `Steppable` (integrators), `ScalarFunction` and `Field2D` (plotted functions).
/// - **Geometry**: `Vector2D`, field combinators and presets, parametric curves, the `CoordinateSystem` transform.
/// - **Numerics**: Euler steppers, field-line tracing, second-order ODEs, the explicit heat-equation stepper.
/// - **Rendering**: `Plotter` render cycle, `Frame` recorder, `Surface` replay.
/// - **Equation Engine**: tokenizer, parser and bytecode VM compiling user text into callable functions.
/// - **Input**: form diffing, debouncing and the bundled demo states.
pub mod traits;
pub mod vector;
