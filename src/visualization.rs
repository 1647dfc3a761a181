//! Interactive 3D view of the cube using kiss3d.
//!
//! The scene is a pure follower: every frame ticks the controller and copies
//! each cubelet's position and orientation onto its node.

use std::time::Instant;

use kiss3d::prelude::*;

use cuber::dispatcher::{Controller, Dispatch, SolveStart};
use cuber::faces::{Direction, Face, Layer, Move, Turn};
use cuber::geometry::Transform;
use cuber::ledger::Source;

const CONTROLS: &str = "[RLUDFB] turn, [T] reverse, [I] inner, [W] wide, [Z] undo, [S] scramble, [A] solve, [X] stop, [N] reset";

/// Display colour of a cubelet, blended from its home slot so that every
/// cubelet is distinguishable.
fn cubelet_color(home: (usize, usize, usize), dim: usize) -> Color {
    let scale = |i: usize| 0.15 + 0.85 * i as f32 / (dim - 1) as f32;
    Color::new(scale(home.0), scale(home.1), scale(home.2), 1.0)
}

/// Scene position and rotation of a cubelet.
fn node_pose(transform: &Transform) -> (Vec3, Quat) {
    let (p, q) = (transform.position, transform.orientation);
    (Vec3::new(p.x, p.y, p.z), Quat::from_xyzw(q.x, q.y, q.z, q.w))
}

/// Input-layer modes: direction and depth of the next face key.
#[derive(Debug, Default)]
struct InputMode {
    reverse: bool,
    layer_toggle: Option<Layer>,
}

impl InputMode {
    fn to_move(&self, face: Face) -> Move {
        let direction = if self.reverse {
            Direction::Reverse
        } else {
            Direction::Normal
        };
        Move::new(Turn::new(face, self.layer_toggle.unwrap_or(Layer::Outer)), direction)
    }

    /// Flips between `layer` and outer turns.
    fn toggle(&mut self, layer: Layer) {
        self.layer_toggle = match self.layer_toggle {
            Some(current) if current == layer => None,
            _ => Some(layer),
        };
    }
}

fn title(controller: &Controller, mode: &InputMode) -> String {
    let layer = match mode.layer_toggle {
        None => "outer",
        Some(Layer::Inner) => "inner",
        Some(_) => "wide",
    };
    let turning = controller
        .active_move()
        .map_or_else(|| "-".to_string(), |mv| mv.to_string());
    format!(
        "Moves: {} | Turning: {turning} | Reverse: {} | Layer: {} | Auto-Solve: {} - {CONTROLS}",
        controller.move_count(),
        if mode.reverse { "ON" } else { "OFF" },
        layer,
        if controller.is_auto_solving() { "ON" } else { "OFF" },
    )
}

/// Opens the viewer and runs until the window closes.
pub fn display(controller: Controller) {
    pollster::block_on(display_async(controller));
}

async fn display_async(mut controller: Controller) {
    let dim = controller.cube().dim();
    let mut mode = InputMode::default();
    let mut window = Window::new(&title(&controller, &mode)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(3.0 * dim as f32);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(5.0, 5.0, 5.0));

    // slightly smaller than the spacing so the layers read as separate
    let size = 0.92 * controller.config().spacing;
    let mut nodes: Vec<SceneNode3d> = controller
        .cube()
        .cubelets()
        .iter()
        .map(|cubelet| {
            let (position, rotation) = node_pose(&cubelet.transform);
            scene
                .add_cube(size, size, size)
                .set_color(cubelet_color(cubelet.home, dim))
                .set_position(position)
                .set_rotation(rotation)
        })
        .collect();

    loop {
        let now = Instant::now();
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action != Action::Press {
                    continue;
                }
                let face = match key {
                    Key::R => Some(Face::R),
                    Key::L => Some(Face::L),
                    Key::U => Some(Face::U),
                    Key::D => Some(Face::D),
                    Key::F => Some(Face::F),
                    Key::B => Some(Face::B),
                    _ => None,
                };
                if let Some(face) = face {
                    if let Dispatch::Aborted(err) = controller.dispatch(mode.to_move(face), Source::User, now) {
                        eprintln!("{err}");
                    }
                    continue;
                }
                match key {
                    Key::T => mode.reverse = !mode.reverse,
                    Key::I if dim > 2 => mode.toggle(Layer::Inner),
                    Key::W if dim > 2 => mode.toggle(Layer::Wide),
                    Key::Z => {
                        controller.undo_last(now);
                    }
                    Key::S => controller.scramble(now),
                    Key::A => {
                        if controller.auto_solve(now) == SolveStart::AlreadySolved {
                            println!("Cube is already solved");
                        }
                    }
                    Key::X => controller.stop_auto_solve(),
                    Key::N => {
                        controller.reset();
                    }
                    _ => {}
                }
            }
        }

        controller.tick(now);
        for (node, cubelet) in nodes.iter_mut().zip(controller.cube().cubelets()) {
            let (position, rotation) = node_pose(&cubelet.transform);
            node.set_position(position);
            node.set_rotation(rotation);
        }
        window.set_title(&title(&controller, &mode));

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}
