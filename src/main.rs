use clap::Parser;
use glam::{vec2, Vec2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use wyrm::{
    Animator, BodyPlan, DyeColor, EmitError, FluidEmitter, InputSnapshot, PathRecorder,
};

/// Headless demo: a procedurally assembled dragon chasing a moving target,
/// logging its pose and the splats it would feed a fluid solver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RNG seed for the body plan and stride jitter
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Override the number of leg pairs
    #[arg(long)]
    legs: Option<u32>,

    /// Override the tail length (vertebrae)
    #[arg(long)]
    tail: Option<u32>,

    /// Surface width in device pixels
    #[arg(long, default_value_t = 1920.0)]
    width: f32,

    /// Surface height in device pixels
    #[arg(long, default_value_t = 1080.0)]
    height: f32,
}

/// Emitter that logs splats instead of driving a real solver
struct LogEmitter;

impl FluidEmitter for LogEmitter {
    fn splat(&mut self, position: Vec2, force: Vec2, _color: DyeColor) -> Result<(), EmitError> {
        log::debug!(
            "splat at ({:.3}, {:.3}) force ({:.1}, {:.1})",
            position.x,
            position.y,
            force.x,
            force.y
        );
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(args.seed);
    let mut plan = BodyPlan::random(&mut rng);
    if let Some(legs) = args.legs {
        plan.legs = legs.max(1);
    }
    if let Some(tail) = args.tail {
        plan.tail = tail.max(1);
    }
    log::info!(
        "Body plan: scale {:.2}, {} leg pairs, {} tail vertebrae",
        plan.scale,
        plan.legs,
        plan.tail
    );

    let surface = vec2(args.width, args.height);
    let center = surface / 2.0;
    let creature = plan.build(center, args.seed);
    log::info!("Assembled {} segments", creature.tree.len());

    let mut animator = Animator::new(creature, surface);
    let mut canvas = PathRecorder::new();
    let mut emitter = LogEmitter;

    // Target orbits the surface center, like a pointer being waved around
    let orbit = 0.35 * surface.min_element();
    for frame in 0..args.frames {
        let target = center + orbit * Vec2::from_angle(frame as f32 * 0.02);
        canvas.clear();
        animator.tick(&InputSnapshot::new(target), &mut canvas, &mut emitter);

        if frame % 60 == 0 {
            let pos = animator.creature.position;
            log::info!(
                "frame {frame}: creature at ({:.1}, {:.1}), {} strokes",
                pos.x,
                pos.y,
                canvas.strokes().len()
            );
        }
    }

    let pos = animator.creature.position;
    println!(
        "Simulated {} frames; creature finished at ({:.1}, {:.1})",
        args.frames, pos.x, pos.y
    );
    Ok(())
}
