use instant::Instant;

use flocksim::debug::frames::FrameWindow;
use flocksim::render::instance::{BoidInstance, ParticleInstance};
use flocksim::{Flock, FlockConfig};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Headless run length.
const RUN_SECONDS: f64 = 10.0;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 2.0;
/// Number of frame times kept for the rolling stats.
const FRAME_HISTORY_LEN: usize = 300;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameLog {
    frame_count: u64,
    last_log_time: Instant,
    frame_times: FrameWindow,
}

impl FrameLog {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_times: FrameWindow::new(FRAME_HISTORY_LEN),
        }
    }

    fn record_frame(&mut self, dt: f64, flock: &Flock) {
        self.frame_count += 1;
        self.frame_times.record(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed < FPS_LOG_INTERVAL {
            return;
        }
        if let Some(s) = self.frame_times.stats() {
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                s.fps(),
                s.mean * 1000.0,
                s.min * 1000.0,
                s.max * 1000.0,
                self.frame_count,
            );
        }
        log::info!(
            "Ticks: {} | particles: {} | {}",
            flock.tick_count(),
            flock.particle_count(),
            flock.timers().summary()
        );
        self.last_log_time = Instant::now();
    }
}

/// Fixed-timestep headless driver. Stands in for a renderer's frame loop.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut flock = Flock::new(FlockConfig::default())?;

    let mut boid_buf: Vec<BoidInstance> = Vec::with_capacity(flock.len());
    let mut particle_buf: Vec<ParticleInstance> = Vec::new();
    let mut stats = FrameLog::new();

    let start = Instant::now();
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0;

    while start.elapsed().as_secs_f64() < RUN_SECONDS {
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        accumulator = (accumulator + dt).min(MAX_ACCUMULATOR);
        while accumulator >= TICK_RATE {
            flock.tick();
            accumulator -= TICK_RATE;
        }

        // What a renderer would upload this frame.
        flock.build_instances(&mut boid_buf, &mut particle_buf);
        stats.record_frame(dt, &flock);

        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    log::info!(
        "Done: {} ticks, {} boids, {} particles in last frame",
        flock.tick_count(),
        boid_buf.len(),
        particle_buf.len()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("flocksim starting up");

    if let Err(e) = run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
