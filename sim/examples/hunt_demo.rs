//! Headless demonstration of a Wildwood hunt.
//!
//! Run with: cargo run --example hunt_demo [config.ron]

use glam::Vec3;
use hunt_sim::{HuntConfig, HuntSim, Posture, SimEvent};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => HuntConfig::load_or_default(path),
        None => HuntConfig::default(),
    };

    println!("=== Wildwood Hunt - Simulation Demo ===\n");

    let mut sim = HuntSim::with_config(config);
    sim.start_session();
    sim.set_posture(Posture::Crouching);
    sim.set_aiming(true);
    sim.set_tracker_vision(true);

    // Sweep the view around and take a shot at the nearest living animal
    // every few seconds.
    for second in 0..120 {
        for _ in 0..10 {
            sim.step(0.1);
        }

        if second % 5 == 4 {
            if let Some(target) = nearest_live_animal(&mut sim) {
                let camera = Vec3::new(0.0, 1.0, 0.0);
                sim.set_player_view(camera, target - camera);
                sim.trigger_shoot();
            }
        }
        if sim.ammo() == 0 {
            sim.reload();
        }

        for event in sim.drain_events() {
            match event {
                SimEvent::AnimalCall { .. } => {}
                other => println!("[{:>6.1}s] {:?}", sim.current_time(), other),
            }
        }

        if second % 20 == 19 {
            println!(
                "--- t={:.0}s live={} kills={} score={} scent={} blood={} weather={} ---",
                sim.current_time(),
                sim.live_count(),
                sim.kill_count(),
                sim.score(),
                sim.trails().scent_len(),
                sim.trails().blood_len(),
                sim.weather().as_str()
            );
        }
    }

    sim.end_session();

    println!("\n=== Hunt Log ===\n");
    for record in sim.hunt_log() {
        println!(
            "  {} #{} at {:.1}m (t={:.1}s, +{})",
            record.species.as_str(),
            record.id,
            record.distance,
            record.timestamp_ms as f64 / 1000.0,
            record.score
        );
    }

    println!("\n=== Final State (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("snapshot failed: {}", e),
    }
}

fn nearest_live_animal(sim: &mut HuntSim) -> Option<Vec3> {
    let height = sim.config().collider_height;
    sim.snapshot()
        .animals
        .iter()
        .filter(|a| !a.is_dead)
        .map(|a| Vec3::new(a.x, a.y + height, a.z))
        .min_by(|a, b| a.length_squared().total_cmp(&b.length_squared()))
}
