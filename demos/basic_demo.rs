//! Basic demonstration of the Mingle Cats simulation.
//!
//! Run with: cargo run --example basic_demo

use mingle_sim::SimWorld;

fn main() {
    env_logger::init();

    println!("=== Mingle Cats - Simulation Demo ===\n");

    // Create the default arena: player + scattered mingling cats.
    let mut sim = SimWorld::new_default_arena();

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Skate the player toward the crowd.
    sim.set_player_wish(0.0, 1.0);

    // Run for 20 seconds of game time at 60 Hz.
    println!("\nRunning simulation for 1200 ticks (20 seconds at 60 ticks/sec)...\n");
    for tick in 0..1200 {
        sim.step(1.0 / 60.0);

        // Print state every 5 seconds.
        if (tick + 1) % 300 == 0 {
            println!(
                "--- Tick {} (t={:.1}s) ---",
                sim.current_tick(),
                sim.current_time()
            );
            print_snapshot(&mut sim);
        }
    }

    // Final snapshot as JSON.
    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();

    let singles = snapshot.cats.iter().filter(|c| c.is_single).count();
    let matched = snapshot
        .cats
        .iter()
        .filter(|c| c.partner.is_some())
        .count();
    println!(
        "  {} cats: {} single, {} matched",
        snapshot.cats.len(),
        singles,
        matched
    );

    for cat in &snapshot.cats {
        let status = if cat.is_player {
            "player".to_string()
        } else if let Some(partner) = cat.partner {
            format!("matched with {}", partner)
        } else {
            "single".to_string()
        };
        println!(
            "    Cat {:>2} [{}]: pos=({:>6.1}, {:>6.1}) {}",
            cat.id, cat.cat_type, cat.x, cat.y, status
        );
    }

    for reaction in &snapshot.reactions {
        println!("  audio: {} {:?}", reaction.kind, reaction.actors);
    }
}
