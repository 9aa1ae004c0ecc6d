//! slot-runner: headless save/load runner for the machine world.
//!
//! Usage:
//!   slot-runner --root ./saves --slot demo --delay 2 --ticks 10
//!   slot-runner --slot demo --toggle door-open
//!   slot-runner --slot demo --reset
//!   slot-runner --config save_config.json

use anyhow::Result;
use savestate_core::{
    config::SaveConfig,
    entity::{Door, FloppyDisk, Lever},
    event::SaveEvent,
    flag_registry::SaveFlag,
    resources::{ResourcePool, ResourceType},
    save_system::SaveSystem,
    types::Tick,
    world::LiveWorld,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match arg_value(&args, "--config") {
        Some(path) => SaveConfig::load(path)?,
        None => SaveConfig::default(),
    };
    if let Some(root) = arg_value(&args, "--root") {
        config.data_root = root.into();
    }
    if let Some(slot) = arg_value(&args, "--slot") {
        config.default_slot = slot.to_string();
    }
    config.load_delay_ticks = parse_arg(&args, "--delay", config.load_delay_ticks);
    let ticks = parse_arg(&args, "--ticks", 10 as Tick);
    let toggle = arg_value(&args, "--toggle").map(str::to_string);
    let reset = args.iter().any(|a| a == "--reset");

    println!("slot-runner");
    println!("  root:   {}", config.data_root.display());
    println!("  slot:   {}", config.default_slot);
    println!("  delay:  {}", config.load_delay_ticks);
    println!("  ticks:  {ticks}");
    println!();

    let slot = config.default_slot.clone();
    let mut system = SaveSystem::new(config)?;
    system.subscribe(|event| match event {
        SaveEvent::SaveCompleted { slot, saved_at } => {
            println!("  [event] saved '{slot}' at {}", saved_at.format("%H:%M:%S"));
        }
        SaveEvent::LoadCompleted { slot, matched, backfilled, stale } => {
            println!("  [event] loaded '{slot}' matched={matched} backfilled={backfilled} stale={stale}");
        }
        other => log::debug!("event: {}", serde_json::to_string(other).unwrap_or_default()),
    });

    if reset {
        let removed = system.reset_slot(&slot)?;
        println!("reset '{slot}' (file removed: {removed})");
        return Ok(());
    }

    let mut world = build_demo_world()?;
    system.schedule_default_load()?;
    world.mark_ready();

    let outcome = system.run_until_loaded(&mut world, ticks)?;
    match &outcome {
        Some(o) if o.bootstrapped => println!("new game bootstrapped in '{}'", o.slot),
        Some(o) => println!("loaded '{}'", o.slot),
        None => println!("load did not finish within {ticks} ticks"),
    }

    if let Some(flag_id) = toggle {
        let current = world.flags.is_set(&flag_id);
        match current {
            Some(is_set) => {
                system.set_flag(&mut world, &flag_id, !is_set)?;
                println!("flag '{flag_id}' -> {}", !is_set);
            }
            None => log::warn!("Unknown flag: {flag_id}"),
        }
    }

    print_summary(&system, &world, &slot)?;
    Ok(())
}

/// A small world: two mechanisms, a floppy, some flags and logs.
fn build_demo_world() -> Result<LiveWorld> {
    let mut world = LiveWorld::new();
    world.resources = ResourcePool::with_all_kinds();

    world.add_mechanism(Door::new("door-1"));
    world.add_mechanism(Lever::new("lever-main"));
    world.add_collectable(FloppyDisk::new("floppy-intro"));

    world.register_flag(SaveFlag::new("door-open", "door-1"))?;
    world.register_flag(SaveFlag::new("lights-on", "lever-main"))?;

    world.logs.define("log-intro");
    world.logs.define("log-reactor");
    Ok(world)
}

fn print_summary(system: &SaveSystem, world: &LiveWorld, slot: &str) -> Result<()> {
    println!();
    println!("=== SLOT SUMMARY ===");
    println!("  slot:        {slot}");
    println!("  path:        {}", system.store().slot_path(slot)?.display());
    println!("  last save:   {}", system.last_save_display(slot)?);
    println!("  saves:       {}", system.save_count());
    println!("  final tick:  {}", system.current_tick());
    println!("  entities:    {}", world.entity_count());
    for flag in world.flags.iter() {
        println!("  flag {:<12} {}", flag.id, flag.is_set());
    }
    for kind in ResourceType::ALL {
        println!("  {:<12} {:.1}", kind.name(), world.resources.amount(kind).unwrap_or(0.0));
    }
    println!("  slots:       {}", system.slots()?.join(", "));
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
