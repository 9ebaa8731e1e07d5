use anyhow::Result;
use settle_driver::command::{
    LEGACY_FIRST_FRAME_RASTERIZED, LEGACY_NO_PENDING_FRAME, LEGACY_NO_TRANSIENT_CALLBACKS,
    WAIT_FOR_CONDITION,
};
use settle_driver::LoadedConfig;
use settle_wait_conditions::KNOWN_CONDITIONS;

pub async fn cmd_info(loaded: &LoadedConfig) -> Result<()> {
    let config = &loaded.config;

    println!("Settle Driver Information");
    println!("=========================");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Build Date: {}", option_env!("BUILD_DATE").unwrap_or("unknown"));
    println!("Git Commit: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!();

    println!("Configuration:");
    if loaded.from_file {
        println!("- Source: {}", loaded.path.display());
    } else {
        println!("- Source: defaults ({} not found)", loaded.path.display());
    }
    println!("- Default Timeout: {}ms", config.default_timeout_ms);
    println!("- Log Level: {}", config.logging.level);
    println!("- JSON Logs: {}", config.logging.json);
    println!("- Simulated Cycle: {}ms", config.simulation.cycle_ms);
    println!();

    println!("Commands:");
    println!("- {}", WAIT_FOR_CONDITION);
    for legacy in [
        LEGACY_NO_TRANSIENT_CALLBACKS,
        LEGACY_NO_PENDING_FRAME,
        LEGACY_FIRST_FRAME_RASTERIZED,
    ] {
        println!("- {} (legacy)", legacy);
    }
    println!();

    println!("Conditions:");
    for name in KNOWN_CONDITIONS {
        println!("- {}", name);
    }
    Ok(())
}
