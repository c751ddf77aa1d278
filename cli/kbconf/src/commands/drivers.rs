//! `kbconf drivers`: driver listing and description.

use anyhow::{Context, Result};
use kbconf_drivers::{DriverRegistry, SectorLayout};

/// List all built-in drivers.
pub fn list(registry: &DriverRegistry) -> Result<()> {
    println!("Built-in drivers:");
    println!();
    for driver in registry.iter() {
        println!("  {:<15} {}", driver.id, driver.description);
    }
    println!();
    println!("Use 'kbconf drivers describe <id>' for details.");
    Ok(())
}

/// Describe a specific driver in detail.
pub fn describe(registry: &DriverRegistry, id: &str) -> Result<()> {
    let driver = registry
        .lookup(id)
        .context("use 'kbconf drivers list' to see available drivers")?;
    let meta = &driver.metadata;

    println!("=== Driver: {} ===", driver.id);
    println!("{}", driver.description);
    println!();

    println!("--- PlatformIO ---");
    println!("  Board:     {}", driver.platformio.board);
    println!("  Ldscript:  {}", driver.platformio.ldscript);
    println!("  Framework: {}", driver.platformio.framework);
    println!("  Platform:  {}", driver.platformio.platform);
    println!("  TinyUSB:   {}", driver.tinyusb.opt_mcu());
    println!();

    println!("--- Bootloader ---");
    println!("  Address: 0x{:08X}", meta.bootloader.address);
    println!("  Magic:   0x{:08X}", meta.bootloader.magic);
    println!();

    println!("--- Flash ---");
    println!(
        "  Size:  {} bytes ({} sectors)",
        meta.flash.total_size(),
        meta.flash.sector_count()
    );
    match &meta.flash.sectors {
        SectorLayout::NonUniform { sizes } => {
            let sizes: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();
            println!("  Sectors: [{}]", sizes.join(", "));
        }
        SectorLayout::Uniform { size, count } => {
            println!("  Sectors: {count} x {size} bytes");
        }
    }
    println!("  Empty value: 0x{:08X}", meta.flash.empty_value);
    println!();

    println!("--- ADC ---");
    println!("  Max resolution: {} bits", meta.adc.max_resolution);
    println!("  Pin naming:     {}", meta.adc.naming.name());
    println!("  Channels:");
    for (channel, pin) in meta.adc.input_pins.iter().enumerate() {
        println!("    {channel:>2}: {pin}");
    }

    Ok(())
}
