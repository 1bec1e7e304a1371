//! Quote a model file from the command line
//!
//! Usage: `cargo run --example quote_file -- <file> [material] [infill] [quantity] [speed] [distance_km]`
//!
//! Set `RUST_LOG=printquote=debug` to see parser details.

use printquote::{DeliveryMode, Material, PreparedModel, PrintSettings, SpeedClass};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        eprintln!("usage: quote_file <file.stl|obj|3mf> [material] [infill] [quantity] [speed] [distance_km]");
        std::process::exit(2);
    };

    let mut settings = PrintSettings::new();
    if let Some(material) = args.get(1) {
        settings = settings.with_material(Material::from_key(material));
    }
    if let Some(infill) = args.get(2) {
        settings = settings.with_infill_percent(infill.parse()?);
    }
    if let Some(quantity) = args.get(3) {
        settings = settings.with_quantity(quantity.parse()?);
    }
    if let Some(speed) = args.get(4) {
        settings = settings.with_speed(speed.parse::<SpeedClass>()?);
    }
    if let Some(distance) = args.get(5) {
        settings = settings.with_delivery(DeliveryMode::delivery(distance.parse()?));
    }

    let filename = std::path::Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());
    let data = std::fs::read(path)?;

    println!("=== {} ===\n", filename);

    let model = PreparedModel::from_bytes(&filename, &data)?;
    println!("Volume source: {:?}", model.volume_source());
    println!("Triangles:     {}", model.triangle_count());

    let quote = model.estimate(&settings)?;
    println!(
        "\nSettings: {} / {}% infill / {} mm layers / x{} / {}",
        settings.material,
        settings.infill_percent,
        settings.layer_height,
        settings.quantity,
        settings.speed
    );
    println!("  Volume:        {:>8.1} cm³", quote.volume_cm3);
    println!("  Filament:      {:>8.1} g ({:.1} m)", quote.filament_grams, quote.filament_meters);
    println!("  Print time:    {:>8.1} min", quote.estimated_minutes);
    println!("  Manufacturing: {:>8.2} $", quote.price.manufacturing);
    println!("  Delivery:      {:>8.2} $", quote.price.delivery);
    println!("  Total:         {:>8.2} $", quote.price.total);

    if quote.is_fallback() {
        println!("\nNote: geometry could not be read; volume was estimated from file size");
    }

    println!("\n=== Quantity breaks ===");
    for quantity in [1, 3, 5, 10] {
        let quote = model.estimate(&settings.clone().with_quantity(quantity))?;
        println!("  x{:<3} {:>8.2} $", quantity, quote.price.manufacturing);
    }

    Ok(())
}
