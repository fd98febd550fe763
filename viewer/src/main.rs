//! cmif sample app for embedded-graphics

use anyhow::{Context, Result};
use clap::Parser;
use cmif::{CmifImage, Decoder};
use embedded_graphics::{image::Image, pixelcolor::Rgb888, prelude::*, primitives::Rectangle};
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
use std::{fs, path::PathBuf};

#[derive(Parser, Debug)]
#[command(name = "viewer", version, about = "Shows a CMIF image", long_about = None)]
struct Args {
    /// .cmif file to show
    input: PathBuf,

    /// Draw the image progressively, one color group entry at a time
    #[arg(long)]
    animate: bool,

    /// Integer zoom factor
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Entries drawn between two window refreshes while animating
    #[arg(long, default_value_t = 1)]
    speed: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let data = fs::read(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let image = Decoder::from_padded(&data)
        .and_then(|decoder| decoder.decode())
        .context("unexpected file format")?;

    let mut display = SimulatorDisplay::<Rgb888>::new(image.size());
    let output_settings = OutputSettingsBuilder::new().scale(args.scale.max(1)).build();
    let mut window = Window::new("CMIF Viewer", &output_settings);

    if args.animate {
        if !animate(&image, &mut display, &mut window, args.speed.max(1)) {
            return Ok(());
        }
    } else {
        let _ = Image::new(&image, Point::zero()).draw(&mut display);
    }

    window.show_static(&display);
    Ok(())
}

/// Returns `false` if the window was closed before the image was complete.
fn animate(
    image: &CmifImage,
    display: &mut SimulatorDisplay<Rgb888>,
    window: &mut Window,
    speed: u32,
) -> bool {
    let width = image.width() as usize;
    let _ = display.fill_solid(
        &Rectangle::new(Point::zero(), image.size()),
        image.background().into(),
    );

    let mut counter = 0;
    for (color, range) in image.spans() {
        let color: Rgb888 = color.into();
        let _ = display.draw_iter(range.map(|index| {
            Pixel(
                Point::new((index % width) as i32, (index / width) as i32),
                color,
            )
        }));

        counter += 1;
        if counter == speed {
            counter = 0;
            window.update(display);
            let mut events = window.events();
            if events.any(|event| matches!(event, SimulatorEvent::Quit)) {
                return false;
            }
        }
    }
    true
}
