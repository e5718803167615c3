use anyhow::{Context, Result, bail};
use clap::Parser;
use image_theme_color::darkness::{ContrastScheme, brightness, lightness};
use image_theme_color::{
    AlphaPolicy, ColorResult, ColorTally, DominantColor, SIGNIFICANCE_THRESHOLD, ThemeColorOptions, decode_pixels,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Print the dominant (theme) color of images and whether it is dark.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// A color must occur more than this many times to count
    #[arg(short, long, default_value_t = SIGNIFICANCE_THRESHOLD)]
    threshold: u32,

    /// Ignore fully transparent pixels
    #[arg(long)]
    skip_transparent: bool,

    /// Also list this many of the strongest candidate colors
    #[arg(long, default_value_t = 0)]
    top: usize,

    /// Emit one JSON object per input instead of text
    #[arg(long)]
    json: bool,
}

fn analyze(path: &Path, args: &Args, options: &ThemeColorOptions) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let pixels = decode_pixels(&bytes).with_context(|| format!("decoding {}", path.display()))?;

    let tally = ColorTally::from_pixels(&pixels, options.alpha);
    let result: ColorResult = tally
        .dominant(options.threshold)
        .with_context(|| format!("analyzing {}", path.display()))?
        .into();

    let ranked: Vec<DominantColor> = if args.top > 0 {
        tally.ranked(options.threshold).into_iter().take(args.top).collect()
    } else {
        Vec::new()
    };

    let scheme = ContrastScheme::for_color(result.color);

    if args.json {
        let candidates: Vec<_> = ranked
            .iter()
            .map(|c| json!({ "color": c.color.to_string(), "count": c.count }))
            .collect();
        let out = json!({
            "file": path.display().to_string(),
            "color": result.color.to_string(),
            "hex": result.color.hex(),
            "isDark": result.is_dark,
            "count": result.count,
            "lightness": lightness(result.color),
            "background": format!("#{}", scheme.background.hex()),
            "foreground": format!("#{}", scheme.foreground.hex()),
            "candidates": candidates,
        });
        println!("{out}");
    } else {
        println!(
            "{}: {} #{} ({} px, brightness {:.1}, L* {:.1}, {})",
            path.display(),
            result.color,
            result.color.hex(),
            result.count,
            brightness(result.color),
            lightness(result.color),
            if result.is_dark { "dark" } else { "light" },
        );
        for (rank, c) in ranked.iter().enumerate() {
            println!("  {:>2}. {} #{} × {}", rank + 1, c.color, c.color.hex(), c.count);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let options = ThemeColorOptions {
        threshold: args.threshold,
        alpha: if args.skip_transparent {
            AlphaPolicy::SkipTransparent
        } else {
            AlphaPolicy::Include
        },
    };

    let mut failed = 0usize;
    for input in &args.inputs {
        if let Err(e) = analyze(input, &args, &options) {
            eprintln!("{e:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} input(s) failed", args.inputs.len());
    }
    Ok(())
}
