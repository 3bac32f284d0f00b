//! Command-line parsing for the zero-crossing spectral toolkit.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the signal processing code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    COL_FFT_BIN, COL_MEASUREMENT_AT_ZC, COL_PHASE, DEFAULT_PRECISION, RepresentationKind,
    SelectionSpace,
};
use crate::logging::LogLevel;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "zcs", version, about = "Zero-crossing spectral analysis toolkit")]
pub struct Cli {
    /// Log verbosity (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Decimal digits kept in numeric CSV outputs.
    #[arg(long, global = true, env = "ZCS_PRECISION", default_value_t = DEFAULT_PRECISION)]
    pub precision: u32,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands, one per stage.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upsample a raw capture with cubic interpolation (`_interp{factor}`).
    Interpolate(InterpolateArgs),
    /// Extract zero-crossings of the reference (`_zc`).
    ZeroCrossing(InputArgs),
    /// Inverse transform of the zero-crossing measurements (`_ifft`).
    Ifft(IfftArgs),
    /// Zero everything outside one or more index windows (`_zeroedout`).
    Window(WindowArgs),
    /// Forward transform to power and phase (`_fft`).
    Fft(FftArgs),
    /// Crop a raw capture to a row range (`_truncated`).
    Truncate(TruncateArgs),
    /// Fit a quadratic to the unwrapped phase over an x range.
    Fit(FitArgs),
    /// Print a previously exported fit JSON.
    ShowFit(ShowFitArgs),
    /// Run interpolate → zero-crossing → ifft → window → fft → fit in one go.
    Chain(ChainArgs),
}

#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Input CSV file.
    pub input: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct InterpolateArgs {
    /// Headerless capture: column 0 = measurement, column 1 = reference.
    pub input: PathBuf,

    /// Upsampling factor (points per original sample interval).
    #[arg(short, long, default_value_t = 10)]
    pub factor: usize,
}

#[derive(Debug, Args, Clone)]
pub struct IfftArgs {
    pub input: PathBuf,

    /// Column transformed as a real signal.
    #[arg(long, default_value = COL_MEASUREMENT_AT_ZC)]
    pub column: String,
}

/// Where window edges come from.
#[derive(Debug, Args, Clone)]
pub struct WindowSelectionArgs {
    /// Window edges `a:b` (repeatable). Prompts interactively when absent.
    #[arg(long = "window", value_name = "A:B", value_parser = parse_edges, allow_hyphen_values = true)]
    pub windows: Vec<(f64, f64)>,

    /// Number of windows to pick interactively.
    #[arg(long = "windows", value_name = "K", default_value_t = 1, conflicts_with = "windows")]
    pub interactive_count: usize,

    /// Index space the edges refer to.
    #[arg(long, value_enum, default_value_t = SelectionSpace::Auto)]
    pub space: SelectionSpace,
}

#[derive(Debug, Args, Clone)]
pub struct WindowArgs {
    pub input: PathBuf,

    /// Column to mask when the input is not an inverse-transform table.
    #[arg(long)]
    pub column: Option<String>,

    #[command(flatten)]
    pub selection: WindowSelectionArgs,
}

#[derive(Debug, Args, Clone)]
pub struct FftArgs {
    pub input: PathBuf,

    /// Which persisted columns rebuild the transform input.
    #[arg(short, long, value_enum, default_value_t = RepresentationKind::Complex)]
    pub representation: RepresentationKind,
}

#[derive(Debug, Args, Clone)]
pub struct TruncateArgs {
    /// Headerless capture.
    pub input: PathBuf,

    /// Inclusive row range `a:b` (0-based data rows). Prompts when absent.
    #[arg(long, value_name = "A:B", value_parser = parse_edges)]
    pub range: Option<(f64, f64)>,
}

/// Fit column and range selection, shared with `chain`.
#[derive(Debug, Args, Clone)]
pub struct FitRangeArgs {
    /// Inclusive x range `a:b`. Prompts when absent.
    #[arg(long = "range", value_name = "A:B", value_parser = parse_edges, allow_hyphen_values = true)]
    pub range: Option<(f64, f64)>,

    /// Write coefficients, diagnostics and a fitted grid to JSON.
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    pub input: PathBuf,

    #[arg(long, default_value = COL_FFT_BIN)]
    pub x_column: String,

    #[arg(long, default_value = COL_PHASE)]
    pub y_column: String,

    #[command(flatten)]
    pub fit: FitRangeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ShowFitArgs {
    /// Fit JSON produced by `--export-fit`.
    pub path: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ChainArgs {
    /// Headerless capture: column 0 = measurement, column 1 = reference.
    pub input: PathBuf,

    #[arg(short, long, default_value_t = 10)]
    pub factor: usize,

    #[arg(short, long, value_enum, default_value_t = RepresentationKind::Complex)]
    pub representation: RepresentationKind,

    #[command(flatten)]
    pub selection: WindowSelectionArgs,

    #[command(flatten)]
    pub fit: FitRangeArgs,
}

/// Parse `a:b` into a pair of edges.
pub fn parse_edges(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `a:b`, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| format!("`{v}` is not a finite number"))
    };
    Ok((parse(a)?, parse(b)?))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edges_parse() {
        assert_eq!(parse_edges("7:2"), Ok((7.0, 2.0)));
        assert_eq!(parse_edges(" -1.5 : 3 "), Ok((-1.5, 3.0)));
        assert!(parse_edges("7").is_err());
        assert!(parse_edges("a:2").is_err());
        assert!(parse_edges("nan:2").is_err());
    }

    #[test]
    fn window_accepts_repeated_edges() {
        let cli = Cli::parse_from(["zcs", "window", "in.csv", "--window", "0:3", "--window", "8:9"]);
        let Command::Window(args) = cli.command else {
            panic!("expected window");
        };
        assert_eq!(args.selection.windows, vec![(0.0, 3.0), (8.0, 9.0)]);
        assert_eq!(args.selection.space, SelectionSpace::Auto);
        assert_eq!(cli.precision, DEFAULT_PRECISION);
    }

    #[test]
    fn stage_defaults() {
        let cli = Cli::parse_from(["zcs", "fit", "x_fft.csv", "--range", "-5:5"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.x_column, COL_FFT_BIN);
        assert_eq!(args.y_column, COL_PHASE);
        assert_eq!(args.fit.range, Some((-5.0, 5.0)));

        let cli = Cli::parse_from(["zcs", "--precision", "3", "ifft", "x_zc.csv"]);
        assert_eq!(cli.precision, 3);
        let Command::Ifft(args) = cli.command else {
            panic!("expected ifft");
        };
        assert_eq!(args.column, COL_MEASUREMENT_AT_ZC);
    }
}
