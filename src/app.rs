//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the requested stage(s)
//! - prints written outputs and fit reports

use clap::Parser;
use tracing::debug;

use crate::cli::picker::PromptEdgeSource;
use crate::cli::{ChainArgs, Cli, Command, FitArgs, FitRangeArgs, WindowSelectionArgs};
use crate::domain::OutputConfig;
use crate::error::Result;
use crate::report::{format_fit_summary, format_stage_outputs};

pub mod pipeline;

use pipeline::{ChainPlan, FitPlan, StageOutput, WindowPlan};

/// Entry point for the `zcs` binary.
pub fn run() -> Result<()> {
    // A missing .env is normal; anything it sets is only a default.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    crate::logging::init(cli.log_level);
    if let Ok(path) = &dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    let config = OutputConfig {
        precision: cli.precision,
    };
    dispatch(cli.command, config)
}

fn dispatch(command: Command, config: OutputConfig) -> Result<()> {
    match command {
        Command::Interpolate(args) => {
            report_stage(pipeline::run_interpolate(&args.input, args.factor, config)?);
        }
        Command::ZeroCrossing(args) => {
            report_stage(pipeline::run_zero_crossing(&args.input, config)?);
        }
        Command::Ifft(args) => {
            report_stage(pipeline::run_ifft(&args.input, &args.column, config)?);
        }
        Command::Window(args) => {
            let plan = window_plan(&args.selection);
            let mut picker = PromptEdgeSource::stdio();
            report_stage(pipeline::run_window(
                &args.input,
                args.column.as_deref(),
                &plan,
                &mut picker,
                config,
            )?);
        }
        Command::Fft(args) => {
            report_stage(pipeline::run_fft(&args.input, args.representation, config)?);
        }
        Command::Truncate(args) => {
            let mut picker = PromptEdgeSource::stdio();
            report_stage(pipeline::run_truncate(&args.input, args.range, &mut picker)?);
        }
        Command::Fit(args) => handle_fit(args)?,
        Command::ShowFit(args) => {
            let file = crate::io::read_fit_json(&args.path)?;
            print!("{}", format_fit_summary(&file));
        }
        Command::Chain(args) => handle_chain(args, config)?,
    }
    Ok(())
}

fn report_stage(output: StageOutput) {
    print!("{}", format_stage_outputs(std::slice::from_ref(&output)));
}

fn handle_fit(args: FitArgs) -> Result<()> {
    let plan = FitPlan {
        x_column: args.x_column,
        y_column: args.y_column,
        ..fit_plan(&args.fit)
    };
    let mut picker = PromptEdgeSource::stdio();
    let out = pipeline::run_fit(&args.input, &plan, &mut picker)?;

    print!("{}", format_fit_summary(&out.file));
    if let Some(path) = &plan.export {
        println!("\nFit exported to {}", path.display());
    }
    Ok(())
}

fn handle_chain(args: ChainArgs, config: OutputConfig) -> Result<()> {
    let plan = ChainPlan {
        factor: args.factor,
        representation: args.representation,
        windows: window_plan(&args.selection),
        fit: fit_plan(&args.fit),
    };
    let mut picker = PromptEdgeSource::stdio();
    let out = pipeline::run_chain(&args.input, &plan, &mut picker, config)?;

    print!("{}", format_stage_outputs(&out.stages));
    println!();
    print!("{}", format_fit_summary(&out.fit.file));
    Ok(())
}

pub fn window_plan(args: &WindowSelectionArgs) -> WindowPlan {
    WindowPlan {
        edges: args.windows.clone(),
        interactive_count: args.interactive_count,
        space: args.space,
    }
}

pub fn fit_plan(args: &FitRangeArgs) -> FitPlan {
    FitPlan::new(args.range, args.export_fit.clone())
}
