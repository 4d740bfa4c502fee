use anyhow::{Result, anyhow};
use clap::Parser;
use stockkit_cli::{Args, run};

fn main() -> Result<()> {
    let args = Args::parse();
    stockkit_log::init_logging(&args.log_level).map_err(|err| anyhow!(err))?;

    let (path_file_out, report) = run(&args)?;
    println!("{report}");
    for c_warning in &report.warnings {
        println!("  warning: {c_warning}");
    }
    println!("{}", path_file_out.display());
    Ok(())
}
