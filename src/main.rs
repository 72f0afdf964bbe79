use anyhow::Result;
use is_terminal::IsTerminal;
use log::info;
use std::io;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("AIN_LOG", "warn")).init();
    let args = ain::args::parsed();

    let Some(file) = args.file else {
        println!("you need to specify a file");
        ain::args::print_usage()?;
        return Ok(());
    };

    let input = io::stdin().lock();
    let summary = if io::stdout().is_terminal() {
        ain::run(&file, args.options, input, io::stdout().lock())?
    } else {
        ain::run(&file, args.options, input, io::BufWriter::new(io::stdout().lock()))?
    };
    info!("{} new lines, {} duplicates", summary.new, summary.duplicates);
    Ok(())
}
