use clap::Parser;
use scenprep_population::{app::PopulationApp, PopulationError};

fn main() -> Result<(), PopulationError> {
    env_logger::init();
    let args = PopulationApp::parse();
    args.op.run()
}
