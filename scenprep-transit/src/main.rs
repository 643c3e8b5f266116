use clap::Parser;
use scenprep_transit::{app::TransitApp, TransitPrepError};

fn main() -> Result<(), TransitPrepError> {
    env_logger::init();
    let args = TransitApp::parse();
    args.op.run()
}
